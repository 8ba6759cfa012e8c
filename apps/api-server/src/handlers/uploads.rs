//! Image upload handler.

use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::StreamExt;
use rand::{Rng, distributions::Alphanumeric};

use serif_core::domain::{image_object_path, sanitize_extension, validate_image};
use serif_core::ports::PutOptions;
use serif_shared::dto::UploadResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;

/// POST /api/uploads/images - Protected route
///
/// Accepts a single multipart file field, gates it on type and size, and
/// stores it under a server-derived per-user path. The client never picks
/// the object path.
pub async fn upload_image(
    state: web::Data<AppState>,
    identity: Identity,
    request_id: RequestId,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?;

        let Some(filename) = field.content_disposition().get_filename().map(str::to_owned) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_default();

        // Reject bad content types before buffering anything.
        validate_image(&content_type, 0)?;

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
            // Checked against the cap as data streams in, so an oversized
            // upload is cut off rather than buffered whole.
            validate_image(&content_type, bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }

        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::BadRequest("File is required".to_string()));
    };

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    let path = image_object_path(
        identity.user_id,
        chrono::Utc::now().timestamp_millis(),
        &suffix,
        &sanitize_extension(&filename),
    );

    state
        .object_store
        .put(
            &path,
            bytes,
            PutOptions {
                cache_control: Some("3600".to_string()),
                upsert: false,
            },
        )
        .await?;

    let url = state.object_store.public_url(&path);

    tracing::info!(
        request_id = %request_id.as_str(),
        user_id = %identity.user_id,
        path = %path,
        "Image stored"
    );

    Ok(HttpResponse::Created().json(UploadResponse { url, path }))
}
