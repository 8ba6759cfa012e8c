//! Internal contact-sync endpoint.
//!
//! Called by trusted server-side jobs, not browsers. Authentication is a
//! shared-secret header checked before any other work, so unauthenticated
//! callers cannot consume rate-limit budget or reach the upstream API.

use actix_web::{HttpRequest, HttpResponse, web};
use subtle::ConstantTimeEq;

use serif_shared::ApiResponse;
use serif_shared::dto::ContactSyncRequest;

use crate::config::AppConfig;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const INTERNAL_AUTH_HEADER: &str = "x-internal-auth";

/// Compare the presented secret against the configured one in constant
/// time. A missing configuration means nobody is authorized.
fn authorized(provided: Option<&str>, expected: Option<&str>) -> bool {
    match (provided, expected) {
        (Some(provided), Some(expected)) => {
            provided.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        _ => false,
    }
}

/// POST /api/contacts
pub async fn sync_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<AppConfig>,
    body: web::Json<ContactSyncRequest>,
) -> AppResult<HttpResponse> {
    let provided = req
        .headers()
        .get(INTERNAL_AUTH_HEADER)
        .and_then(|v| v.to_str().ok());
    if !authorized(provided, config.internal_api_key.as_deref()) {
        return Err(AppError::Unauthorized);
    }

    let caller = req
        .connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string();
    let outcome = state.contact_limiter.check(&caller).await?;
    if !outcome.allowed {
        return Err(AppError::TooManyRequests {
            retry_after_secs: outcome.reset_after.as_secs().max(1),
        });
    }

    let req = body.into_inner();
    let email = match req.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => return Err(AppError::BadRequest("Email is required".to_string())),
    };
    let first_name = match req.first_name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::BadRequest("First name is required".to_string())),
        Some(name) => Some(name.to_string()),
        None => None,
    };

    state
        .contact_sync
        .sync_contact(&email, first_name.as_deref())
        .await?;

    tracing::info!("Contact synced");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Contact synced")))
}
