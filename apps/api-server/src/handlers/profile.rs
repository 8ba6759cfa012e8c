//! Profile handlers - display data shown next to published posts.

use actix_web::{HttpResponse, web};

use serif_core::domain::Profile;
use serif_shared::dto::{ProfileResponse, UpdateProfileRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn profile_response(profile: Profile) -> ProfileResponse {
    ProfileResponse {
        id: profile.id,
        first_name: profile.first_name,
        avatar_url: profile.avatar_url,
        updated_at: profile.updated_at,
    }
}

/// GET /api/profile - Protected route
///
/// Profiles are created lazily; accounts without a stored row read back as
/// an empty profile rather than a 404.
pub async fn get_profile(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .find_by_id(identity.user_id)
        .await?
        .unwrap_or_else(|| Profile::new(identity.user_id));

    Ok(HttpResponse::Ok().json(profile_response(profile)))
}

/// PUT /api/profile - Protected route
///
/// Whole-record write: both fields are replaced with whatever the payload
/// carries, including `None`.
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut profile = state
        .profiles
        .find_by_id(identity.user_id)
        .await?
        .unwrap_or_else(|| Profile::new(identity.user_id));

    profile.first_name = req
        .first_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());
    profile.avatar_url = req.avatar_url.filter(|url| !url.trim().is_empty());
    profile.updated_at = chrono::Utc::now();

    let saved = state.profiles.upsert(profile).await?;

    tracing::info!(user_id = %identity.user_id, "Profile updated");

    Ok(HttpResponse::Ok().json(profile_response(saved)))
}
