//! Authentication handlers.
//!
//! Signup is a verify-first flow: accounts start unverified, receive a
//! confirmation link by email and only become able to log in once the link
//! is visited. Password recovery works the same way with a shorter-lived
//! token.

use actix_web::{HttpResponse, http::header, web};
use std::sync::Arc;
use uuid::Uuid;

use serif_core::domain::{Profile, User};
use serif_core::ports::{PasswordService, TokenService};
use serif_shared::ApiResponse;
use serif_shared::dto::{
    AuthResponse, ConfirmQuery, ForgotPasswordRequest, LoginRequest, SignUpRequest,
    UpdatePasswordRequest, UserResponse,
};

use crate::config::AppConfig;
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Where confirmation links land after a successful signup verification.
const DEFAULT_CONFIRM_NEXT: &str = "/dashboard";
/// Where recovery links land; the page holds the new-password form.
const DEFAULT_RECOVERY_NEXT: &str = "/dashboard/reset-password";
/// Error page for dead or expired links.
const LINK_ERROR_LOCATION: &str = "/auth/error?message=Invalid%20or%20expired%20link";

fn user_response(user: &User) -> UserResponse {
    UserResponse {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        email_verified: user.is_verified(),
        created_at: user.created_at,
    }
}

/// Confirmation and recovery links may only point back into the site. Any
/// absolute or protocol-relative URL falls back to `fallback`.
fn sanitize_next(next: Option<&str>, fallback: &str) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
        _ => fallback.to_string(),
    }
}

fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// POST /api/auth/sign-up
pub async fn sign_up(
    state: web::Data<AppState>,
    config: web::Data<AppConfig>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = password_service.hash(&req.password)?;

    let first_name = req
        .first_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    // The unique index on email turns races into constraint violations,
    // which surface as 409s.
    let confirmation_token = Uuid::new_v4().simple().to_string();
    let user = User::new(req.email, password_hash, first_name, confirmation_token);
    let saved = state.users.insert(user).await?;

    let confirm_url = format!(
        "{}/api/auth/confirm?token_hash={}&type=signup&next={}",
        config.public_base_url,
        saved.confirmation_token.as_deref().unwrap_or_default(),
        DEFAULT_CONFIRM_NEXT,
    );
    state.mailer.send_confirmation(&saved.email, &confirm_url).await?;

    tracing::info!(user_id = %saved.id, "New signup, confirmation pending");

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        user_response(&saved),
        "Check your email to confirm your account",
    )))
}

/// GET /api/auth/confirm
///
/// Target of emailed links. Browsers arrive here directly, so failures
/// redirect to an error page instead of returning JSON.
pub async fn confirm(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    query: web::Query<ConfirmQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();

    match query.otp_type.as_str() {
        "signup" => confirm_signup(&state, &query).await,
        "recovery" => confirm_recovery(&state, token_service.get_ref().as_ref(), &query).await,
        other => {
            tracing::debug!(otp_type = %other, "Unknown confirmation type");
            Ok(see_other(LINK_ERROR_LOCATION.to_string()))
        }
    }
}

async fn confirm_signup(state: &AppState, query: &ConfirmQuery) -> AppResult<HttpResponse> {
    let now = chrono::Utc::now();

    let user = match state
        .users
        .find_by_confirmation_token(&query.token_hash)
        .await?
    {
        Some(user) if !user.confirmation_token_expired(now) => user,
        _ => return Ok(see_other(LINK_ERROR_LOCATION.to_string())),
    };

    state.users.mark_email_verified(user.id, now).await?;

    // Backfill the profile with the name captured at signup, without
    // clobbering anything the user already saved.
    let mut profile = match state.profiles.find_by_id(user.id).await? {
        Some(profile) => profile,
        None => Profile::new(user.id),
    };
    if profile.first_name.is_none() {
        profile.first_name = user.first_name.clone();
        profile.updated_at = now;
    }
    state.profiles.upsert(profile).await?;

    // Contact sync must never block or fail the confirmation itself.
    let contact_sync = state.contact_sync.clone();
    let email = user.email.clone();
    let first_name = user.first_name.clone();
    tokio::spawn(async move {
        if let Err(err) = contact_sync.sync_contact(&email, first_name.as_deref()).await {
            tracing::warn!(error = %err, "Contact sync after confirmation failed");
        }
    });

    tracing::info!(user_id = %user.id, "Email confirmed");

    Ok(see_other(sanitize_next(
        query.next.as_deref(),
        DEFAULT_CONFIRM_NEXT,
    )))
}

async fn confirm_recovery(
    state: &AppState,
    token_service: &dyn TokenService,
    query: &ConfirmQuery,
) -> AppResult<HttpResponse> {
    let now = chrono::Utc::now();

    let user = match state.users.find_by_recovery_token(&query.token_hash).await? {
        Some(user) if !user.recovery_token_expired(now) => user,
        _ => return Ok(see_other(LINK_ERROR_LOCATION.to_string())),
    };

    // The session travels in the URL fragment, which browsers keep out of
    // request lines and logs. The token itself is consumed when the new
    // password lands.
    let token = token_service.generate_token(user.id, &user.email)?;
    let next = sanitize_next(query.next.as_deref(), DEFAULT_RECOVERY_NEXT);
    let location = format!("{}#access_token={}&token_type=bearer", next, token);

    tracing::info!(user_id = %user.id, "Recovery link accepted");

    Ok(see_other(location))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Find user by email
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Verify password
    let valid = password_service.verify(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::Unauthorized);
    }

    // Unverified accounts cannot log in; the response is indistinguishable
    // from bad credentials.
    if !user.is_verified() {
        return Err(AppError::Unauthorized);
    }

    let token = token_service.generate_token(user.id, &user.email)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: token_service.expiration_seconds(),
    }))
}

/// POST /api/auth/forgot-password
///
/// Always answers 200 so the endpoint cannot be used to probe which emails
/// have accounts.
pub async fn forgot_password(
    state: web::Data<AppState>,
    config: web::Data<AppConfig>,
    body: web::Json<ForgotPasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if let Some(user) = state.users.find_by_email(&req.email).await? {
        let token = Uuid::new_v4().simple().to_string();
        state
            .users
            .set_recovery_token(user.id, &token, chrono::Utc::now())
            .await?;

        let reset_url = format!(
            "{}/api/auth/confirm?token_hash={}&type=recovery&next={}",
            config.public_base_url, token, DEFAULT_RECOVERY_NEXT,
        );
        if let Err(err) = state.mailer.send_recovery(&user.email, &reset_url).await {
            tracing::warn!(error = %err, "Recovery mail delivery failed");
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        (),
        "If an account exists for that address, a recovery link has been sent",
    )))
}

/// POST /api/auth/update-password - Protected route
pub async fn update_password(
    state: web::Data<AppState>,
    password_service: web::Data<Arc<dyn PasswordService>>,
    identity: Identity,
    body: web::Json<UpdatePasswordRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = password_service.hash(&req.password)?;
    state
        .users
        .update_password(identity.user_id, &password_hash)
        .await?;

    tracing::info!(user_id = %identity.user_id, "Password updated");

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message((), "Password updated")))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(user_response(&user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_paths_must_be_site_relative() {
        assert_eq!(sanitize_next(Some("/dashboard/posts"), "/x"), "/dashboard/posts");
        assert_eq!(sanitize_next(Some("https://evil.example"), "/x"), "/x");
        assert_eq!(sanitize_next(Some("//evil.example"), "/x"), "/x");
        assert_eq!(sanitize_next(Some("dashboard"), "/x"), "/x");
        assert_eq!(sanitize_next(None, "/x"), "/x");
    }
}
