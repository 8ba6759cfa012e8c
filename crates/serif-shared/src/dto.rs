//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to sign up a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to start a password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Query string carried by emailed confirmation links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmQuery {
    pub token_hash: String,
    /// Either "signup" or "recovery".
    #[serde(rename = "type")]
    pub otp_type: String,
    /// Site-relative path to land on after verification.
    pub next: Option<String>,
}

/// Request to change the password of the authenticated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request to update the caller's profile display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Response containing profile display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub avatar_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Query string for the owner's post list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListQuery {
    /// Optional status filter: "draft", "published" or "scheduled".
    pub status: Option<String>,
}

/// Full field contract for creating or updating a post. The same payload is
/// accepted by both mutations; updates are whole-record rewrites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    /// Derived from the title when omitted or blank.
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub read_time: Option<i32>,
    /// One of "draft", "published", "scheduled". Defaults to "draft".
    pub status: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// A post as seen by its owner on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<i32>,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A published post as rendered on the public blog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    /// Sanitized HTML, safe to render as-is.
    pub body: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub author_first_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

/// Response for a stored image upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
    pub path: String,
}

/// Request accepted by the internal contact-sync endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSyncRequest {
    pub email: Option<String>,
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
}
