//! Persistence ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Post, PostDraft, PostStatusKind, Profile, PublicPost, User};
use crate::error::RepoError;

/// User repository - the identity store.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_confirmation_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_recovery_token(&self, token: &str) -> Result<Option<User>, RepoError>;

    /// Mark the email verified and consume the confirmation token.
    async fn mark_email_verified(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), RepoError>;

    /// Store a fresh recovery token for a pending password reset.
    async fn set_recovery_token(
        &self,
        id: Uuid,
        token: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepoError>;

    /// Replace the password hash and consume any outstanding recovery token.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepoError>;
}

/// Profile repository.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepoError>;

    /// Insert or overwrite the profile row keyed by `profile.id`.
    async fn upsert(&self, profile: Profile) -> Result<Profile, RepoError>;
}

/// Post repository. Owner-scoped operations filter on `id AND user_id` as a
/// single predicate; zero matched rows surface as [`RepoError::NotFound`]
/// whether the post is missing or owned by someone else.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Rewrite every mutable field of an owned post.
    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        draft: PostDraft,
        author: Option<String>,
    ) -> Result<Post, RepoError>;

    /// Hard delete of an owned post. Irreversible.
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> Result<(), RepoError>;

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> Result<Option<Post>, RepoError>;

    /// All posts of one owner, newest first, optionally filtered by status.
    async fn list_owned(
        &self,
        owner: Uuid,
        status: Option<PostStatusKind>,
    ) -> Result<Vec<Post>, RepoError>;

    /// Public view of a single post. Yields nothing unless published.
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<PublicPost>, RepoError>;

    /// Public view of all published posts, newest first.
    async fn list_published(&self) -> Result<Vec<PublicPost>, RepoError>;

    /// Flip every scheduled post whose publish time has elapsed to published.
    /// Returns how many posts went live.
    async fn publish_due(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}
