use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Profile;
use crate::error::DomainError;

/// Lifecycle state of a post. A scheduled post carries its publish time
/// inside the variant, so a schedule cannot exist without the status or the
/// status without a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostStatus {
    Draft,
    Published,
    Scheduled { publish_at: DateTime<Utc> },
}

impl PostStatus {
    /// Build a status from the wire shape: a bare discriminant plus an
    /// optional `scheduled_at` field.
    ///
    /// A stray schedule on a draft or published post is cleared, not
    /// rejected. A scheduled post without a publish time, or with one that
    /// is not in the future, is invalid.
    pub fn from_parts(
        kind: PostStatusKind,
        scheduled_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        match kind {
            PostStatusKind::Draft => Ok(Self::Draft),
            PostStatusKind::Published => Ok(Self::Published),
            PostStatusKind::Scheduled => {
                let publish_at = scheduled_at.ok_or_else(|| {
                    DomainError::Validation("Scheduled posts require a publish time".into())
                })?;
                if publish_at <= now {
                    return Err(DomainError::Validation(
                        "Scheduled publish time must be in the future".into(),
                    ));
                }
                Ok(Self::Scheduled { publish_at })
            }
        }
    }

    pub fn kind(&self) -> PostStatusKind {
        match self {
            Self::Draft => PostStatusKind::Draft,
            Self::Published => PostStatusKind::Published,
            Self::Scheduled { .. } => PostStatusKind::Scheduled,
        }
    }

    /// The publish time when scheduled, `None` otherwise.
    pub fn scheduled_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Scheduled { publish_at } => Some(*publish_at),
            _ => None,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published)
    }
}

/// Bare status discriminant, used for filters and storage columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatusKind {
    Draft,
    Published,
    Scheduled,
}

impl PostStatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
        }
    }
}

impl FromStr for PostStatusKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "scheduled" => Ok(Self::Scheduled),
            other => Err(DomainError::Validation(format!(
                "Unknown post status: {other}"
            ))),
        }
    }
}

impl fmt::Display for PostStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Post entity - a user-authored article with a lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    /// Display name snapshot taken at write time, never resolved live.
    pub author: Option<String>,
    pub read_time: Option<i32>,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post owned by `user_id`.
    pub fn new(user_id: Uuid, draft: PostDraft, author: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: draft.title,
            slug: draft.slug,
            summary: draft.summary,
            body: draft.body,
            image: draft.image,
            author,
            read_time: draft.read_time,
            status: draft.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every mutable field from a full draft and bump `updated_at`.
    pub fn apply(&mut self, draft: PostDraft, author: Option<String>) {
        self.title = draft.title;
        self.slug = draft.slug;
        self.summary = draft.summary;
        self.body = draft.body;
        self.image = draft.image;
        self.author = author;
        self.read_time = draft.read_time;
        self.status = draft.status;
        self.updated_at = Utc::now();
    }
}

/// Validated field set for creating or rewriting a post. Mutations always
/// carry the full contract; there is no partial patch.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub read_time: Option<i32>,
    pub status: PostStatus,
}

impl PostDraft {
    /// Field-level validation that does not depend on stored state. Slug
    /// uniqueness is enforced by the storage layer.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".into()));
        }
        if self.slug.trim().is_empty() {
            return Err(DomainError::Validation("Slug is required".into()));
        }
        if let Some(minutes) = self.read_time {
            if minutes <= 0 {
                return Err(DomainError::Validation(
                    "Read time must be a positive number of minutes".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Author display name stored on a post at write time. Falls back to the
/// local part of the email, then to "Anonymous".
pub fn resolve_author(first_name: Option<&str>, email: &str) -> String {
    if let Some(name) = first_name {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_owned();
        }
    }
    let local = email.split('@').next().unwrap_or_default();
    if local.is_empty() {
        "Anonymous".to_owned()
    } else {
        local.to_owned()
    }
}

/// Published-post read model for the public blog. Excludes ownership data
/// and joins the author's profile display fields.
#[derive(Debug, Clone)]
pub struct PublicPost {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub author_first_name: Option<String>,
    pub author_avatar_url: Option<String>,
}

impl PublicPost {
    /// Join a published post with its author's profile, when one exists.
    pub fn from_parts(post: Post, profile: Option<&Profile>) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            summary: post.summary,
            body: post.body,
            image: post.image,
            author: post.author,
            read_time: post.read_time,
            created_at: post.created_at,
            author_first_name: profile.and_then(|p| p.first_name.clone()),
            author_avatar_url: profile.and_then(|p| p.avatar_url.clone()),
        }
    }
}
