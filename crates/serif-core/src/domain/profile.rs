use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile entity - one row per user, holding public display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Same id as the owning user.
    pub id: Uuid,
    pub first_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create an empty profile. Rows appear lazily on the first action that
    /// needs one.
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            first_name: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
