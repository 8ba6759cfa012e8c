//! Marketing contact list port.

use async_trait::async_trait;

/// Push a contact to the external marketing audience.
#[async_trait]
pub trait ContactSync: Send + Sync {
    async fn sync_contact(&self, email: &str, first_name: Option<&str>)
    -> Result<(), ContactError>;
}

/// Contact sync errors.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Contact sync is not configured")]
    Disabled,

    #[error("Contact service error: {0}")]
    Upstream(String),
}
