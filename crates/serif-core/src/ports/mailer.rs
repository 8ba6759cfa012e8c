//! Outbound email port.

use async_trait::async_trait;

/// Transactional email delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send the signup confirmation link.
    async fn send_confirmation(&self, to: &str, confirm_url: &str) -> Result<(), MailError>;

    /// Send the password recovery link.
    async fn send_recovery(&self, to: &str, reset_url: &str) -> Result<(), MailError>;
}

/// Mail delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Delivery failed: {0}")]
    Delivery(String),
}
