//! Log-sink mailer.

use async_trait::async_trait;

use serif_core::ports::{MailError, Mailer};

/// Writes outbound mail to the application log instead of delivering it.
/// Default backend in development; deployments slot an SMTP or API client
/// in behind the same port.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation(&self, to: &str, confirm_url: &str) -> Result<(), MailError> {
        tracing::info!(mail_to = %to, url = %confirm_url, "Confirmation email queued");
        Ok(())
    }

    async fn send_recovery(&self, to: &str, reset_url: &str) -> Result<(), MailError> {
        tracing::info!(mail_to = %to, url = %reset_url, "Recovery email queued");
        Ok(())
    }
}
