//! In-memory mailer - captures outbound mail without delivering it.

use async_trait::async_trait;
use tokio::sync::Mutex;

use serif_core::ports::{MailError, Mailer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailKind {
    Confirmation,
    Recovery,
}

/// A message captured by [`InMemoryMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub kind: MailKind,
    pub url: String,
}

#[derive(Default)]
pub struct InMemoryMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send_confirmation(&self, to: &str, confirm_url: &str) -> Result<(), MailError> {
        self.sent.lock().await.push(SentMail {
            to: to.to_owned(),
            kind: MailKind::Confirmation,
            url: confirm_url.to_owned(),
        });
        Ok(())
    }

    async fn send_recovery(&self, to: &str, reset_url: &str) -> Result<(), MailError> {
        self.sent.lock().await.push(SentMail {
            to: to.to_owned(),
            kind: MailKind::Recovery,
            url: reset_url.to_owned(),
        });
        Ok(())
    }
}
