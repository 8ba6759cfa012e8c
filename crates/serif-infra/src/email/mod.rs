//! Outbound email backends.

mod log;
mod memory;

pub use log::LogMailer;
pub use memory::{InMemoryMailer, MailKind, SentMail};
