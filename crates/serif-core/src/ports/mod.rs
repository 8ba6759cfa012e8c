//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod contact;
mod mailer;
mod rate_limit;
mod repository;
mod storage;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use contact::{ContactError, ContactSync};
pub use mailer::{MailError, Mailer};
pub use rate_limit::{RateLimitError, RateLimitResult, RateLimiter};
pub use repository::{PostRepository, ProfileRepository, UserRepository};
pub use storage::{ObjectStore, PutOptions, StorageError};
