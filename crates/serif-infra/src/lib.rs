//! # Serif Infrastructure
//!
//! Concrete implementations of the ports defined in `serif-core`.
//! This crate contains database, storage, auth, and external service
//! integrations, plus in-memory variants for tests and local runs.

pub mod auth;
pub mod contacts;
pub mod database;
pub mod email;
pub mod rate_limit;
pub mod storage;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use contacts::{DisabledContactSync, LoopsContactClient};
pub use database::{
    DatabaseConfig, DatabaseConnections, InMemoryPostRepository, InMemoryProfileRepository,
    InMemoryUserRepository, PostgresPostRepository, PostgresProfileRepository,
    PostgresUserRepository,
};
pub use email::{InMemoryMailer, LogMailer};
pub use rate_limit::{FixedWindowConfig, FixedWindowRateLimiter};
pub use storage::{FsObjectStore, InMemoryObjectStore};
