//! Database connection management and repository implementations.

mod connections;
mod memory_repo;
mod postgres_repo;

pub mod entity;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use memory_repo::{InMemoryPostRepository, InMemoryProfileRepository, InMemoryUserRepository};
pub use postgres_repo::{
    PostgresPostRepository, PostgresProfileRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
