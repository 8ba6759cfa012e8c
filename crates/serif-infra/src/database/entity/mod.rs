//! SeaORM entities mirroring the database schema.

pub mod post;
pub mod profile;
pub mod user;
