//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//!
//! Without `postgres` only the in-memory store is available.

pub mod auth;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use memory::InMemoryBlogStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresRepositories};
