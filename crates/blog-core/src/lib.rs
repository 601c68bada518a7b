//! # Blog Core
//!
//! The domain layer of the blog.
//! This crate contains entities, ports, pagination and the query/mutation
//! services, with zero infrastructure dependencies.

pub mod config;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod query;
pub mod service;

pub use config::{BlogConfig, ListingVisibility};
pub use error::{DomainError, RepoError, ValidationErrors};
