//! # Blog Shared
//!
//! Wire types shared by the HTTP layer: submitted forms, query strings
//! and problem details.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
