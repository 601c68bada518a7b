//! Data Transfer Objects - forms and query strings accepted over HTTP.

use serde::{Deserialize, Serialize};

/// `?page=` on listing routes. Kept as raw text so that bad values fall
/// back to the first page instead of failing extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

/// `/search?query=&page=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<String>,
}

/// Comment and reply submission form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub content: String,
}

/// `?next=` on the login routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}
