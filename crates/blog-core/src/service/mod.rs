//! Application services - the query/filter layer and the comment flows.
//!
//! Handlers stay thin: they parse the request, call one of these services
//! with the requesting [`Viewer`](crate::domain::Viewer) and render or
//! redirect on the result.

mod accounts;
mod comments;
mod posts;

pub use accounts::{AccountService, Session};
pub use comments::{CommentService, PostedReply};
pub use posts::{ListingScope, PostDetail, PostListing, PostQueryService, SearchResults};
