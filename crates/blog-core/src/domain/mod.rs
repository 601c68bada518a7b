//! Domain entities - the core business objects.

mod comment;
mod post;
mod taxonomy;
mod user;
mod viewer;

pub use comment::{Comment, CommentDraft, CommentThread, NewComment, NewReply, Reply};
pub use post::{NewPost, Post};
pub use taxonomy::{Category, Tag};
pub use user::{NewUser, User};
pub use viewer::Viewer;
