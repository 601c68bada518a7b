use async_trait::async_trait;

use crate::domain::{
    Category, Comment, CommentThread, NewComment, NewReply, NewUser, Post, Reply, Tag, User,
};
use crate::error::RepoError;
use crate::query::{PostFilter, PostQuery};

/// Generic repository trait defining lookup and removal by id.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Fails with `RepoError::NotFound` if absent.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Read side of posts. Posts are authored elsewhere and never deleted here.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Find a post with its category and tags resolved.
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError>;

    /// Number of posts matching the filter.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// Matching posts, ordered and windowed as requested.
    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

#[async_trait]
pub trait TagRepository: BaseRepository<Tag, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;
}

/// Comments. Deleting a comment removes its replies as well.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i64> {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments of a post with their replies, both oldest first.
    async fn threads_for_post(&self, post_id: i64) -> Result<Vec<CommentThread>, RepoError>;
}

#[async_trait]
pub trait ReplyRepository: BaseRepository<Reply, i64> {
    async fn create(&self, reply: NewReply) -> Result<Reply, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    /// Find a user by their login name.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}
