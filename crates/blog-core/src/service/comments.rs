use std::sync::Arc;

use crate::domain::{Comment, CommentDraft, NewComment, NewReply, Post, Reply, Viewer};
use crate::error::{DomainError, RepoError};
use crate::ports::{CommentRepository, PostRepository, ReplyRepository};

/// A stored reply and the post its thread belongs to.
#[derive(Debug, Clone)]
pub struct PostedReply {
    pub reply: Reply,
    pub post_id: i64,
}

/// Create and delete flows for comments and replies.
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    replies: Arc<dyn ReplyRepository>,
}

impl CommentService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        replies: Arc<dyn ReplyRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            replies,
        }
    }

    /// The post a new comment would attach to.
    pub async fn comment_target(&self, post_id: i64) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    /// The comment a new reply would attach to.
    pub async fn reply_target(&self, comment_id: i64) -> Result<Comment, DomainError> {
        self.find_comment(comment_id).await
    }

    /// Validate and store a comment on `post_id`.
    pub async fn create_comment(
        &self,
        post_id: i64,
        draft: &CommentDraft,
    ) -> Result<Comment, DomainError> {
        let content = draft.validate()?;
        let post = self.comment_target(post_id).await?;

        let comment = self
            .comments
            .create(NewComment::new(post.id, content))
            .await?;

        tracing::info!(comment_id = comment.id, post_id = post.id, "Comment created");
        Ok(comment)
    }

    /// Validate and store a reply to `comment_id`.
    pub async fn create_reply(
        &self,
        comment_id: i64,
        draft: &CommentDraft,
    ) -> Result<PostedReply, DomainError> {
        let content = draft.validate()?;
        let comment = self.find_comment(comment_id).await?;

        let reply = self
            .replies
            .create(NewReply::new(comment.id, content))
            .await?;

        tracing::info!(reply_id = reply.id, comment_id = comment.id, "Reply created");
        Ok(PostedReply {
            reply,
            post_id: comment.post_id,
        })
    }

    /// Load a comment for the delete confirmation page.
    pub async fn comment_for_deletion(
        &self,
        viewer: Viewer,
        id: i64,
    ) -> Result<Comment, DomainError> {
        require_authenticated(viewer)?;
        self.find_comment(id).await
    }

    /// Delete a comment and its replies. Returns the owning post id.
    pub async fn delete_comment(&self, viewer: Viewer, id: i64) -> Result<i64, DomainError> {
        let comment = self.comment_for_deletion(viewer, id).await?;

        self.comments
            .delete(comment.id)
            .await
            .map_err(|e| missing_as_not_found(e, "comment", id))?;

        tracing::info!(comment_id = id, post_id = comment.post_id, "Comment deleted");
        Ok(comment.post_id)
    }

    /// Load a reply for the delete confirmation page.
    pub async fn reply_for_deletion(&self, viewer: Viewer, id: i64) -> Result<Reply, DomainError> {
        require_authenticated(viewer)?;
        self.replies
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("reply", id))
    }

    /// Delete a single reply. Returns the post its thread belongs to.
    pub async fn delete_reply(&self, viewer: Viewer, id: i64) -> Result<i64, DomainError> {
        let reply = self.reply_for_deletion(viewer, id).await?;
        let comment = self.find_comment(reply.comment_id).await?;

        self.replies
            .delete(reply.id)
            .await
            .map_err(|e| missing_as_not_found(e, "reply", id))?;

        tracing::info!(reply_id = id, post_id = comment.post_id, "Reply deleted");
        Ok(comment.post_id)
    }

    async fn find_comment(&self, id: i64) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", id))
    }
}

fn require_authenticated(viewer: Viewer) -> Result<(), DomainError> {
    if viewer.is_authenticated() {
        Ok(())
    } else {
        Err(DomainError::AuthenticationRequired)
    }
}

// A concurrent delete can remove the row between lookup and delete.
fn missing_as_not_found(err: RepoError, entity: &'static str, id: i64) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::not_found(entity, id),
        other => other.into(),
    }
}
