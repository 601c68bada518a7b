use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ValidationErrors};

/// Comment entity - a reader's remark attached to one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Reply entity - an answer to one comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: i64,
    pub comment_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A comment together with its replies, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    pub fn new(post_id: i64, content: String) -> Self {
        Self {
            post_id,
            content,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReply {
    pub comment_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewReply {
    pub fn new(comment_id: i64, content: String) -> Self {
        Self {
            comment_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Unvalidated comment or reply text as submitted by a reader.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommentDraft {
    pub content: String,
}

impl CommentDraft {
    /// Maximum content length in characters, after trimming.
    pub const MAX_LEN: usize = 2000;

    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Check the field constraints and return the text to store.
    pub fn validate(&self) -> Result<String, DomainError> {
        let content = self.content.trim();
        let mut errors = ValidationErrors::new();

        if content.is_empty() {
            errors.add("content", "This field is required.");
        } else {
            let len = content.chars().count();
            if len > Self::MAX_LEN {
                errors.add(
                    "content",
                    format!(
                        "Ensure this value has at most {} characters (it has {len}).",
                        Self::MAX_LEN
                    ),
                );
            }
        }

        errors.into_result()?;
        Ok(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_content() {
        let draft = CommentDraft::new("  Nice post \n");
        assert_eq!(draft.validate().unwrap(), "Nice post");
    }

    #[test]
    fn test_validate_rejects_blank() {
        let err = CommentDraft::new(" \t ").validate().unwrap_err();
        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors.field("content"), ["This field is required."]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_too_long() {
        let draft = CommentDraft::new("あ".repeat(CommentDraft::MAX_LEN + 1));
        assert!(matches!(draft.validate(), Err(DomainError::Validation(_))));

        let at_limit = CommentDraft::new("あ".repeat(CommentDraft::MAX_LEN));
        assert!(at_limit.validate().is_ok());
    }
}
