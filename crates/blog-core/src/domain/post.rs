use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, Tag, Viewer};

/// Post entity - a blog article with its category and tags resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    /// Markdown source.
    pub content: String,
    pub created_at: NaiveDate,
    pub updated_at: NaiveDate,
    pub is_published: bool,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Maximum title length in characters.
    pub const TITLE_MAX_LEN: usize = 200;

    /// Published posts are visible to everyone, drafts only to signed-in users.
    pub fn is_visible_to(&self, viewer: &Viewer) -> bool {
        self.is_published || viewer.is_authenticated()
    }

    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub created_at: NaiveDate,
    pub updated_at: NaiveDate,
    pub is_published: bool,
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
}

impl NewPost {
    /// Create an unpublished, uncategorised post dated today.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let today = Utc::now().date_naive();
        Self {
            title: title.into(),
            content: content.into(),
            created_at: today,
            updated_at: today,
            is_published: false,
            category_id: None,
            tag_ids: Vec::new(),
        }
    }

    pub fn published(mut self) -> Self {
        self.is_published = true;
        self
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn tagged(mut self, tag_id: i64) -> Self {
        self.tag_ids.push(tag_id);
        self
    }

    pub fn updated_on(mut self, date: NaiveDate) -> Self {
        self.updated_at = date;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Post {
        let today = Utc::now().date_naive();
        Post {
            id: 1,
            title: "Draft".into(),
            content: "...".into(),
            created_at: today,
            updated_at: today,
            is_published: false,
            category: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_draft_visible_only_to_authenticated() {
        let post = draft();
        assert!(!post.is_visible_to(&Viewer::Anonymous));
        assert!(post.is_visible_to(&Viewer::Authenticated { user_id: 7 }));
    }

    #[test]
    fn test_published_visible_to_everyone() {
        let post = Post {
            is_published: true,
            ..draft()
        };
        assert!(post.is_visible_to(&Viewer::Anonymous));
    }
}
