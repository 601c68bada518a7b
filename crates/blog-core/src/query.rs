//! Explicit post query: filter, order and page window, evaluated eagerly by
//! the repository.

use std::cmp::Ordering;

use crate::domain::Post;
use crate::pagination::Window;

/// Conditions a post must satisfy. All set conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    /// Case-insensitive substring of title or content.
    pub text: Option<String>,
    pub published_only: bool,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_tag(mut self, tag_id: i64) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    /// Restrict to posts containing `text`; blank text adds no condition.
    pub fn containing(mut self, text: &str) -> Self {
        let text = text.trim();
        self.text = (!text.is_empty()).then(|| text.to_string());
        self
    }

    pub fn published_only(mut self, published_only: bool) -> Self {
        self.published_only = published_only;
        self
    }

    /// In-process evaluation, for stores that cannot push the filter down.
    pub fn matches(&self, post: &Post) -> bool {
        if self.published_only && !post.is_published {
            return false;
        }
        if let Some(category_id) = self.category_id {
            if post.category.as_ref().map(|c| c.id) != Some(category_id) {
                return false;
            }
        }
        if let Some(tag_id) = self.tag_id {
            if !post.has_tag(tag_id) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Most recently updated first, ties broken by newest id.
    #[default]
    UpdatedAtDesc,
}

impl PostOrder {
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self {
            PostOrder::UpdatedAtDesc => b
                .updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.id.cmp(&a.id)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub filter: PostFilter,
    pub order: PostOrder,
    /// `None` returns every match.
    pub window: Option<Window>,
}

impl PostQuery {
    pub fn new(filter: PostFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn window(mut self, window: Window) -> Self {
        self.window = Some(window);
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Category, Tag};

    fn post(id: i64, title: &str, content: &str, day: u32) -> Post {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Post {
            id,
            title: title.into(),
            content: content.into(),
            created_at: date,
            updated_at: date,
            is_published: true,
            category: None,
            tags: vec![],
        }
    }

    #[test]
    fn test_text_filter_is_case_insensitive_over_title_and_content() {
        let filter = PostFilter::all().containing("RUST");
        assert!(filter.matches(&post(1, "Learning rust", "", 1)));
        assert!(filter.matches(&post(2, "Notes", "Ownership in Rust", 1)));
        assert!(!filter.matches(&post(3, "Go", "goroutines", 1)));
    }

    #[test]
    fn test_blank_text_adds_no_condition() {
        assert_eq!(PostFilter::all().containing("   ").text, None);
    }

    #[test]
    fn test_category_and_tag_conditions() {
        let mut p = post(1, "t", "c", 1);
        p.category = Some(Category {
            id: 3,
            name: "Tech".into(),
            slug: "tech".into(),
        });
        p.tags = vec![Tag {
            id: 9,
            name: "Rust".into(),
            slug: "rust".into(),
        }];

        assert!(PostFilter::all().in_category(3).with_tag(9).matches(&p));
        assert!(!PostFilter::all().in_category(4).matches(&p));
        assert!(!PostFilter::all().with_tag(1).matches(&p));
    }

    #[test]
    fn test_published_only_hides_drafts() {
        let mut p = post(1, "t", "c", 1);
        p.is_published = false;
        assert!(!PostFilter::all().published_only(true).matches(&p));
        assert!(PostFilter::all().matches(&p));
    }

    #[test]
    fn test_updated_at_desc_order() {
        let older = post(1, "a", "", 1);
        let newer = post(2, "b", "", 2);
        let same_day_newer_id = post(3, "c", "", 2);

        let mut posts = vec![older, newer, same_day_newer_id];
        posts.sort_by(|a, b| PostOrder::UpdatedAtDesc.compare(a, b));

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
