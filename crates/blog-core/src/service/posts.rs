use std::sync::Arc;

use serde::Serialize;

use crate::config::{BlogConfig, ListingVisibility};
use crate::domain::{Category, CommentThread, Post, Tag, Viewer};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest, Paginator};
use crate::ports::{CategoryRepository, CommentRepository, PostRepository, TagRepository};
use crate::query::{PostFilter, PostQuery};

/// What a listing was narrowed to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListingScope {
    All,
    Category(Category),
    Tag(Tag),
}

#[derive(Debug, Clone, Serialize)]
pub struct PostListing {
    pub scope: ListingScope,
    pub page: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    /// The query exactly as submitted.
    pub query: String,
    /// Matches across all pages.
    pub post_count: u64,
    pub page: Page<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<CommentThread>,
}

/// Read-only post retrieval: listings, search and detail.
pub struct PostQueryService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    config: BlogConfig,
}

impl PostQueryService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        comments: Arc<dyn CommentRepository>,
        config: BlogConfig,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
            comments,
            config,
        }
    }

    /// All posts, newest update first.
    pub async fn list_posts(
        &self,
        viewer: Viewer,
        page: PageRequest,
    ) -> Result<PostListing, DomainError> {
        let filter = self.listing_filter(viewer);
        Ok(PostListing {
            scope: ListingScope::All,
            page: self.paginate(filter, page).await?,
        })
    }

    /// Posts in the category identified by `slug`.
    pub async fn list_by_category(
        &self,
        viewer: Viewer,
        slug: &str,
        page: PageRequest,
    ) -> Result<PostListing, DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        tracing::debug!(category_id = category.id, slug, "Listing posts by category");

        let filter = self.listing_filter(viewer).in_category(category.id);
        Ok(PostListing {
            page: self.paginate(filter, page).await?,
            scope: ListingScope::Category(category),
        })
    }

    /// Posts carrying the tag identified by `slug`.
    pub async fn list_by_tag(
        &self,
        viewer: Viewer,
        slug: &str,
        page: PageRequest,
    ) -> Result<PostListing, DomainError> {
        let tag = self
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("tag", slug))?;

        tracing::debug!(tag_id = tag.id, slug, "Listing posts by tag");

        let filter = self.listing_filter(viewer).with_tag(tag.id);
        Ok(PostListing {
            page: self.paginate(filter, page).await?,
            scope: ListingScope::Tag(tag),
        })
    }

    /// Case-insensitive search over title and content. Anonymous viewers
    /// only ever see published posts here.
    pub async fn search(
        &self,
        viewer: Viewer,
        query: Option<&str>,
        page: PageRequest,
    ) -> Result<SearchResults, DomainError> {
        let query = query.unwrap_or_default().to_string();
        let filter = PostFilter::all()
            .containing(&query)
            .published_only(!viewer.is_authenticated());

        let page = self.paginate(filter, page).await?;
        tracing::debug!(query = %query, post_count = page.total, "Searched posts");

        Ok(SearchResults {
            query,
            post_count: page.total,
            page,
        })
    }

    /// A single post and its comment threads. Drafts are reported as
    /// missing to anonymous viewers.
    pub async fn get_post(&self, viewer: Viewer, id: i64) -> Result<PostDetail, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .filter(|post| post.is_visible_to(&viewer))
            .ok_or_else(|| DomainError::not_found("post", id))?;

        let comments = self.comments.threads_for_post(post.id).await?;
        Ok(PostDetail { post, comments })
    }

    fn listing_filter(&self, viewer: Viewer) -> PostFilter {
        let hide_drafts = self.config.listing_visibility == ListingVisibility::HideUnpublished
            && !viewer.is_authenticated();
        PostFilter::all().published_only(hide_drafts)
    }

    async fn paginate(&self, filter: PostFilter, request: PageRequest) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count(&filter).await?;
        let paginator = Paginator::new(total, self.config.page_size);
        let number = paginator.resolve(request);

        let query = PostQuery::new(filter).window(paginator.window(number));
        let items = self.posts.list(&query).await?;

        Ok(paginator.page(number, items))
    }
}
