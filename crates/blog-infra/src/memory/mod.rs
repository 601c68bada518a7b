//! In-memory store - used when no database is configured, and in tests.
//!
//! One [`InMemoryBlogStore`] implements every repository port over a single
//! set of tables, so relations (post → category, comment → reply) behave
//! like the database: deleting a comment removes its replies, deleting a
//! category detaches its posts. Data is lost on process restart.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use blog_core::domain::{
    Category, Comment, CommentThread, NewComment, NewPost, NewReply, NewUser, Post, Reply, Tag,
    User,
};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, ReplyRepository,
    TagRepository, UserRepository,
};
use blog_core::query::{PostFilter, PostQuery};

/// A post row: category and tags by id, as the database stores them.
#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    created_at: NaiveDate,
    updated_at: NaiveDate,
    is_published: bool,
    category_id: Option<i64>,
    tag_ids: Vec<i64>,
}

/// A table with its own id sequence.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert_with_id(&mut self, id: i64, row: T) -> Result<(), RepoError> {
        if self.rows.contains_key(&id) {
            return Err(RepoError::Constraint(format!("duplicate id {id}")));
        }
        self.last_id = self.last_id.max(id);
        self.rows.insert(id, row);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Tables {
    categories: Table<Category>,
    tags: Table<Tag>,
    posts: Table<PostRow>,
    comments: Table<Comment>,
    replies: Table<Reply>,
    users: Table<User>,
}

impl Tables {
    fn hydrate(&self, row: &PostRow) -> Post {
        Post {
            id: row.id,
            title: row.title.clone(),
            content: row.content.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_published: row.is_published,
            category: row
                .category_id
                .and_then(|id| self.categories.rows.get(&id).cloned()),
            tags: row
                .tag_ids
                .iter()
                .filter_map(|id| self.tags.rows.get(id).cloned())
                .collect(),
        }
    }

    fn matching_posts(&self, filter: &PostFilter) -> Vec<Post> {
        self.posts
            .rows
            .values()
            .map(|row| self.hydrate(row))
            .filter(|post| filter.matches(post))
            .collect()
    }
}

/// Thread-safe in-memory implementation of every blog repository.
#[derive(Debug, Default)]
pub struct InMemoryBlogStore {
    tables: RwLock<Tables>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_category(&self, name: &str, slug: &str) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.rows.values().any(|c| c.slug == slug) {
            return Err(RepoError::Constraint(format!(
                "category slug '{slug}' already exists"
            )));
        }

        let id = tables.categories.next_id();
        let category = Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        };
        tables.categories.rows.insert(id, category.clone());
        Ok(category)
    }

    pub async fn insert_tag(&self, name: &str, slug: &str) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.tags.rows.values().any(|t| t.slug == slug) {
            return Err(RepoError::Constraint(format!(
                "tag slug '{slug}' already exists"
            )));
        }

        let id = tables.tags.next_id();
        let tag = Tag {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        };
        tables.tags.rows.insert(id, tag.clone());
        Ok(tag)
    }

    pub async fn insert_post(&self, post: NewPost) -> Result<Post, RepoError> {
        let id = self.tables.write().await.posts.next_id();
        self.insert_post_with_id(id, post).await
    }

    /// Store a post under a caller-chosen id.
    pub async fn insert_post_with_id(&self, id: i64, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if let Some(category_id) = post.category_id {
            if !tables.categories.rows.contains_key(&category_id) {
                return Err(RepoError::Constraint(format!(
                    "category {category_id} does not exist"
                )));
            }
        }
        if let Some(missing) = post
            .tag_ids
            .iter()
            .find(|id| !tables.tags.rows.contains_key(id))
        {
            return Err(RepoError::Constraint(format!("tag {missing} does not exist")));
        }

        let mut tag_ids = post.tag_ids;
        tag_ids.sort_unstable();
        tag_ids.dedup();

        let row = PostRow {
            id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
            is_published: post.is_published,
            category_id: post.category_id,
            tag_ids,
        };
        let hydrated = tables.hydrate(&row);
        tables.posts.insert_with_id(id, row)?;
        Ok(hydrated)
    }
}

#[async_trait]
impl PostRepository for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.rows.get(&id).map(|row| tables.hydrate(row)))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_posts(filter).len() as u64)
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts = tables.matching_posts(&query.filter);
        posts.sort_by(|a, b| query.order.compare(a, b));

        Ok(match query.window {
            Some(window) => posts
                .into_iter()
                .skip(window.offset as usize)
                .take(window.limit as usize)
                .collect(),
            None => posts,
        })
    }
}

#[async_trait]
impl BaseRepository<Category, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .categories
            .rows
            .remove(&id)
            .ok_or(RepoError::NotFound)?;

        for post in tables.posts.rows.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .rows
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }
}

#[async_trait]
impl BaseRepository<Tag, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.rows.remove(&id).ok_or(RepoError::NotFound)?;

        for post in tables.posts.rows.values_mut() {
            post.tag_ids.retain(|tag_id| *tag_id != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryBlogStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.rows.values().find(|t| t.slug == slug).cloned())
    }
}

#[async_trait]
impl BaseRepository<Comment, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.comments.rows.remove(&id).ok_or(RepoError::NotFound)?;
        tables.replies.rows.retain(|_, reply| reply.comment_id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryBlogStore {
    async fn create(&self, comment: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.rows.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint(format!(
                "post {} does not exist",
                comment.post_id
            )));
        }

        let id = tables.comments.next_id();
        let comment = Comment {
            id,
            post_id: comment.post_id,
            content: comment.content,
            created_at: comment.created_at,
        };
        tables.comments.rows.insert(id, comment.clone());
        Ok(comment)
    }

    async fn threads_for_post(&self, post_id: i64) -> Result<Vec<CommentThread>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<Comment> = tables
            .comments
            .rows
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));

        Ok(comments
            .into_iter()
            .map(|comment| {
                let mut replies: Vec<Reply> = tables
                    .replies
                    .rows
                    .values()
                    .filter(|r| r.comment_id == comment.id)
                    .cloned()
                    .collect();
                replies.sort_by_key(|r| (r.created_at, r.id));
                CommentThread { comment, replies }
            })
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Reply, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Reply>, RepoError> {
        Ok(self.tables.read().await.replies.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .replies
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl ReplyRepository for InMemoryBlogStore {
    async fn create(&self, reply: NewReply) -> Result<Reply, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.rows.contains_key(&reply.comment_id) {
            return Err(RepoError::Constraint(format!(
                "comment {} does not exist",
                reply.comment_id
            )));
        }

        let id = tables.replies.next_id();
        let reply = Reply {
            id,
            comment_id: reply.comment_id,
            content: reply.content,
            created_at: reply.created_at,
        };
        tables.replies.rows.insert(id, reply.clone());
        Ok(reply)
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryBlogStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .users
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryBlogStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .rows
            .values()
            .any(|u| u.username == user.username)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let id = tables.users.next_id();
        let user = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            created_at: user.created_at,
        };
        tables.users.rows.insert(id, user.clone());
        Ok(user)
    }
}
