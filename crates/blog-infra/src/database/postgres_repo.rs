//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use blog_core::domain::{
    Category, Comment, CommentThread, NewComment, NewReply, NewUser, Post, Reply, Tag, User,
};
use blog_core::error::RepoError;
use blog_core::ports::{
    CategoryRepository, CommentRepository, PostRepository, ReplyRepository, TagRepository,
    UserRepository,
};
use blog_core::query::{PostFilter, PostOrder, PostQuery};

use super::entity::{category, comment, post, post_tag, reply, tag, user};
use super::postgres_base::{PostgresBaseRepository, repo_error};

pub type PostgresPostRepository = PostgresBaseRepository<post::Entity>;
pub type PostgresCategoryRepository = PostgresBaseRepository<category::Entity>;
pub type PostgresTagRepository = PostgresBaseRepository<tag::Entity>;
pub type PostgresCommentRepository = PostgresBaseRepository<comment::Entity>;
pub type PostgresReplyRepository = PostgresBaseRepository<reply::Entity>;
pub type PostgresUserRepository = PostgresBaseRepository<user::Entity>;

/// Every repository, sharing one connection pool.
pub struct PostgresRepositories {
    pub posts: Arc<PostgresPostRepository>,
    pub categories: Arc<PostgresCategoryRepository>,
    pub tags: Arc<PostgresTagRepository>,
    pub comments: Arc<PostgresCommentRepository>,
    pub replies: Arc<PostgresReplyRepository>,
    pub users: Arc<PostgresUserRepository>,
}

impl PostgresRepositories {
    pub fn new(db: DbConn) -> Self {
        let db = Arc::new(db);
        Self {
            posts: Arc::new(PostgresBaseRepository::shared(db.clone())),
            categories: Arc::new(PostgresBaseRepository::shared(db.clone())),
            tags: Arc::new(PostgresBaseRepository::shared(db.clone())),
            comments: Arc::new(PostgresBaseRepository::shared(db.clone())),
            replies: Arc::new(PostgresBaseRepository::shared(db.clone())),
            users: Arc::new(PostgresBaseRepository::shared(db)),
        }
    }
}

/// Escape `LIKE` wildcards so the needle matches literally.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for ch in text.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn lower_like(column: post::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((post::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn post_condition(filter: &PostFilter) -> Condition {
    let mut condition = Condition::all();

    if filter.published_only {
        condition = condition.add(post::Column::IsPublished.eq(true));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if let Some(tag_id) = filter.tag_id {
        condition = condition.add(
            post::Column::Id.in_subquery(
                Query::select()
                    .column(post_tag::Column::PostId)
                    .from(post_tag::Entity)
                    .and_where(post_tag::Column::TagId.eq(tag_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        condition = condition.add(
            Condition::any()
                .add(lower_like(post::Column::Title, &pattern))
                .add(lower_like(post::Column::Content, &pattern)),
        );
    }

    condition
}

impl PostgresPostRepository {
    /// Resolve tags for a batch of posts, keyed by post id and sorted by name.
    async fn tags_by_post(&self, post_ids: &[i64]) -> Result<HashMap<i64, Vec<Tag>>, RepoError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids.iter().copied()))
            .find_also_related(tag::Entity)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        let mut by_post: HashMap<i64, Vec<Tag>> = HashMap::new();
        for (link, tag) in rows {
            if let Some(tag) = tag {
                by_post.entry(link.post_id).or_default().push(tag.into());
            }
        }
        for tags in by_post.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }

        Ok(by_post)
    }

    async fn hydrate(
        &self,
        rows: Vec<(post::Model, Option<category::Model>)>,
    ) -> Result<Vec<Post>, RepoError> {
        let ids: Vec<i64> = rows.iter().map(|(p, _)| p.id).collect();
        let mut tags = self.tags_by_post(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|(model, category)| {
                let post_tags = tags.remove(&model.id).unwrap_or_default();
                model.into_domain(category.map(Into::into), post_tags)
            })
            .collect())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let row = post::Entity::find_by_id(id)
            .find_also_related(category::Entity)
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.hydrate(vec![row]).await?.pop())
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        post::Entity::find()
            .filter(post_condition(filter))
            .count(&*self.db)
            .await
            .map_err(repo_error)
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(filter = ?query.filter, window = ?query.window, "Listing posts");

        let mut select = post::Entity::find().filter(post_condition(&query.filter));
        select = match query.order {
            PostOrder::UpdatedAtDesc => select
                .order_by_desc(post::Column::UpdatedAt)
                .order_by_desc(post::Column::Id),
        };
        if let Some(window) = query.window {
            select = select.offset(window.offset).limit(window.limit);
        }

        let rows = select
            .find_also_related(category::Entity)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        self.hydrate(rows).await
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let model = comment::ActiveModel::from(new)
            .insert(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }

    async fn threads_for_post(&self, post_id: i64) -> Result<Vec<CommentThread>, RepoError> {
        let comments = comment::Entity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        if comments.is_empty() {
            return Ok(Vec::new());
        }

        let replies = reply::Entity::find()
            .filter(reply::Column::CommentId.is_in(comments.iter().map(|c| c.id)))
            .order_by_asc(reply::Column::CreatedAt)
            .order_by_asc(reply::Column::Id)
            .all(&*self.db)
            .await
            .map_err(repo_error)?;

        let mut by_comment: HashMap<i64, Vec<Reply>> = HashMap::new();
        for model in replies {
            by_comment
                .entry(model.comment_id)
                .or_default()
                .push(model.into());
        }

        Ok(comments
            .into_iter()
            .map(|model| CommentThread {
                replies: by_comment.remove(&model.id).unwrap_or_default(),
                comment: model.into(),
            })
            .collect())
    }
}

#[async_trait]
impl ReplyRepository for PostgresReplyRepository {
    async fn create(&self, new: NewReply) -> Result<Reply, RepoError> {
        let model = reply::ActiveModel::from(new)
            .insert(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(new)
            .insert(&*self.db)
            .await
            .map_err(repo_error)?;

        Ok(model.into())
    }
}
