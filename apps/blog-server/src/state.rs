//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::{
    CategoryRepository, CommentRepository, PasswordService, PostRepository, ReplyRepository,
    TagRepository, TokenService, UserRepository,
};
use blog_core::service::{AccountService, CommentService, PostQueryService};
use blog_infra::{Argon2PasswordService, InMemoryBlogStore, JwtTokenService};

use crate::config::AppConfig;
use crate::render::Renderer;

/// Every repository port the services need.
#[derive(Clone)]
pub struct Repositories {
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub replies: Arc<dyn ReplyRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// All ports backed by one in-memory store.
    pub fn in_memory(store: Arc<InMemoryBlogStore>) -> Self {
        Self {
            posts: store.clone(),
            categories: store.clone(),
            tags: store.clone(),
            comments: store.clone(),
            replies: store.clone(),
            users: store,
        }
    }

    /// Connect to PostgreSQL, optionally bringing the schema up to date.
    #[cfg(feature = "postgres")]
    pub async fn postgres(settings: &crate::config::DatabaseSettings) -> anyhow::Result<Self> {
        use blog_infra::database::{DatabaseConfig, PostgresRepositories, connect};
        use migration::MigratorTrait;

        let db = connect(&DatabaseConfig {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
        })
        .await?;

        if settings.run_migrations {
            tracing::info!("Applying pending migrations");
            migration::Migrator::up(&db, None).await?;
        }

        let repos = PostgresRepositories::new(db);
        Ok(Self {
            posts: repos.posts,
            categories: repos.categories,
            tags: repos.tags,
            comments: repos.comments,
            replies: repos.replies,
            users: repos.users,
        })
    }

    /// PostgreSQL when `DATABASE_URL` is set, otherwise an empty in-memory store.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        match &config.database {
            #[cfg(feature = "postgres")]
            Some(settings) => Self::postgres(settings).await,
            #[cfg(not(feature = "postgres"))]
            Some(_) => anyhow::bail!("DATABASE_URL is set but the postgres feature is disabled"),
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Ok(Self::in_memory(Arc::new(InMemoryBlogStore::new())))
            }
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostQueryService>,
    pub comments: Arc<CommentService>,
    pub accounts: Arc<AccountService>,
    pub tokens: Arc<dyn TokenService>,
    pub renderer: Arc<Renderer>,
    pub login_url: String,
    pub secure_cookies: bool,
}

impl AppState {
    /// Wire the services over the given repositories.
    pub fn new(repos: Repositories, renderer: Renderer, config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());

        let posts = PostQueryService::new(
            repos.posts.clone(),
            repos.categories,
            repos.tags,
            repos.comments.clone(),
            config.blog.clone(),
        );
        let comments = CommentService::new(repos.posts, repos.comments, repos.replies);
        let accounts = AccountService::new(repos.users, passwords, tokens.clone());

        tracing::info!(
            page_size = config.blog.page_size,
            listing_visibility = ?config.blog.listing_visibility,
            "Application state initialized"
        );

        Self {
            posts: Arc::new(posts),
            comments: Arc::new(comments),
            accounts: Arc::new(accounts),
            tokens,
            renderer: Arc::new(renderer),
            login_url: config.login_url.clone(),
            secure_cookies: config.secure_cookies,
        }
    }

    /// Where anonymous users are sent, remembering where they were going.
    pub fn login_redirect(&self, next: &str) -> String {
        let query = serde_urlencoded::to_string([("next", next)]).unwrap_or_default();
        format!("{}?{}", self.login_url, query)
    }
}
