//! PostgreSQL persistence via SeaORM.

mod connections;
pub mod entity;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use postgres_base::PostgresBaseRepository;
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresReplyRepository, PostgresRepositories, PostgresTagRepository, PostgresUserRepository,
};
