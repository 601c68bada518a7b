//! Schema migrations for the blog database.

pub use sea_orm_migration::prelude::*;

mod m20220804_000001_create_taxonomy;
mod m20220804_000002_create_posts;
mod m20220804_000003_create_comments;
mod m20220804_000004_create_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20220804_000001_create_taxonomy::Migration),
            Box::new(m20220804_000002_create_posts::Migration),
            Box::new(m20220804_000003_create_comments::Migration),
            Box::new(m20220804_000004_create_users::Migration),
        ]
    }
}
