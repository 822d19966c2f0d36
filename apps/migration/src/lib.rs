//! Schema migrations for the Yatube content store.
//!
//! Integrity rules live in the schema itself:
//!
//! - `groups.slug` and `users.username` are unique.
//! - `posts.author_id`, `comments.author_id`, `follows.user_id` and
//!   `follows.author_id` cascade on user delete.
//! - `comments.post_id` cascades on post delete.
//! - `posts.group_id` is set to NULL on group delete.
//! - `follows` has a unique `(user_id, author_id)` index (`one_following`)
//!   and a `user_id <> author_id` check named `user_not_author`.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users;
mod m20240101_000002_create_content_tables;

pub use m20240101_000002_create_content_tables::USER_NOT_AUTHOR;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users::Migration),
            Box::new(m20240101_000002_create_content_tables::Migration),
        ]
    }
}
