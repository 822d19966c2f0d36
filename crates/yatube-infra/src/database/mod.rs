//! Content store implementations and database connection management.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod db_base;
#[cfg(feature = "postgres")]
pub mod db_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::InMemoryContentStore;

#[cfg(feature = "postgres")]
pub use connections::connect;
#[cfg(feature = "postgres")]
pub use db_base::DbRepository;
#[cfg(feature = "postgres")]
pub use db_repo::{
    DbCommentRepository, DbContentStore, DbFollowRepository, DbGroupRepository,
    DbPostRepository, DbUserRepository,
};

#[cfg(test)]
mod store_checks;
