//! # Yatube Core
//!
//! The domain layer of Yatube: users, groups, posts, comments and follows,
//! the rules they must satisfy, and the repository ports that store them.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{ConstraintViolation, DomainError, RepoError, ValidationError};
