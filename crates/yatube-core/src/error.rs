//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),

    #[error("Only the author may change this {0}")]
    Forbidden(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// A field value that can never be stored, regardless of what else is in the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, "this field is required")
    }

    pub fn too_long(field: &'static str, max: usize) -> Self {
        Self::new(field, format!("must be at most {max} characters"))
    }
}

/// A uniqueness, check, or foreign-key rule that an operation would break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintViolation {
    #[error("a group with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("already following this author")]
    DuplicateFollow,

    #[error("users cannot follow themselves")]
    SelfFollow,

    #[error("referenced {0} does not exist")]
    MissingRelation(&'static str),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Constraint violation: {0}")]
    Constraint(#[from] ConstraintViolation),
}

impl RepoError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// The constraint this error reports, if it is a constraint violation.
    pub fn constraint(&self) -> Option<&ConstraintViolation> {
        match self {
            Self::Constraint(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity, id } => DomainError::NotFound {
                entity_type: entity,
                id,
            },
            RepoError::Validation(e) => DomainError::Validation(e),
            RepoError::Constraint(c) => DomainError::Constraint(c),
            RepoError::Connection(msg) | RepoError::Query(msg) => DomainError::Internal(msg),
        }
    }
}
