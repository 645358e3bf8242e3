//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.

use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Required linkage settings missing or malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Underlying store failure, passed through unchanged
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// True when the store rejected a write because of a UNIQUE/PK constraint
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DomainError::Store(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            DomainError::Config("junction table not set".to_string()).to_string(),
            "Configuration error: junction table not set"
        );
        assert_eq!(
            DomainError::NotFound("Tag 3".to_string()).to_string(),
            "Not found: Tag 3"
        );
    }

    #[test]
    fn test_constraint_violation_detection() {
        let err = DomainError::Store(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE),
            Some("UNIQUE constraint failed: tags.name".to_string()),
        ));
        assert!(err.is_constraint_violation());
        assert!(!DomainError::Internal("x".to_string()).is_constraint_violation());
    }
}
