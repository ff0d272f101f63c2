//! Error type for repository operations
//!
//! Database failures (including unique-constraint violations on email or
//! username) pass through unchanged in [`RepositoryError::Database`].

/// Result alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Input rejected before reaching the database
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// No user matched the given key
    #[error("User not found: {0}")]
    UserNotFound(String),
}

impl RepositoryError {
    /// True if the database rejected the write because of a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            RepositoryError::Database(sqlx::Error::Database(db_err)) => {
                db_err.is_unique_violation()
            }
            _ => false,
        }
    }
}
