//! Error types for the registration service infrastructure

use thiserror::Error;

/// Errors that can occur in the storage layers
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Roll number or transaction id already taken
    #[error("roll number or transaction id already registered")]
    Duplicate,

    /// Blob storage IO error
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Stored data could not be decoded
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl RegistrationError {
    /// Classify a failed insert: unique-constraint violations become
    /// [`RegistrationError::Duplicate`], everything else stays a database
    /// error.
    pub fn from_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RegistrationError::Duplicate
            }
            _ => RegistrationError::Database(err),
        }
    }
}

/// Result type for registration operations
pub type Result<T> = std::result::Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_insert_error_is_not_duplicate() {
        let err = RegistrationError::from_insert(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, RegistrationError::Database(_)));
    }
}
