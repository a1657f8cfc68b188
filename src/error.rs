//! Domain error taxonomy shared by every service module.

use crate::db::DatabaseError;

/// Failure of a domain operation.
///
/// `NotFound`, `Conflict` and `Validation` are final answers and callers
/// should not retry them; `Persistence` covers storage failures that a
/// client may retry later.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InvalidEnum { field, value } => {
                ServiceError::Validation(format!("Invalid {field}: {value}"))
            }
            other => ServiceError::Persistence(other.to_string()),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Persistence(err.to_string())
    }
}
