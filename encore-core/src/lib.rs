pub mod activity;
pub mod booking;
pub mod events;
pub mod identity;
pub mod repository;
pub mod review;
pub mod user;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
    #[error("Identity verification failed: {0}")]
    IdentityError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<repository::RepoError> for CoreError {
    fn from(err: repository::RepoError) -> Self {
        match err.downcast::<repository::DuplicateKey>() {
            Ok(duplicate) => CoreError::Conflict(duplicate.to_string()),
            Err(err) => CoreError::InternalError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repository::{DuplicateKey, RepoError};

    #[test]
    fn test_duplicate_key_becomes_conflict() {
        let err: RepoError = Box::new(DuplicateKey("email a@b.com".into()));
        match CoreError::from(err) {
            CoreError::Conflict(msg) => assert_eq!(msg, "email a@b.com already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }

        let err: RepoError = "connection reset".into();
        assert!(matches!(CoreError::from(err), CoreError::InternalError(_)));
    }
}
