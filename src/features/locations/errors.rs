use thiserror::Error;
use uuid::Uuid;

/// Failures raised by the geo-query core and its storage adapters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(Uuid),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<sqlx::Error> for GeoError {
    fn from(e: sqlx::Error) -> Self {
        GeoError::StorageUnavailable(e.to_string())
    }
}
