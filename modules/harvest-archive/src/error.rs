use harvest_common::{ErrorKind, FetchError, ValidationError};

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, HarvestError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl CacheError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InternalError
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Bad request: {0}")]
    BadRequest(#[from] ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HarvestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::Cache(e) => e.kind(),
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Internal(_) => ErrorKind::InternalError,
        }
    }
}
