use minisite_core::error::CoreError;
use minisite_core::types::DbId;

/// Errors returned by the versioning coordinators.
///
/// Domain rejections (missing rows, ownership, state, concurrency) arrive as
/// [`CoreError`]; storage failures keep the original `sqlx::Error` as their
/// source so callers can log the full chain.
#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The publish transaction failed and was rolled back.
    #[error("Failed to publish version {version_id} for site {site_id}")]
    PublishFailed {
        site_id: DbId,
        version_id: DbId,
        #[source]
        source: sqlx::Error,
    },

    /// Any other transaction-level failure.
    #[error("Persistence error during {operation}")]
    Persistence {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub type VersioningResult<T> = Result<T, VersioningError>;

impl VersioningError {
    /// Build a `map_err` adapter tagging a storage error with the operation.
    pub fn persistence(operation: &'static str) -> impl Fn(sqlx::Error) -> Self {
        move |source| VersioningError::Persistence { operation, source }
    }

    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        VersioningError::Core(CoreError::NotFound { entity, id })
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        VersioningError::Core(CoreError::InvalidState(msg.into()))
    }

    /// The domain error, when this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            VersioningError::Core(core) => Some(core),
            _ => None,
        }
    }
}
