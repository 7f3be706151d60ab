use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The acting user is not allowed to edit the site.
    #[error("Actor {actor_id} does not own site {site_id}")]
    Ownership { actor_id: DbId, site_id: DbId },

    /// The requested transition is not valid for the entity's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A conditional write found a different `site_version` than expected.
    #[error("Concurrent modification of site {site_id}: expected site_version {expected}")]
    ConcurrencyConflict { site_id: DbId, expected: i64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
