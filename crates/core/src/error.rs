use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Entity not found: {entity} '{key}'")]
    NotFoundBy { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An external collaborator (git host, cache, task runner) failed.
    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
