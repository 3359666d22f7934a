use crate::types::DbId;
use crate::validation::ValidationErrors;

/// Domain error taxonomy shared by the repository and API layers.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Optimistic concurrency check failed: the caller read a stale
    /// `updated_at` token and must re-fetch before retrying.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Import batch exceeded the row cap; nothing was processed.
    #[error("Batch limit exceeded: {got} rows submitted, maximum is {max}")]
    BatchLimit { max: usize, got: usize },

    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}
