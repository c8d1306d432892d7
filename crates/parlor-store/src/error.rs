//! Error types for the store layer.

/// Errors a store backend can surface.
///
/// Losing an optimistic commit is NOT an error at this layer — that is the
/// `Aborted` arm of [`CommitOutcome`](crate::CommitOutcome). This enum is
/// for genuine backend trouble.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    /// Transient: callers may retry.
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
}
