//! Unified error type for the Parlor facade.

use parlor_room::RoomError;
use parlor_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `parlor` meta-crate, callers deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attribute auto-generates `From` impls, so `?` converts sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A store-level error (backend unreachable).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A room-level error (not found, full, superseded, ...).
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl ParlorError {
    /// `true` when retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store(_) => true,
            Self::Room(room) => room.is_retryable(),
        }
    }
}
