//! Error types for the room layer.

use parlor_model::{ParticipantId, RoomCode};
use parlor_store::StoreError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room exists under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// Both seats are already taken (or the game has started).
    #[error("room {0} already has two participants")]
    RoomFull(RoomCode),

    /// The initiator tried to join their own room.
    #[error("cannot join room {0} as its creator")]
    SelfJoin(RoomCode),

    /// The participant does not occupy a seat in this room.
    #[error("participant {0} is not seated in room {1}")]
    NotMember(ParticipantId, RoomCode),

    /// The peer's commit landed first: the round was already answered or
    /// already advanced. Expected under normal play — callers drop it and
    /// wait for the next snapshot, they never show it to the user.
    #[error("another participant already acted this round")]
    Superseded,

    /// Code generation kept colliding with live rooms.
    #[error("no free room code after {0} attempts")]
    CodesExhausted(u32),

    /// The backing store failed. Transient: the operation may be retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RoomError {
    /// `true` for the one outcome that is part of normal play rather than
    /// a failure: losing the commit race to the peer.
    pub fn is_expected_race(&self) -> bool {
        matches!(self, Self::Superseded)
    }

    /// `true` when retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}
