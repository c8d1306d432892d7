//! # Parlor
//!
//! Two-player room synchronization for companion-app mini-games.
//!
//! A room is one shared document in an abstract real-time store. Every
//! mutation is an optimistic, preconditioned, single-document commit, so
//! two participants tapping within the same network window can never
//! double-process a round — one commit wins, the other quietly observes
//! the winner through the snapshot feed.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parlor::prelude::*;
//!
//! # async fn run() -> Result<(), ParlorError> {
//! let store = Arc::new(MemoryStore::new());
//!
//! let (host, mut host_events) = RoomSession::create(
//!     Arc::clone(&store),
//!     ParticipantId(1),
//!     GameKind::Trivia,
//!     RoomOptions::default(),
//! )
//! .await?;
//! println!("tell your buddy the code: {}", host.code());
//!
//! while let Some(event) = host_events.recv().await {
//!     match event {
//!         RoomEvent::Snapshot(doc) => { /* render the room */ }
//!         RoomEvent::PeerStale(peer) => { /* show "buddy away?" */ }
//!         RoomEvent::Gone => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::ParlorError;
pub use session::{RoomEvent, RoomSession, SubmitReceipt};

pub mod prelude {
    //! Everything a typical caller needs.
    pub use parlor_model::{
        ActionPayload, ActionRecord, GameKind, ParticipantId, Phase, RoomCode, RoomDoc, RoundItem,
    };
    pub use parlor_room::{
        spawn_sweeper, LeaveOutcome, RoomError, RoomManager, RoomOptions, TurnEngine,
    };
    pub use parlor_store::{MemoryStore, RoomStore};

    pub use crate::{ParlorError, RoomEvent, RoomSession, SubmitReceipt};
}
