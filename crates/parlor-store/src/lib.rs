//! Room document storage for Parlor.
//!
//! The rest of the system never talks to a database directly — it goes
//! through the [`RoomStore`] trait, which models the four primitives a
//! hosted real-time document store provides: point reads/writes, an
//! optimistic preconditioned commit, deletion, and a full-snapshot
//! subscription feed per key.
//!
//! # Key types
//!
//! - [`RoomStore`] — the storage contract components are generic over
//! - [`MemoryStore`] — complete in-process implementation
//! - [`CommitOutcome`] — committed-or-aborted result of an optimistic commit
//! - [`RoomFeed`] — per-room snapshot subscription
//! - [`StoreError`] — transient backend failures

mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{CommitOutcome, RoomFeed, RoomStore};
