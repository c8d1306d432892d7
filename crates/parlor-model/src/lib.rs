//! Shared document model for Parlor.
//!
//! Everything a room stores lives in this crate: the [`RoomDoc`] that the
//! backing store holds under each room code, the [`Phase`] lifecycle enum,
//! the per-round [`RoundItem`]s, and the [`ActionRecord`] stamped when a
//! participant's answer commits.
//!
//! These types are the storage contract — a hosted document store would
//! hold exactly their JSON form — so their serde attributes are load-bearing
//! and covered by tests.

mod clock;
mod ids;
mod room;

pub use clock::unix_millis;
pub use ids::{ParticipantId, RoomCode};
pub use room::{ActionPayload, ActionRecord, GameKind, Phase, RoomDoc, RoundItem};
