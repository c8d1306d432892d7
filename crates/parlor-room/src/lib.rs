//! Room lifecycle and turn synchronization for Parlor.
//!
//! A room is one shared document in a [`RoomStore`](parlor_store::RoomStore);
//! this crate owns every way that document is allowed to change. Creation
//! and seating go through the [`RoomManager`], answers and round advances go
//! through the [`TurnEngine`], and both funnel every mutation into a single
//! preconditioned atomic commit so that two participants acting in the same
//! network window can never double-process a round.
//!
//! # Key types
//!
//! - [`RoomManager`] — create/join/leave/presence, collision-retried codes
//! - [`TurnEngine`] — answer submission and the round-advance race
//! - [`GameRules`] — the per-game seam (deal, judge, apply)
//! - [`RoomOptions`] — tunables (round count, delays, retention)
//! - [`RoomError`] — including the expected, ignorable [`RoomError::Superseded`]

mod code;
mod config;
mod error;
mod manager;
mod rules;
mod sweep;
mod turn;

pub use config::RoomOptions;
pub use error::RoomError;
pub use manager::{LeaveOutcome, RoomManager};
pub use rules::{rules_for, GameRules};
pub use sweep::{spawn_sweeper, sweep_once};
pub use turn::{AdvanceOutcome, TurnEngine};
