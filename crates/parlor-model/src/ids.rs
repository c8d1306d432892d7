//! Identity types: participants and room codes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// A stable identifier for a participant.
///
/// Supplied by the profile subsystem; independent of any particular device
/// connection. Serializes as a plain number so presence and score maps keep
/// a flat JSON shape.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// A short, human-typable room code, e.g. `WXYZ`.
///
/// Codes are generated from an uppercase alphabet with ambiguous glyphs
/// removed (no `0`/`O`, no `1`/`I`) so they can be read out loud and typed
/// on a phone keypad without confusion. Construction normalizes to
/// uppercase, so `wxyz` and `WXYZ` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// =========================================================================
// Tests
// =========================================================================
