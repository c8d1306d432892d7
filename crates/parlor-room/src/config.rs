//! Room tunables.

use std::time::Duration;

/// Configuration for room behavior.
///
/// One `RoomOptions` is injected into each component at construction; there
/// is no process-wide settings singleton.
#[derive(Debug, Clone)]
pub struct RoomOptions {
    /// Rounds per game.
    pub rounds: u32,

    /// Length of generated room codes.
    pub code_length: usize,

    /// How many fresh codes to try before giving up on creation.
    pub max_code_attempts: u32,

    /// How long a resolved round is displayed before the auto-advance
    /// commit is attempted.
    pub resolve_delay: Duration,

    /// Rooms older than this are deleted by the background sweep.
    pub retention: Duration,

    /// How often the background sweep runs.
    pub sweep_interval: Duration,

    /// How often a connected participant stamps its presence.
    pub presence_interval: Duration,

    /// A peer whose presence stamp is older than this is reported stale.
    pub presence_timeout: Duration,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            rounds: 5,
            code_length: 4,
            max_code_attempts: 16,
            resolve_delay: Duration::from_secs(3),
            retention: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
            presence_interval: Duration::from_secs(10),
            presence_timeout: Duration::from_secs(30),
        }
    }
}
