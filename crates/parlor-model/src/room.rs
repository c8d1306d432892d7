//! The room document: the single shared record of one game session.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ParticipantId, RoomCode};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The room's position in its lifecycle state machine.
///
/// ```text
/// Waiting → Active → Resolved ─┬→ Active (next round)
///                              └→ Finished
/// ```
///
/// - **Waiting**: one seat empty, accepting a joiner.
/// - **Active**: both seated, round in progress, no answer committed.
/// - **Resolved**: an answer committed for the current round, scores updated.
/// - **Finished**: no rounds remain, or a participant forfeited.
///
/// Within a round the phase only moves forward; the loop back to `Active`
/// happens together with a round-index bump, so `(round, phase)` as a pair
/// never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Active,
    Resolved,
    Finished,
}

impl Phase {
    /// Returns `true` if the room is accepting a second participant.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if a game is underway (both seated, not over).
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::Resolved)
    }

    /// Returns `true` if the room has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Position of this phase within a single round, used to check
    /// forward-only progress.
    pub fn progress(&self) -> u8 {
        match self {
            Self::Waiting => 0,
            Self::Active => 1,
            Self::Resolved => 2,
            Self::Finished => 3,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Active => write!(f, "active"),
            Self::Resolved => write!(f, "resolved"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// GameKind
// ---------------------------------------------------------------------------

/// Which mini-game a room is running.
///
/// All three share the same phase machine and scoring contract; they differ
/// only in how rounds are dealt and answers judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    MemoryMatch,
    Trivia,
    ShoppingRecall,
}

// ---------------------------------------------------------------------------
// Round items and actions
// ---------------------------------------------------------------------------

/// One element of the current round, with its own local flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoundItem {
    /// A face-down card in a memory-match round.
    Card {
        face: String,
        revealed: bool,
        matched_by: Option<ParticipantId>,
    },

    /// A trivia question with its choice list. `answer` is the index of
    /// the correct choice.
    Question {
        prompt: String,
        choices: Vec<String>,
        answer: usize,
    },

    /// A shopping-recall entry. `on_list` marks items that were on the
    /// list shown earlier; the rest are decoys.
    ShoppingItem {
        name: String,
        on_list: bool,
        picked_by: Option<ParticipantId>,
    },
}

/// A participant's attempted answer for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Memory-match: flip the cards at these two indices.
    FlipPair { first: usize, second: usize },

    /// Trivia: pick the choice at this index.
    Choose { choice: usize },

    /// Shopping recall: claim the item at this index was on the list.
    Recall { item: usize },
}

/// The committed answer for the current round.
///
/// `by` stamps who acted, so the peer's client can distinguish "I caused
/// this" from "peer caused this" when the same snapshot arrives on both
/// sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub by: ParticipantId,
    pub payload: ActionPayload,
    pub correct: bool,
    pub at_ms: u64,
}

// ---------------------------------------------------------------------------
// RoomDoc
// ---------------------------------------------------------------------------

/// The single shared document representing one game session.
///
/// The store holds exactly one of these per live room code; every mutation
/// after creation goes through a preconditioned atomic commit, and every
/// participant's view is a projection of the latest stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDoc {
    pub code: RoomCode,
    pub game: GameKind,
    pub initiator: ParticipantId,
    pub joiner: Option<ParticipantId>,
    pub phase: Phase,
    /// Index of the round currently being played. Non-decreasing for the
    /// life of the room.
    pub round: u32,
    pub rounds_total: u32,
    /// Round-scoped items; replaced wholesale when a new round is dealt.
    pub items: Vec<RoundItem>,
    /// Round-scoped committed answer; cleared when a new round is dealt.
    pub action: Option<ActionRecord>,
    pub scores: BTreeMap<ParticipantId, u32>,
    /// Last-seen stamps (unix millis) per participant.
    pub presence: BTreeMap<ParticipantId, u64>,
    pub created_at_ms: u64,
    pub finished_at_ms: Option<u64>,
}

impl RoomDoc {
    /// A freshly created lobby: one seat filled, no rounds dealt yet.
    pub fn new(
        code: RoomCode,
        game: GameKind,
        initiator: ParticipantId,
        rounds_total: u32,
        now_ms: u64,
    ) -> Self {
        Self {
            code,
            game,
            initiator,
            joiner: None,
            phase: Phase::Waiting,
            round: 0,
            rounds_total,
            items: Vec::new(),
            action: None,
            scores: BTreeMap::from([(initiator, 0)]),
            presence: BTreeMap::from([(initiator, now_ms)]),
            created_at_ms: now_ms,
            finished_at_ms: None,
        }
    }

    /// Returns `true` if `id` occupies one of the room's two seats.
    pub fn is_member(&self, id: ParticipantId) -> bool {
        self.initiator == id || self.joiner == Some(id)
    }

    /// Returns `true` once both seats are filled.
    pub fn is_full(&self) -> bool {
        self.joiner.is_some()
    }

    /// The other seated participant, if any.
    pub fn peer_of(&self, id: ParticipantId) -> Option<ParticipantId> {
        if self.initiator == id {
            self.joiner
        } else if self.joiner == Some(id) {
            Some(self.initiator)
        } else {
            None
        }
    }

    pub fn score_of(&self, id: ParticipantId) -> u32 {
        self.scores.get(&id).copied().unwrap_or(0)
    }

    /// Milliseconds since the room was created, as of `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(id: u64) -> ParticipantId {
        ParticipantId(id)
    }

    fn lobby() -> RoomDoc {
        RoomDoc::new(RoomCode::new("ABCD"), GameKind::Trivia, pid(1), 5, 1_000)
    }

    // =====================================================================
    // Phase
    // =====================================================================

    #[test]
    fn test_phase_is_joinable_only_while_waiting() {
        assert!(Phase::Waiting.is_joinable());
        assert!(!Phase::Active.is_joinable());
        assert!(!Phase::Resolved.is_joinable());
        assert!(!Phase::Finished.is_joinable());
    }

    #[test]
    fn test_phase_is_live() {
        assert!(!Phase::Waiting.is_live());
        assert!(Phase::Active.is_live());
        assert!(Phase::Resolved.is_live());
        assert!(!Phase::Finished.is_live());
    }

    #[test]
    fn test_phase_progress_is_strictly_increasing() {
        let order = [Phase::Waiting, Phase::Active, Phase::Resolved, Phase::Finished];
        for pair in order.windows(2) {
            assert!(pair[0].progress() < pair[1].progress());
        }
    }

    #[test]
    fn test_phase_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Phase::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(serde_json::to_string(&Phase::Resolved).unwrap(), "\"resolved\"");
    }

    // =====================================================================
    // Round items and actions — JSON shape
    // =====================================================================

    #[test]
    fn test_round_item_card_json_shape() {
        let item = RoundItem::Card {
            face: "teapot".into(),
            revealed: false,
            matched_by: None,
        };
        let json: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "card");
        assert_eq!(json["face"], "teapot");
        assert_eq!(json["revealed"], false);
        assert!(json["matched_by"].is_null());
    }

    #[test]
    fn test_round_item_question_round_trip() {
        let item = RoundItem::Question {
            prompt: "Capital of France?".into(),
            choices: vec!["Paris".into(), "Lyon".into()],
            answer: 0,
        };
        let bytes = serde_json::to_vec(&item).unwrap();
        let decoded: RoundItem = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(item, decoded);
    }

    #[test]
    fn test_action_payload_json_shape() {
        let payload = ActionPayload::FlipPair { first: 0, second: 3 };
        let json: serde_json::Value = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "flip_pair");
        assert_eq!(json["first"], 0);
        assert_eq!(json["second"], 3);
    }

    #[test]
    fn test_action_record_stamps_actor() {
        let record = ActionRecord {
            by: pid(2),
            payload: ActionPayload::Choose { choice: 1 },
            correct: true,
            at_ms: 5_000,
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["by"], 2);
        assert_eq!(json["correct"], true);
    }

    // =====================================================================
    // RoomDoc
    // =====================================================================

    #[test]
    fn test_new_doc_starts_waiting_with_one_seat() {
        let doc = lobby();
        assert_eq!(doc.phase, Phase::Waiting);
        assert_eq!(doc.round, 0);
        assert!(doc.joiner.is_none());
        assert!(!doc.is_full());
        assert_eq!(doc.score_of(pid(1)), 0);
        assert!(doc.items.is_empty());
        assert!(doc.action.is_none());
    }

    #[test]
    fn test_is_member_covers_both_seats() {
        let mut doc = lobby();
        assert!(doc.is_member(pid(1)));
        assert!(!doc.is_member(pid(2)));

        doc.joiner = Some(pid(2));
        assert!(doc.is_member(pid(2)));
        assert!(!doc.is_member(pid(3)));
    }

    #[test]
    fn test_peer_of_maps_each_seat_to_the_other() {
        let mut doc = lobby();
        assert_eq!(doc.peer_of(pid(1)), None, "no peer while seat is empty");

        doc.joiner = Some(pid(2));
        assert_eq!(doc.peer_of(pid(1)), Some(pid(2)));
        assert_eq!(doc.peer_of(pid(2)), Some(pid(1)));
        assert_eq!(doc.peer_of(pid(9)), None, "outsiders have no peer");
    }

    #[test]
    fn test_score_of_defaults_to_zero() {
        let doc = lobby();
        assert_eq!(doc.score_of(pid(99)), 0);
    }

    #[test]
    fn test_age_ms_saturates() {
        let doc = lobby();
        assert_eq!(doc.age_ms(1_500), 500);
        assert_eq!(doc.age_ms(0), 0, "clock skew must not underflow");
    }

    #[test]
    fn test_doc_round_trip_preserves_score_map_keys() {
        let mut doc = lobby();
        doc.joiner = Some(pid(2));
        doc.scores.insert(pid(2), 3);

        let bytes = serde_json::to_vec(&doc).unwrap();
        let decoded: RoomDoc = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(doc, decoded);
        assert_eq!(decoded.score_of(pid(2)), 3);
    }
}
