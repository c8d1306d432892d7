//! The `GameRules` seam — one implementation per mini-game.
//!
//! Every game shares the same phase machine, the same commit discipline,
//! and the same scoring contract (one point per correct committed action).
//! A game only decides three things: what a round's items look like
//! (`deal`), whether an attempted action is correct (`judge`), and which
//! item flags a correct action flips (`apply`).

use parlor_model::{ActionPayload, GameKind, ParticipantId, RoundItem};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Per-game behavior behind the shared turn engine.
///
/// Implementations are stateless: everything round-scoped lives in the
/// room document, so `deal` is driven by an explicit seed and the same
/// seed reproduces the same round.
pub trait GameRules: Send + Sync {
    /// The variant this implementation serves.
    fn kind(&self) -> GameKind;

    /// Builds the item set for `round`.
    fn deal(&self, seed: u64, round: u32) -> Vec<RoundItem>;

    /// Judges an attempted action against the current items. A payload of
    /// the wrong shape for this game is simply incorrect, never a panic.
    fn judge(&self, items: &[RoundItem], payload: &ActionPayload) -> bool;

    /// Flips item flags for an action that `judge` accepted. Called only
    /// for correct actions, inside the same commit that records them.
    fn apply(&self, items: &mut [RoundItem], payload: &ActionPayload, by: ParticipantId);
}

/// Dispatches the tagged variant stored in the room document to its rules.
pub fn rules_for(game: GameKind) -> &'static dyn GameRules {
    match game {
        GameKind::MemoryMatch => &MemoryMatch,
        GameKind::Trivia => &Trivia,
        GameKind::ShoppingRecall => &ShoppingRecall,
    }
}

fn round_rng(seed: u64, round: u32) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(round as u64))
}

// ---------------------------------------------------------------------------
// Memory match
// ---------------------------------------------------------------------------

/// Pairs of face-down cards; flipping a matching pair scores.
struct MemoryMatch;

const CARD_FACES: &[&str] = &[
    "teapot", "glasses", "radio", "slippers", "umbrella", "kettle", "clock", "biscuit",
    "cardigan", "thermos", "lantern", "mitten",
];

/// Distinct faces per round; the deck is twice this many cards.
const PAIRS_PER_ROUND: usize = 4;

impl GameRules for MemoryMatch {
    fn kind(&self) -> GameKind {
        GameKind::MemoryMatch
    }

    fn deal(&self, seed: u64, round: u32) -> Vec<RoundItem> {
        let mut rng = round_rng(seed, round);
        let mut faces: Vec<&str> = CARD_FACES.to_vec();
        faces.shuffle(&mut rng);

        let mut deck: Vec<RoundItem> = faces
            .iter()
            .take(PAIRS_PER_ROUND)
            .flat_map(|face| {
                std::iter::repeat_n(
                    RoundItem::Card {
                        face: (*face).to_string(),
                        revealed: false,
                        matched_by: None,
                    },
                    2,
                )
            })
            .collect();
        deck.shuffle(&mut rng);
        deck
    }

    fn judge(&self, items: &[RoundItem], payload: &ActionPayload) -> bool {
        let ActionPayload::FlipPair { first, second } = payload else {
            return false;
        };
        if first == second {
            return false;
        }
        let (Some(a), Some(b)) = (items.get(*first), items.get(*second)) else {
            return false;
        };
        match (a, b) {
            (
                RoundItem::Card { face: fa, matched_by: None, .. },
                RoundItem::Card { face: fb, matched_by: None, .. },
            ) => fa == fb,
            _ => false,
        }
    }

    fn apply(&self, items: &mut [RoundItem], payload: &ActionPayload, by: ParticipantId) {
        let ActionPayload::FlipPair { first, second } = payload else {
            return;
        };
        for index in [*first, *second] {
            if let Some(RoundItem::Card { revealed, matched_by, .. }) = items.get_mut(index) {
                *revealed = true;
                *matched_by = Some(by);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Trivia
// ---------------------------------------------------------------------------

/// One multiple-choice question per round.
struct Trivia;

/// (prompt, choices, index of the correct choice)
const QUESTION_BANK: &[(&str, [&str; 4], usize)] = &[
    ("Which planet is known as the Red Planet?", ["Venus", "Mars", "Jupiter", "Mercury"], 1),
    ("How many days are there in a leap year?", ["364", "365", "366", "367"], 2),
    ("What is the capital of France?", ["Lyon", "Marseille", "Nice", "Paris"], 3),
    ("Which instrument has 88 keys?", ["Piano", "Accordion", "Organ", "Harpsichord"], 0),
    ("What do bees collect from flowers?", ["Pollen and nectar", "Dew", "Seeds", "Petals"], 0),
    ("Which ocean is the largest?", ["Atlantic", "Indian", "Arctic", "Pacific"], 3),
    ("How many sides does a hexagon have?", ["Five", "Six", "Seven", "Eight"], 1),
    ("Which metal is liquid at room temperature?", ["Iron", "Mercury", "Copper", "Tin"], 1),
    ("What is the main ingredient of bread?", ["Rice", "Corn", "Flour", "Oats"], 2),
    ("Which season comes after summer?", ["Spring", "Winter", "Autumn", "Monsoon"], 2),
];

impl GameRules for Trivia {
    fn kind(&self) -> GameKind {
        GameKind::Trivia
    }

    fn deal(&self, seed: u64, round: u32) -> Vec<RoundItem> {
        let mut rng = round_rng(seed, round);
        let (prompt, choices, answer) = QUESTION_BANK[rng.random_range(0..QUESTION_BANK.len())];
        vec![RoundItem::Question {
            prompt: prompt.to_string(),
            choices: choices.iter().map(|c| (*c).to_string()).collect(),
            answer,
        }]
    }

    fn judge(&self, items: &[RoundItem], payload: &ActionPayload) -> bool {
        let ActionPayload::Choose { choice } = payload else {
            return false;
        };
        matches!(items.first(), Some(RoundItem::Question { answer, .. }) if answer == choice)
    }

    fn apply(&self, _items: &mut [RoundItem], _payload: &ActionPayload, _by: ParticipantId) {
        // The committed record already names the chosen answer; a question
        // carries no per-item flags to flip.
    }
}

// ---------------------------------------------------------------------------
// Shopping recall
// ---------------------------------------------------------------------------

/// Pick which item really was on the shopping list, among decoys.
struct ShoppingRecall;

const PANTRY: &[&str] = &[
    "eggs", "milk", "bread", "tea", "butter", "jam", "flour", "sugar", "cheese", "apples",
    "honey", "soap",
];

const LISTED_PER_ROUND: usize = 3;
const DECOYS_PER_ROUND: usize = 3;

impl GameRules for ShoppingRecall {
    fn kind(&self) -> GameKind {
        GameKind::ShoppingRecall
    }

    fn deal(&self, seed: u64, round: u32) -> Vec<RoundItem> {
        let mut rng = round_rng(seed, round);
        let mut names: Vec<&str> = PANTRY.to_vec();
        names.shuffle(&mut rng);

        let mut items: Vec<RoundItem> = names
            .iter()
            .take(LISTED_PER_ROUND + DECOYS_PER_ROUND)
            .enumerate()
            .map(|(i, name)| RoundItem::ShoppingItem {
                name: (*name).to_string(),
                on_list: i < LISTED_PER_ROUND,
                picked_by: None,
            })
            .collect();
        items.shuffle(&mut rng);
        items
    }

    fn judge(&self, items: &[RoundItem], payload: &ActionPayload) -> bool {
        let ActionPayload::Recall { item } = payload else {
            return false;
        };
        matches!(items.get(*item), Some(RoundItem::ShoppingItem { on_list: true, .. }))
    }

    fn apply(&self, items: &mut [RoundItem], payload: &ActionPayload, by: ParticipantId) {
        let ActionPayload::Recall { item } = payload else {
            return;
        };
        if let Some(RoundItem::ShoppingItem { picked_by, .. }) = items.get_mut(*item) {
            *picked_by = Some(by);
        }
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

    // =====================================================================
    // Dealing
    // =====================================================================

    #[test]
    fn test_deal_is_deterministic_per_seed() {
        for kind in [GameKind::MemoryMatch, GameKind::Trivia, GameKind::ShoppingRecall] {
            let rules = rules_for(kind);
            assert_eq!(rules.deal(7, 0), rules.deal(7, 0), "{kind:?}");
        }
    }

    #[test]
    fn test_deal_varies_across_rounds() {
        let rules = rules_for(GameKind::MemoryMatch);
        assert_ne!(rules.deal(7, 0), rules.deal(7, 1));
    }

    #[test]
    fn test_memory_deck_is_pairs() {
        let deck = rules_for(GameKind::MemoryMatch).deal(42, 0);
        assert_eq!(deck.len(), PAIRS_PER_ROUND * 2);

        let mut faces: Vec<&String> = deck
            .iter()
            .map(|item| match item {
                RoundItem::Card { face, revealed, matched_by } => {
                    assert!(!revealed && matched_by.is_none(), "cards start face down");
                    face
                }
                other => panic!("memory deck held {other:?}"),
            })
            .collect();
        faces.sort();
        for pair in faces.chunks(2) {
            assert_eq!(pair[0], pair[1], "every face appears exactly twice");
        }
    }

    #[test]
    fn test_shopping_round_mixes_list_and_decoys() {
        let items = rules_for(GameKind::ShoppingRecall).deal(42, 0);
        assert_eq!(items.len(), LISTED_PER_ROUND + DECOYS_PER_ROUND);
        let listed = items
            .iter()
            .filter(|i| matches!(i, RoundItem::ShoppingItem { on_list: true, .. }))
            .count();
        assert_eq!(listed, LISTED_PER_ROUND);
    }

    #[test]
    fn test_trivia_round_is_one_question_with_valid_answer() {
        let items = rules_for(GameKind::Trivia).deal(42, 0);
        let [RoundItem::Question { choices, answer, .. }] = items.as_slice() else {
            panic!("trivia round should be a single question");
        };
        assert!(*answer < choices.len());
    }

    // =====================================================================
    // Judging
    // =====================================================================

    /// A fixed deck where indices 0 and 1 match and 2 and 3 do not.
    fn fixed_deck() -> Vec<RoundItem> {
        let card = |face: &str| RoundItem::Card {
            face: face.into(),
            revealed: false,
            matched_by: None,
        };
        vec![card("teapot"), card("teapot"), card("radio"), card("kettle")]
    }

    #[test]
    fn test_memory_judge_accepts_matching_pair() {
        let rules = rules_for(GameKind::MemoryMatch);
        assert!(rules.judge(&fixed_deck(), &ActionPayload::FlipPair { first: 0, second: 1 }));
    }

    #[test]
    fn test_memory_judge_rejects_mismatch_and_self_pair() {
        let rules = rules_for(GameKind::MemoryMatch);
        let deck = fixed_deck();
        assert!(!rules.judge(&deck, &ActionPayload::FlipPair { first: 2, second: 3 }));
        assert!(!rules.judge(&deck, &ActionPayload::FlipPair { first: 0, second: 0 }));
        assert!(!rules.judge(&deck, &ActionPayload::FlipPair { first: 0, second: 99 }));
    }

    #[test]
    fn test_memory_judge_rejects_already_matched_cards() {
        let rules = rules_for(GameKind::MemoryMatch);
        let mut deck = fixed_deck();
        rules.apply(&mut deck, &ActionPayload::FlipPair { first: 0, second: 1 }, pid(1));
        assert!(!rules.judge(&deck, &ActionPayload::FlipPair { first: 0, second: 1 }));
    }

    #[test]
    fn test_memory_apply_stamps_both_cards() {
        let rules = rules_for(GameKind::MemoryMatch);
        let mut deck = fixed_deck();
        rules.apply(&mut deck, &ActionPayload::FlipPair { first: 0, second: 1 }, pid(2));

        for index in [0, 1] {
            let RoundItem::Card { revealed, matched_by, .. } = &deck[index] else {
                unreachable!();
            };
            assert!(revealed);
            assert_eq!(*matched_by, Some(pid(2)));
        }
        assert!(matches!(&deck[2], RoundItem::Card { revealed: false, .. }));
    }

    #[test]
    fn test_trivia_judge_checks_answer_index() {
        let rules = rules_for(GameKind::Trivia);
        let items = vec![RoundItem::Question {
            prompt: "?".into(),
            choices: vec!["a".into(), "b".into()],
            answer: 1,
        }];
        assert!(rules.judge(&items, &ActionPayload::Choose { choice: 1 }));
        assert!(!rules.judge(&items, &ActionPayload::Choose { choice: 0 }));
    }

    #[test]
    fn test_shopping_judge_and_apply() {
        let rules = rules_for(GameKind::ShoppingRecall);
        let mut items = vec![
            RoundItem::ShoppingItem { name: "milk".into(), on_list: true, picked_by: None },
            RoundItem::ShoppingItem { name: "soap".into(), on_list: false, picked_by: None },
        ];
        assert!(rules.judge(&items, &ActionPayload::Recall { item: 0 }));
        assert!(!rules.judge(&items, &ActionPayload::Recall { item: 1 }));
        assert!(!rules.judge(&items, &ActionPayload::Recall { item: 9 }));

        rules.apply(&mut items, &ActionPayload::Recall { item: 0 }, pid(1));
        assert!(matches!(
            &items[0],
            RoundItem::ShoppingItem { picked_by: Some(p), .. } if *p == pid(1)
        ));
    }

    #[test]
    fn test_wrong_payload_shape_is_incorrect_not_a_panic() {
        let deck = fixed_deck();
        let rules = rules_for(GameKind::MemoryMatch);
        assert!(!rules.judge(&deck, &ActionPayload::Choose { choice: 0 }));

        let mut deck = deck;
        rules.apply(&mut deck, &ActionPayload::Choose { choice: 0 }, pid(1));
        assert_eq!(deck, fixed_deck(), "foreign payloads must be no-ops");
    }

    #[test]
    fn test_rules_for_matches_kind() {
        for kind in [GameKind::MemoryMatch, GameKind::Trivia, GameKind::ShoppingRecall] {
            assert_eq!(rules_for(kind).kind(), kind);
        }
    }
}
