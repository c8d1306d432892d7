//! The turn engine: answer submission and the round-advance race.
//!
//! This is the one place where two participants genuinely contend. Both may
//! tap within the same network window, and both schedule the same advance
//! timer after a resolution — so every transition here is a single
//! preconditioned commit, and losing the race is a first-class, quiet
//! outcome ([`RoomError::Superseded`]), not a failure.

use std::sync::Arc;

use parlor_model::{unix_millis, ActionPayload, ActionRecord, ParticipantId, Phase, RoomCode, RoomDoc};
use parlor_store::{CommitOutcome, RoomStore};

use crate::rules::rules_for;
use crate::{RoomError, RoomOptions};

/// Result of a successful round advance.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// A fresh round was dealt and play resumed.
    NextRound(RoomDoc),

    /// Rounds were exhausted; the room is done.
    Finished(RoomDoc),
}

/// Drives a room through `Active → Resolved → Active/Finished`.
pub struct TurnEngine<S> {
    store: Arc<S>,
    options: RoomOptions,
}

impl<S> Clone for TurnEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
        }
    }
}

impl<S: RoomStore> TurnEngine<S> {
    pub fn new(store: Arc<S>, options: RoomOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &RoomOptions {
        &self.options
    }

    /// Submits `participant`'s answer for `round`.
    ///
    /// The commit goes through only if, at commit time, the room is still
    /// `Active` on that same round with no answer recorded — i.e. no one
    /// has acted yet. On success the answer is judged, item flags and the
    /// actor's score are updated in the same commit, and the phase moves to
    /// `Resolved` with the record stamped by the actor.
    ///
    /// Losing the race surfaces as [`RoomError::Superseded`]; the caller's
    /// next snapshot shows what actually happened. The submitted payload
    /// has zero effect on the stored document in that case.
    pub async fn submit(
        &self,
        code: &RoomCode,
        participant: ParticipantId,
        round: u32,
        payload: ActionPayload,
    ) -> Result<RoomDoc, RoomError> {
        let now = unix_millis();
        let outcome = self
            .store
            .update(code, |doc| {
                let open = doc.phase == Phase::Active
                    && doc.round == round
                    && doc.action.is_none();
                if !open || !doc.is_member(participant) || !doc.is_full() {
                    return None;
                }
                let rules = rules_for(doc.game);
                let correct = rules.judge(&doc.items, &payload);

                let mut next = doc.clone();
                if correct {
                    rules.apply(&mut next.items, &payload, participant);
                    *next.scores.entry(participant).or_insert(0) += 1;
                }
                next.action = Some(ActionRecord {
                    by: participant,
                    payload: payload.clone(),
                    correct,
                    at_ms: now,
                });
                next.phase = Phase::Resolved;
                Some(next)
            })
            .await?;

        match outcome {
            CommitOutcome::Committed(doc) => {
                tracing::debug!(
                    room = %code,
                    %participant,
                    round,
                    correct = doc.action.as_ref().is_some_and(|a| a.correct),
                    "answer committed"
                );
                Ok(doc)
            }
            CommitOutcome::Aborted(doc) => {
                if !doc.is_member(participant) {
                    Err(RoomError::NotMember(participant, code.clone()))
                } else {
                    Err(RoomError::Superseded)
                }
            }
            CommitOutcome::Missing => Err(RoomError::NotFound(code.clone())),
        }
    }

    /// Moves a resolved room on: next round, or `Finished` when rounds are
    /// exhausted.
    ///
    /// Both participants' clients attempt this after the resolve delay.
    /// The precondition — still `Resolved`, still on `from_round` — lets
    /// exactly one commit win; the other aborts to `Superseded` and must
    /// be dropped, not retried.
    pub async fn advance(
        &self,
        code: &RoomCode,
        from_round: u32,
    ) -> Result<AdvanceOutcome, RoomError> {
        let now = unix_millis();
        let outcome = self
            .store
            .update(code, |doc| {
                if doc.phase != Phase::Resolved || doc.round != from_round {
                    return None;
                }
                let mut next = doc.clone();
                if doc.round + 1 >= doc.rounds_total {
                    next.phase = Phase::Finished;
                    next.finished_at_ms = Some(now);
                } else {
                    next.round += 1;
                    next.action = None;
                    next.items = rules_for(next.game).deal(rand::random(), next.round);
                    next.phase = Phase::Active;
                }
                Some(next)
            })
            .await?;

        match outcome {
            CommitOutcome::Committed(doc) if doc.phase.is_terminal() => {
                tracing::info!(room = %code, "game finished");
                Ok(AdvanceOutcome::Finished(doc))
            }
            CommitOutcome::Committed(doc) => {
                tracing::debug!(room = %code, round = doc.round, "next round dealt");
                Ok(AdvanceOutcome::NextRound(doc))
            }
            CommitOutcome::Aborted(_) => Err(RoomError::Superseded),
            CommitOutcome::Missing => Err(RoomError::NotFound(code.clone())),
        }
    }
}
