//! Room lifecycle: creation, seating, departure, presence.

use std::sync::Arc;

use parlor_model::{unix_millis, GameKind, ParticipantId, Phase, RoomCode, RoomDoc};
use parlor_store::{CommitOutcome, RoomStore};

use crate::code::random_code;
use crate::rules::rules_for;
use crate::{RoomError, RoomOptions};

/// What happened when a participant left.
#[derive(Debug)]
pub enum LeaveOutcome {
    /// The initiator abandoned an empty lobby; the document is gone.
    Deleted,

    /// A participant walked out mid-game; the room was finished so the
    /// peer observes a terminal snapshot instead of waiting forever.
    Forfeited(RoomDoc),

    /// A plain departure from a room that was already over.
    Left,
}

/// Creates and seats rooms, and handles departures.
///
/// Holds nothing but the injected store handle and options — all room state
/// lives in the store, so any number of manager instances (one per device,
/// in practice) can operate on the same rooms.
pub struct RoomManager<S> {
    store: Arc<S>,
    options: RoomOptions,
}

impl<S> Clone for RoomManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options.clone(),
        }
    }
}

impl<S: RoomStore> RoomManager<S> {
    pub fn new(store: Arc<S>, options: RoomOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &RoomOptions {
        &self.options
    }

    /// Creates a new lobby and returns its code.
    ///
    /// Codes are drawn at random and claimed with a create-if-absent write,
    /// so two devices generating the same code at the same moment cannot
    /// both win it. Gives up after `max_code_attempts` collisions.
    pub async fn create(
        &self,
        initiator: ParticipantId,
        game: GameKind,
    ) -> Result<RoomCode, RoomError> {
        for _ in 0..self.options.max_code_attempts {
            let code = {
                let mut rng = rand::rng();
                random_code(&mut rng, self.options.code_length)
            };
            let doc = RoomDoc::new(
                code.clone(),
                game,
                initiator,
                self.options.rounds,
                unix_millis(),
            );
            if self.store.insert(&code, doc).await? {
                tracing::info!(room = %code, %initiator, game = ?game, "room created");
                return Ok(code);
            }
            tracing::debug!(room = %code, "room code collision, retrying");
        }
        Err(RoomError::CodesExhausted(self.options.max_code_attempts))
    }

    /// Seats `joiner` in the room and starts the game.
    ///
    /// One commit sets the joiner, seeds their score, deals round 0, and
    /// moves the phase to `Active`. The commit aborts if the second seat
    /// was taken in the meantime — that race loser gets `RoomFull`, same
    /// as a plain latecomer.
    pub async fn join(
        &self,
        code: &RoomCode,
        joiner: ParticipantId,
    ) -> Result<RoomDoc, RoomError> {
        let now = unix_millis();
        let outcome = self
            .store
            .update(code, |doc| {
                if joiner == doc.initiator || !doc.phase.is_joinable() || doc.is_full() {
                    return None;
                }
                let mut next = doc.clone();
                next.joiner = Some(joiner);
                next.scores.insert(joiner, 0);
                next.presence.insert(joiner, now);
                next.items = rules_for(next.game).deal(rand::random(), 0);
                next.phase = Phase::Active;
                Some(next)
            })
            .await?;

        match outcome {
            CommitOutcome::Committed(doc) => {
                tracing::info!(room = %code, %joiner, "joiner seated, game started");
                Ok(doc)
            }
            CommitOutcome::Aborted(doc) => {
                if joiner == doc.initiator {
                    Err(RoomError::SelfJoin(code.clone()))
                } else {
                    Err(RoomError::RoomFull(code.clone()))
                }
            }
            CommitOutcome::Missing => Err(RoomError::NotFound(code.clone())),
        }
    }

    /// Removes a participant from play.
    ///
    /// The initiator abandoning an empty lobby deletes the document — there
    /// is nothing to keep. Walking out mid-game forfeits: the room is
    /// committed to `Finished` so the peer's feed delivers a terminal
    /// snapshot rather than leaving their client to hang.
    pub async fn leave(
        &self,
        code: &RoomCode,
        participant: ParticipantId,
    ) -> Result<LeaveOutcome, RoomError> {
        let doc = self
            .store
            .get(code)
            .await?
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        if !doc.is_member(participant) {
            return Err(RoomError::NotMember(participant, code.clone()));
        }

        if participant == doc.initiator && doc.phase == Phase::Waiting {
            self.store.remove(code).await?;
            tracing::info!(room = %code, %participant, "empty lobby deleted");
            return Ok(LeaveOutcome::Deleted);
        }

        if doc.phase.is_live() {
            let now = unix_millis();
            let outcome = self
                .store
                .update(code, |cur| {
                    if !cur.phase.is_live() {
                        return None;
                    }
                    let mut next = cur.clone();
                    next.phase = Phase::Finished;
                    next.finished_at_ms = Some(now);
                    Some(next)
                })
                .await?;
            if let CommitOutcome::Committed(finished) = outcome {
                tracing::info!(room = %code, %participant, "participant forfeited");
                return Ok(LeaveOutcome::Forfeited(finished));
            }
            // The room finished or vanished between read and commit;
            // nothing left to forfeit.
        }

        Ok(LeaveOutcome::Left)
    }

    /// Reads the current document.
    pub async fn get(&self, code: &RoomCode) -> Result<RoomDoc, RoomError> {
        self.store
            .get(code)
            .await?
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Stamps the participant's last-seen time.
    ///
    /// Presence writes touch only the presence map, so they never contend
    /// with the answer precondition.
    pub async fn mark_presence(
        &self,
        code: &RoomCode,
        participant: ParticipantId,
    ) -> Result<(), RoomError> {
        let now = unix_millis();
        let outcome = self
            .store
            .update(code, |doc| {
                if !doc.is_member(participant) {
                    return None;
                }
                let mut next = doc.clone();
                next.presence.insert(participant, now);
                Some(next)
            })
            .await?;

        match outcome {
            CommitOutcome::Committed(_) => Ok(()),
            CommitOutcome::Aborted(_) => Err(RoomError::NotMember(participant, code.clone())),
            CommitOutcome::Missing => Err(RoomError::NotFound(code.clone())),
        }
    }
}
