//! `RoomSession`: one participant's live connection to a room.
//!
//! A session is the UI layer's whole surface: it creates or joins a room,
//! hands back an event stream, accepts answer submissions, and leaves. One
//! watcher task per session owns the subscription feed, the resolve-delay
//! auto-advance timer, and the presence heartbeat, all in a single
//! `tokio::select!` loop so that leaving cancels everything at once.
//!
//! The session never mutates its own picture of the room. Submissions
//! return a receipt; what actually happened arrives — for both winners and
//! losers of a race — as the next [`RoomEvent::Snapshot`], which replaces
//! the previous view wholesale.

use std::sync::Arc;

use parlor_model::{unix_millis, ActionPayload, GameKind, ParticipantId, Phase, RoomCode, RoomDoc};
use parlor_room::{LeaveOutcome, RoomError, RoomManager, RoomOptions, TurnEngine};
use parlor_store::{RoomFeed, RoomStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// What a session reports to its UI layer.
#[derive(Debug)]
pub enum RoomEvent {
    /// A fresh authoritative snapshot. Replaces the previous view entirely.
    Snapshot(RoomDoc),

    /// The peer has not stamped presence within the timeout. Advisory —
    /// the room itself is unchanged.
    PeerStale(ParticipantId),

    /// The room document is gone (deleted or swept). Terminal.
    Gone,
}

/// Result of an answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReceipt {
    /// This participant's answer is the one on record for the round.
    Accepted { correct: bool },

    /// The peer (or a timer) got there first. Not a failure: the next
    /// snapshot shows what actually happened.
    Overtaken,
}

/// One participant's handle on a live room.
pub struct RoomSession<S: RoomStore> {
    manager: RoomManager<S>,
    engine: TurnEngine<S>,
    code: RoomCode,
    me: ParticipantId,
    watcher: JoinHandle<()>,
}

impl<S: RoomStore> RoomSession<S> {
    /// Creates a new room and attaches to it as the initiator.
    pub async fn create(
        store: Arc<S>,
        me: ParticipantId,
        game: GameKind,
        options: RoomOptions,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RoomEvent>), crate::ParlorError> {
        let manager = RoomManager::new(Arc::clone(&store), options);
        let code = manager.create(me, game).await?;
        Ok(Self::attach(store, manager, code, me).await)
    }

    /// Joins an existing room as the second participant.
    pub async fn join(
        store: Arc<S>,
        code: RoomCode,
        me: ParticipantId,
        options: RoomOptions,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RoomEvent>), crate::ParlorError> {
        let manager = RoomManager::new(Arc::clone(&store), options);
        manager.join(&code, me).await?;
        Ok(Self::attach(store, manager, code, me).await)
    }

    async fn attach(
        store: Arc<S>,
        manager: RoomManager<S>,
        code: RoomCode,
        me: ParticipantId,
    ) -> (Self, mpsc::UnboundedReceiver<RoomEvent>) {
        let options = manager.options().clone();
        let engine = TurnEngine::new(Arc::clone(&store), options.clone());
        let feed = store.subscribe(&code).await;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let watcher = tokio::spawn(
            Watcher {
                feed,
                events: events_tx,
                manager: manager.clone(),
                engine: engine.clone(),
                code: code.clone(),
                me,
                options,
            }
            .run(),
        );

        (
            Self { manager, engine, code, me, watcher },
            events_rx,
        )
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn participant(&self) -> ParticipantId {
        self.me
    }

    /// Reads the current authoritative document.
    pub async fn room(&self) -> Result<RoomDoc, crate::ParlorError> {
        Ok(self.manager.get(&self.code).await?)
    }

    /// Submits this participant's answer for `round`.
    ///
    /// Losing the commit race comes back as [`SubmitReceipt::Overtaken`],
    /// never as an error — it is the expected outcome for one side whenever
    /// both act in the same window.
    pub async fn submit(
        &self,
        round: u32,
        payload: ActionPayload,
    ) -> Result<SubmitReceipt, crate::ParlorError> {
        match self.engine.submit(&self.code, self.me, round, payload).await {
            Ok(doc) => Ok(SubmitReceipt::Accepted {
                correct: doc.action.as_ref().is_some_and(|a| a.correct),
            }),
            Err(err) if err.is_expected_race() => Ok(SubmitReceipt::Overtaken),
            Err(err) => Err(err.into()),
        }
    }

    /// Leaves the room and stops the watcher, heartbeat, and any pending
    /// auto-advance. The peer is not cancelled — it observes the outcome
    /// (deletion or forfeit) through its own feed.
    pub async fn leave(self) -> Result<LeaveOutcome, crate::ParlorError> {
        self.watcher.abort();
        Ok(self.manager.leave(&self.code, self.me).await?)
    }
}

impl<S: RoomStore> Drop for RoomSession<S> {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

// ---------------------------------------------------------------------------
// Watcher task
// ---------------------------------------------------------------------------

/// The session's background loop: forwards snapshots, races the round
/// advance after the resolve delay, stamps presence, and flags a quiet peer.
struct Watcher<S: RoomStore> {
    feed: RoomFeed,
    events: mpsc::UnboundedSender<RoomEvent>,
    manager: RoomManager<S>,
    engine: TurnEngine<S>,
    code: RoomCode,
    me: ParticipantId,
    options: RoomOptions,
}

impl<S: RoomStore> Watcher<S> {
    async fn run(mut self) {
        // (round, when to attempt the advance for it)
        let mut pending_advance: Option<(u32, Instant)> = None;
        let mut peer_flagged = false;

        // Deliver the snapshot that is current as of attach.
        let mut view = self.feed.borrow_and_update().clone();
        match &view {
            Some(doc) => {
                self.reschedule(doc, &mut pending_advance);
                if self.events.send(RoomEvent::Snapshot(doc.clone())).is_err() {
                    return;
                }
            }
            None => {
                let _ = self.events.send(RoomEvent::Gone);
                return;
            }
        }

        let mut heartbeat = tokio::time::interval(self.options.presence_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Presence was stamped by create/join moments ago; skip the
        // interval's immediate first tick.
        heartbeat.tick().await;

        loop {
            tokio::select! {
                changed = self.feed.changed() => {
                    if changed.is_err() {
                        // Store dropped out from under us.
                        break;
                    }
                    view = self.feed.borrow_and_update().clone();
                    match &view {
                        None => {
                            let _ = self.events.send(RoomEvent::Gone);
                            break;
                        }
                        Some(doc) => {
                            self.reschedule(doc, &mut pending_advance);
                            if self.events.send(RoomEvent::Snapshot(doc.clone())).is_err() {
                                break;
                            }
                        }
                    }
                }

                _ = sleep_until_or_pend(pending_advance.map(|(_, at)| at)) => {
                    if let Some((round, _)) = pending_advance.take() {
                        self.try_advance(round).await;
                    }
                }

                _ = heartbeat.tick() => {
                    self.heartbeat_pass(view.as_ref(), &mut peer_flagged).await;
                }
            }
        }
    }

    /// A `Resolved` snapshot arms one advance attempt for its round; any
    /// other phase disarms. Seeing `Resolved` for the same round twice
    /// (e.g. after a presence write) must not push the deadline back.
    fn reschedule(&self, doc: &RoomDoc, pending: &mut Option<(u32, Instant)>) {
        match doc.phase {
            Phase::Resolved => {
                if pending.map(|(round, _)| round) != Some(doc.round) {
                    *pending = Some((doc.round, Instant::now() + self.options.resolve_delay));
                }
            }
            _ => *pending = None,
        }
    }

    async fn try_advance(&self, round: u32) {
        match self.engine.advance(&self.code, round).await {
            Ok(_) => {}
            Err(err) if err.is_expected_race() => {
                tracing::debug!(room = %self.code, round, "peer advanced the round first");
            }
            Err(RoomError::NotFound(_)) => {
                // The feed delivers Gone; nothing to do here.
            }
            Err(err) => {
                tracing::warn!(room = %self.code, round, error = %err, "auto-advance failed");
            }
        }
    }

    async fn heartbeat_pass(&self, view: Option<&RoomDoc>, peer_flagged: &mut bool) {
        let Some(doc) = view else { return };
        if !doc.phase.is_live() {
            return;
        }

        if let Err(err) = self.manager.mark_presence(&self.code, self.me).await {
            if !matches!(err, RoomError::NotFound(_)) {
                tracing::warn!(room = %self.code, error = %err, "presence stamp failed");
            }
            return;
        }

        let Some(peer) = doc.peer_of(self.me) else { return };
        let last_seen = doc.presence.get(&peer).copied().unwrap_or(doc.created_at_ms);
        let timeout_ms = self.options.presence_timeout.as_millis() as u64;
        let stale = unix_millis().saturating_sub(last_seen) > timeout_ms;

        if stale && !*peer_flagged {
            *peer_flagged = true;
            tracing::info!(room = %self.code, %peer, "peer presence went stale");
            let _ = self.events.send(RoomEvent::PeerStale(peer));
        } else if !stale {
            *peer_flagged = false;
        }
    }
}

/// Sleeps until the deadline, or pends forever when there is none —
/// `select!` keeps servicing the other branches either way.
async fn sleep_until_or_pend(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
