//! The `RoomStore` trait: the storage contract every backend implements.

use std::future::Future;

use parlor_model::{RoomCode, RoomDoc};
use tokio::sync::watch;

use crate::StoreError;

/// A per-room subscription feed.
///
/// Each received value is a full snapshot of the document, `None` meaning
/// the document is absent (never created, deleted, or swept). The channel
/// deliberately carries only the latest value: rapid successive commits may
/// be coalesced, so consumers see "last write wins" and must stay correct
/// when intermediate states are skipped.
pub type RoomFeed = watch::Receiver<Option<RoomDoc>>;

/// Result of an optimistic preconditioned commit.
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// The precondition held and the replacement document was written.
    Committed(RoomDoc),

    /// The precondition no longer held; nothing was written. Carries the
    /// authoritative document so the caller can classify the refusal.
    Aborted(RoomDoc),

    /// No document exists under this code.
    Missing,
}

/// The storage contract for room documents.
///
/// Backends are expected to be shared behind an `Arc` and used from many
/// tasks at once; all methods take `&self`. [`MemoryStore`](crate::MemoryStore)
/// is the in-process implementation; a remote backend would wrap a hosted
/// document store's SDK with the same surface.
///
/// Methods are declared with explicit `impl Future + Send` return types
/// (rather than `async fn`) because session watchers await them inside
/// spawned tasks; implementations still write plain `async fn`s.
pub trait RoomStore: Send + Sync + 'static {
    /// Reads the current document, if any.
    fn get(
        &self,
        code: &RoomCode,
    ) -> impl Future<Output = Result<Option<RoomDoc>, StoreError>> + Send;

    /// Writes `doc` only if no document exists under `code`.
    ///
    /// Returns `false` when the code is already occupied — the caller's
    /// collision-retry loop picks a fresh code and tries again.
    fn insert(
        &self,
        code: &RoomCode,
        doc: RoomDoc,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Optimistic single-document commit.
    ///
    /// `apply` is given the current document and returns the replacement,
    /// or `None` to abort without side effects. The decision is made
    /// against the value that is current *at commit time*, which is what
    /// makes simultaneous answers from two participants safe. Backends
    /// that retry contended transactions may invoke `apply` more than once.
    fn update<F>(
        &self,
        code: &RoomCode,
        apply: F,
    ) -> impl Future<Output = Result<CommitOutcome, StoreError>> + Send
    where
        F: FnMut(&RoomDoc) -> Option<RoomDoc> + Send;

    /// Deletes the document. Returns `false` if nothing was there.
    fn remove(&self, code: &RoomCode) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Codes of rooms created before `cutoff_ms`, for the retention sweep.
    fn stale_codes(
        &self,
        cutoff_ms: u64,
    ) -> impl Future<Output = Result<Vec<RoomCode>, StoreError>> + Send;

    /// Subscribes to the document's snapshot feed.
    ///
    /// The feed's current value reflects the document as of the call;
    /// subscribing to a code with no document yields `None` until one
    /// appears.
    fn subscribe(&self, code: &RoomCode) -> impl Future<Output = RoomFeed> + Send;
}
