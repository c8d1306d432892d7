//! In-process store backed by tokio sync primitives.
//!
//! One mutex guards the document map; every commit and delete publishes the
//! new snapshot through a per-code watch channel. The watch channel is what
//! gives the feed its contract: receivers always observe the latest value,
//! and rapid successive commits coalesce.

use std::collections::HashMap;

use parlor_model::{RoomCode, RoomDoc};
use tokio::sync::{watch, Mutex};

use crate::{CommitOutcome, RoomFeed, RoomStore, StoreError};

#[derive(Default)]
struct Inner {
    docs: HashMap<RoomCode, RoomDoc>,
    feeds: HashMap<RoomCode, watch::Sender<Option<RoomDoc>>>,
}

impl Inner {
    /// Pushes a snapshot to the room's feed, if anyone ever subscribed.
    fn publish(&mut self, code: &RoomCode, snapshot: Option<RoomDoc>) {
        if let Some(tx) = self.feeds.get(code) {
            tx.send_replace(snapshot);
        }
    }

    /// Drops feeds whose last receiver is gone and whose document no
    /// longer exists, so deleted room codes can be reused cleanly.
    fn prune_feed(&mut self, code: &RoomCode) {
        if let Some(tx) = self.feeds.get(code) {
            if tx.receiver_count() == 0 && !self.docs.contains_key(code) {
                self.feeds.remove(code);
            }
        }
    }
}

/// Complete in-process [`RoomStore`] implementation.
///
/// Useful on its own for tests and demos, and as the reference behavior a
/// remote backend must match.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore for MemoryStore {
    async fn get(&self, code: &RoomCode) -> Result<Option<RoomDoc>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.docs.get(code).cloned())
    }

    async fn insert(&self, code: &RoomCode, doc: RoomDoc) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.docs.contains_key(code) {
            return Ok(false);
        }
        inner.docs.insert(code.clone(), doc.clone());
        inner.publish(code, Some(doc));
        Ok(true)
    }

    async fn update<F>(&self, code: &RoomCode, mut apply: F) -> Result<CommitOutcome, StoreError>
    where
        F: FnMut(&RoomDoc) -> Option<RoomDoc> + Send,
    {
        let mut inner = self.inner.lock().await;
        let Some(current) = inner.docs.get(code) else {
            return Ok(CommitOutcome::Missing);
        };
        match apply(current) {
            Some(next) => {
                inner.docs.insert(code.clone(), next.clone());
                inner.publish(code, Some(next.clone()));
                Ok(CommitOutcome::Committed(next))
            }
            None => Ok(CommitOutcome::Aborted(current.clone())),
        }
    }

    async fn remove(&self, code: &RoomCode) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        let existed = inner.docs.remove(code).is_some();
        if existed {
            inner.publish(code, None);
            tracing::debug!(room = %code, "document removed");
        }
        inner.prune_feed(code);
        Ok(existed)
    }

    async fn stale_codes(&self, cutoff_ms: u64) -> Result<Vec<RoomCode>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .docs
            .values()
            .filter(|doc| doc.created_at_ms < cutoff_ms)
            .map(|doc| doc.code.clone())
            .collect())
    }

    async fn subscribe(&self, code: &RoomCode) -> RoomFeed {
        let mut inner = self.inner.lock().await;
        let current = inner.docs.get(code).cloned();
        inner
            .feeds
            .entry(code.clone())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }
}
