//! Retention sweep: deletes rooms past their retention window.
//!
//! Codes are short, so abandoned documents would eventually crowd the code
//! space as well as the store. A periodic pass removes anything older than
//! the retention window, whatever phase it died in.

use std::sync::Arc;

use parlor_model::{unix_millis, RoomCode};
use parlor_store::RoomStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{RoomError, RoomOptions};

/// One sweep pass. Returns the codes that were removed.
pub async fn sweep_once<S: RoomStore>(
    store: &S,
    options: &RoomOptions,
) -> Result<Vec<RoomCode>, RoomError> {
    let cutoff = unix_millis().saturating_sub(options.retention.as_millis() as u64);
    let mut removed = Vec::new();
    for code in store.stale_codes(cutoff).await? {
        if store.remove(&code).await? {
            tracing::info!(room = %code, "stale room swept");
            removed.push(code);
        }
    }
    Ok(removed)
}

/// Spawns the background sweeper task.
///
/// Runs a pass every `sweep_interval` until the handle is aborted. A failed
/// pass is logged and retried at the next interval — the store being briefly
/// unreachable must not kill the sweeper.
pub fn spawn_sweeper<S: RoomStore>(store: Arc<S>, options: RoomOptions) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(options.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            match sweep_once(store.as_ref(), &options).await {
                Ok(removed) if !removed.is_empty() => {
                    tracing::debug!(count = removed.len(), "sweep pass removed rooms");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "sweep pass failed"),
            }
        }
    })
}
