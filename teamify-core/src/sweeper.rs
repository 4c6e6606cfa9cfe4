//! Background reclamation of empty ephemeral channels.
//!
//! A sweeper owns its tracked set exclusively: the set is fixed at spawn,
//! never appended to, never shared with another invocation. Each poll tick
//! re-resolves occupancy for every tracked channel and either deletes it
//! (empty), drops it (vanished out-of-band, or deletion failed — never
//! retried), or keeps it for the next tick. The task exits for good once the
//! set is empty; a channel that never empties is retained indefinitely.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::platform::{ChannelHandle, Platform, PlatformError};

/// Default poll interval, anchored at sweep start.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// What happened to the tracked set by the time the sweep ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Confirmed empty and deleted.
    pub deleted: usize,
    /// Disappeared out-of-band; dropped without a deletion attempt.
    pub vanished: usize,
    /// Deletion failed (e.g. permission revoked); dropped, not retried.
    pub abandoned: usize,
}

/// Spawn a sweep over `channels`, polling every `interval`.
///
/// The returned handle resolves when the tracked set empties, so callers
/// (and tests) can observe completion instead of sleeping.
pub fn spawn<P>(
    platform: Arc<P>,
    channels: Vec<ChannelHandle>,
    interval: Duration,
) -> JoinHandle<SweepSummary>
where
    P: Platform + ?Sized + 'static,
{
    tokio::spawn(async move { sweep(platform.as_ref(), channels, interval).await })
}

async fn sweep<P: Platform + ?Sized>(
    platform: &P,
    channels: Vec<ChannelHandle>,
    interval: Duration,
) -> SweepSummary {
    let mut summary = SweepSummary::default();
    let mut tracked = channels;
    tracing::info!(channels = tracked.len(), "sweep started");

    // First poll one full interval after spawn — channels were just
    // populated and are expected to be occupied right now.
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);

    while !tracked.is_empty() {
        ticker.tick().await;

        let mut keep = Vec::with_capacity(tracked.len());
        for channel in tracked {
            match platform.list_members(&channel).await {
                Ok(members) if members.is_empty() => {
                    match platform.delete_channel(&channel).await {
                        Ok(()) => {
                            tracing::info!(channel = %channel.name, "deleted empty ephemeral channel");
                            summary.deleted += 1;
                        }
                        Err(PlatformError::NotFound) => {
                            tracing::debug!(channel = %channel.name, "channel already gone");
                            summary.vanished += 1;
                        }
                        Err(error) => {
                            // Drop rather than retry so the sweep terminates.
                            tracing::warn!(channel = %channel.name, error = %error, "deletion failed, untracking");
                            summary.abandoned += 1;
                        }
                    }
                }
                Ok(_) => keep.push(channel),
                Err(PlatformError::NotFound) => {
                    tracing::debug!(channel = %channel.name, "tracked channel vanished out-of-band");
                    summary.vanished += 1;
                }
                Err(error) => {
                    // Transient lookup failure — keep tracking, retry next tick.
                    tracing::warn!(channel = %channel.name, error = %error, "occupancy lookup failed");
                    keep.push(channel);
                }
            }
        }
        tracked = keep;
    }

    tracing::info!(
        deleted = summary.deleted,
        vanished = summary.vanished,
        abandoned = summary.abandoned,
        "sweep finished"
    );
    summary
}
