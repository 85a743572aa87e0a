//! Playlist scheduler
//!
//! A reconciler, not an alarm: every tick recomputes what should be on
//! air from the schedule table and converges toward it. Missed ticks are
//! harmless since the next one reaches the same conclusion. Two rules
//! keep the reconciler from fighting the DJ:
//!
//!   1. A scheduled slot never preempts manual work: when the DJ's last
//!      action is newer than the slot's start instant, the slot lost its
//!      window and is skipped.
//!   2. Activation is idempotent: a slot the scheduler already activated
//!      is not re-activated, so user requests layered on top of its
//!      filler survive subsequent ticks.
//!
//! The weekday-default playlist fills dead air: it activates only when no
//! song is loaded at all (a paused song is not dead air) and only when no
//! specific slot claims the current window. A specific slot is terminal
//! for its tick whether it activates, is blocked by the watermark, or is
//! already on air.

use crate::db;
use crate::db::models::ScheduleCandidates;
use crate::engine::{ActivationSource, LiveEngine, SchedulerView};
use crate::error::Result;
use chrono::{DateTime, Utc};
use clubcast_common::time::{local_time_info, LocalTimeInfo};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

const RECONCILE_INTERVAL: Duration = Duration::from_secs(60);
const EXPIRY_INTERVAL: Duration = Duration::from_secs(1);

/// Which schedule rule produced an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Specific,
    Fallback,
}

/// A playlist the reconciler decided to put on air
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub playlist_id: i64,
    pub playlist_name: String,
    pub kind: SlotKind,
}

/// Pure scheduling decision over a state snapshot.
///
/// The snapshot is taken before the activation lock, so a DJ action can
/// land in between; the window is one tick wide and the next tick backs
/// off via the watermark.
pub fn decide(
    local: &LocalTimeInfo,
    candidates: &ScheduleCandidates,
    view: &SchedulerView,
) -> Option<Activation> {
    // A specific slot owns its whole window: when it is suppressed by the
    // DJ watermark or already on air, the tick ends without consulting
    // the fallback, so silence the DJ created inside the slot stays silent
    if let Some(specific) = &candidates.specific {
        let slot_start = specific.start_utc(local.date);
        if manual_action_supersedes(view.last_manual_action, slot_start) {
            debug!(
                playlist_id = specific.playlist_id,
                "Scheduled slot skipped, DJ acted after slot start"
            );
            return None;
        }
        if view.active_playlist_id == Some(specific.playlist_id)
            && view.source == ActivationSource::Scheduler
        {
            // Already on air from this slot; re-activating would wipe
            // user requests layered on its filler
            return None;
        }
        return Some(Activation {
            playlist_id: specific.playlist_id,
            playlist_name: specific.name.clone(),
            kind: SlotKind::Specific,
        });
    }

    if let Some(fallback) = &candidates.fallback {
        if view.is_idle && view.active_playlist_id != Some(fallback.playlist_id) {
            return Some(Activation {
                playlist_id: fallback.playlist_id,
                playlist_name: fallback.name.clone(),
                kind: SlotKind::Fallback,
            });
        }
    }

    None
}

fn manual_action_supersedes(
    last_manual_action: Option<DateTime<Utc>>,
    slot_start: DateTime<Utc>,
) -> bool {
    matches!(last_manual_action, Some(watermark) if watermark > slot_start)
}

/// One reconciler pass: outside operating hours this is a no-op
pub async fn tick(engine: &LiveEngine) -> Result<()> {
    let local = local_time_info(Utc::now());
    if !engine.config().is_operating_hour(local.hour) {
        return Ok(());
    }

    let candidates = db::playlists::find_for_schedule(engine.pool(), &local).await?;
    let view = engine.scheduler_view().await;

    if let Some(activation) = decide(&local, &candidates, &view) {
        info!(
            playlist_id = activation.playlist_id,
            name = %activation.playlist_name,
            kind = ?activation.kind,
            "Scheduler activating playlist"
        );
        engine
            .activate_playlist(activation.playlist_id, ActivationSource::Scheduler)
            .await?;
    }

    Ok(())
}

/// Periodic schedule reconciliation. Errors are logged and the loop
/// continues; a bad tick must never take the service down.
pub async fn run_reconciler(engine: Arc<LiveEngine>) {
    let mut interval = tokio::time::interval(RECONCILE_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if let Err(e) = tick(&engine).await {
            error!("Scheduler tick failed: {}", e);
        }
    }
}

/// Periodic song-expiry check, driving automatic track advance
pub async fn run_expiry(engine: Arc<LiveEngine>) {
    let mut interval = tokio::time::interval(EXPIRY_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        if let Err(e) = engine.check_expiry().await {
            error!("Expiry check failed: {}", e);
        }
    }
}
