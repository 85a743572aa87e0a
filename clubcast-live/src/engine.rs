//! Live engine
//!
//! The single-authority owner of all in-flight broadcast state: the
//! request queue, the bounded play history, the playback clock, and the
//! active-playlist metadata. Constructed once at process start and shared
//! behind an Arc by request handlers and the scheduler ticks.
//!
//! Every operation completes its read-validate-mutate sequence under one
//! lock guard, so a scheduler tick and a DJ command can never interleave
//! to double-advance the current song. Ban-registry lookups run before
//! the lock is taken; the window this opens between the cooldown check
//! and the insertion is bounded and tolerable, and cannot corrupt queue
//! ordering.

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::db;
use crate::db::bans::BanDuration;
use crate::error::{Error, Result};
use crate::playback::PlayerClock;
use crate::queue::{
    policy, EntryId, EntryIdGenerator, PlayHistory, QueueEntry, QueueStore, RejectReason,
    RequestOrigin,
};
use chrono::{DateTime, Utc};
use clubcast_common::events::{
    ActivePlaylistInfo, ClubEvent, NowPlaying, PlayerSnapshot, QueueEntryInfo,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Songs advance this early to mask network/transition latency
const EXPIRY_EARLY_TRIGGER: Duration = Duration::from_secs(1);

/// How the active playlist was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationSource {
    Dj,
    Scheduler,
    None,
}

impl ActivationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationSource::Dj => "dj",
            ActivationSource::Scheduler => "scheduler",
            ActivationSource::None => "none",
        }
    }
}

/// Scheduling metadata, distinct from the queue contents
#[derive(Debug)]
struct ActivePlaylist {
    playlist_id: Option<i64>,
    playlist_name: Option<String>,
    source: ActivationSource,
    /// Override watermark: set by any DJ-initiated action. The scheduler
    /// never preempts a slot whose start precedes this instant.
    last_manual_action: Option<DateTime<Utc>>,
}

impl ActivePlaylist {
    fn new() -> Self {
        Self {
            playlist_id: None,
            playlist_name: None,
            source: ActivationSource::None,
            last_manual_action: None,
        }
    }

    /// Reset the active playlist when the queue runs out. The manual
    /// watermark deliberately survives.
    fn clear_active(&mut self) {
        self.playlist_id = None;
        self.playlist_name = None;
        self.source = ActivationSource::None;
    }

    fn info(&self) -> ActivePlaylistInfo {
        ActivePlaylistInfo {
            playlist_id: self.playlist_id,
            playlist_name: self.playlist_name.clone(),
            source: self.source.as_str().to_string(),
        }
    }
}

/// Everything the engine mutates, guarded by one mutex
struct CoreState {
    queue: QueueStore,
    history: PlayHistory,
    clock: PlayerClock,
    active: ActivePlaylist,
    ids: EntryIdGenerator,
}

/// Result of a validated jukebox request
#[derive(Debug)]
pub enum RequestOutcome {
    Accepted(QueueEntryInfo),
    Rejected(RejectReason),
}

/// Result of a pause toggle
#[derive(Debug)]
pub enum PauseToggle {
    Paused,
    Resumed {
        song: NowPlaying,
        media_url: Option<String>,
        position_seconds: f64,
    },
    NoSong,
}

/// Snapshot the scheduler reconciler decides against
#[derive(Debug, Clone)]
pub struct SchedulerView {
    pub active_playlist_id: Option<i64>,
    pub source: ActivationSource,
    pub last_manual_action: Option<DateTime<Utc>>,
    pub is_playing: bool,
    /// No song loaded at all; distinct from paused
    pub is_idle: bool,
}

/// Full queue snapshot returned to the UI
#[derive(Debug, Serialize)]
pub struct LiveQueueSnapshot {
    pub upcoming_requests: Vec<QueueEntryInfo>,
    pub play_history: Vec<QueueEntryInfo>,
    pub player_state: PlayerSnapshot,
    pub current_song: Option<NowPlaying>,
}

pub struct LiveEngine {
    core: Mutex<CoreState>,
    pool: SqlitePool,
    broadcaster: Broadcaster,
    config: Config,
}

impl LiveEngine {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            core: Mutex::new(CoreState {
                queue: QueueStore::new(),
                history: PlayHistory::new(),
                clock: PlayerClock::new(),
                active: ActivePlaylist::new(),
                ids: EntryIdGenerator::new(),
            }),
            pool,
            broadcaster: Broadcaster::new(),
            config,
        }
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========== Request intake ==========

    /// Validate and enqueue an ordinary jukebox request
    pub async fn request_song(&self, song_id: i64, requester: String) -> Result<RequestOutcome> {
        let song = db::songs::find_song(&self.pool, song_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Song {}", song_id)))?;

        // Ban lookup happens before the queue lock; see module docs
        let banned = db::bans::is_banned(&self.pool, song_id).await?;

        let mut core = self.core.lock().await;
        if let Some(reason) = policy::evaluate(
            song.id,
            song.artist_id,
            &requester,
            banned,
            &core.history,
            &core.queue,
        ) {
            return Ok(RequestOutcome::Rejected(reason));
        }

        let id = core.ids.next();
        let entry = QueueEntry::from_song(id, &song, RequestOrigin::UserRequest { requester });
        let entry_info = entry.info();
        core.queue.enqueue_user_request(entry);
        self.emit_queue_updated(&core);

        Ok(RequestOutcome::Accepted(entry_info))
    }

    /// DJ pick: bypasses fairness rules, queues behind existing priority
    /// entries, and stamps the manual-override watermark
    pub async fn add_dj_priority(&self, song_id: i64) -> Result<QueueEntryInfo> {
        let song = db::songs::find_song(&self.pool, song_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Song {}", song_id)))?;

        let mut core = self.core.lock().await;
        let id = core.ids.next();
        let entry = QueueEntry::from_song(id, &song, RequestOrigin::DjPriority);
        let entry_info = entry.info();
        core.queue.enqueue_dj_priority(entry);
        core.active.last_manual_action = Some(Utc::now());
        self.emit_queue_updated(&core);

        Ok(entry_info)
    }

    /// Commercial spot: jumps to the absolute queue head
    pub async fn play_commercial(&self, song_id: i64) -> Result<QueueEntryInfo> {
        let song = db::songs::find_song(&self.pool, song_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Commercial {}", song_id)))?;

        let mut core = self.core.lock().await;
        let id = core.ids.next();
        let entry = QueueEntry::from_song(id, &song, RequestOrigin::Commercial);
        let entry_info = entry.info();
        core.queue.enqueue_commercial(entry);
        self.emit_queue_updated(&core);

        Ok(entry_info)
    }

    // ========== Queue management ==========

    /// Record a ban and purge every not-yet-played entry for the song.
    /// The currently playing song is untouched. Returns how many queued
    /// entries were removed.
    pub async fn ban_song(&self, song_id: i64, duration: BanDuration) -> Result<usize> {
        db::bans::insert_ban(&self.pool, song_id, duration).await?;

        let mut core = self.core.lock().await;
        let removed = core.queue.remove_by_song_id(song_id);
        self.emit_queue_updated(&core);
        self.broadcaster
            .emit(ClubEvent::BansUpdated { timestamp: Utc::now() });

        info!(song_id, removed, ban = duration.as_str(), "Song banned");
        Ok(removed)
    }

    /// Reorder the queue to match the given id sequence (DJ console
    /// drag-and-drop). Omitted ids are dropped, unknown ids ignored.
    pub async fn reorder_queue(&self, ordered_ids: Vec<EntryId>) -> Result<()> {
        let mut core = self.core.lock().await;
        core.queue.reorder(&ordered_ids);
        self.emit_queue_updated(&core);
        Ok(())
    }

    /// Move one queued request to the head
    pub async fn promote_request(&self, entry_id: EntryId) -> Result<bool> {
        let mut core = self.core.lock().await;
        let promoted = core.queue.promote(entry_id);
        if promoted {
            self.emit_queue_updated(&core);
        }
        Ok(promoted)
    }

    // ========== Playlist activation ==========

    /// Load a playlist into the filler section and immediately begin
    /// playback of the queue head. Returns None without mutating anything
    /// when the playlist has no playable songs: an empty playlist must
    /// never clear an existing queue.
    pub async fn activate_playlist(
        &self,
        playlist_id: i64,
        source: ActivationSource,
    ) -> Result<Option<NowPlaying>> {
        let playlist = db::playlists::find_playlist(&self.pool, playlist_id)
            .await?
            .filter(|p| p.status == "published")
            .ok_or_else(|| Error::NotFound(format!("Playlist {}", playlist_id)))?;

        // Snapshot filter: songs banned after this load are not removed
        // retroactively, only newly-created bans purge the queue
        let items = db::playlists::load_items(&self.pool, playlist_id).await?;
        if items.is_empty() {
            warn!(playlist_id, "Playlist has no playable songs, leaving queue untouched");
            return Ok(None);
        }

        let mut core = self.core.lock().await;
        let filler: Vec<QueueEntry> = items
            .iter()
            .map(|song| {
                let id = core.ids.next();
                QueueEntry::from_song(id, song, RequestOrigin::PlaylistFiller)
            })
            .collect();
        core.queue.replace_filler_section(filler);

        core.active.playlist_id = Some(playlist.id);
        core.active.playlist_name = Some(playlist.name.clone());
        core.active.source = source;
        if source == ActivationSource::Dj {
            core.active.last_manual_action = Some(Utc::now());
        }

        info!(playlist_id, name = %playlist.name, source = source.as_str(), "Playlist activated");
        self.advance_locked(&mut core).await
    }

    // ========== Playback driver ==========

    /// Advance to the next queue entry; Idle + playlist-finished when the
    /// queue is exhausted
    pub async fn play_next(&self) -> Result<Option<NowPlaying>> {
        let mut core = self.core.lock().await;
        self.advance_locked(&mut core).await
    }

    /// DJ skip: stamps the manual watermark, then advances unconditionally
    pub async fn skip(&self) -> Result<Option<NowPlaying>> {
        let mut core = self.core.lock().await;
        core.active.last_manual_action = Some(Utc::now());
        self.advance_locked(&mut core).await
    }

    /// A trusted player agent reported the media stream ended
    pub async fn handle_song_ended(&self) -> Result<Option<NowPlaying>> {
        self.play_next().await
    }

    /// Pause if playing; resume (with the reconstructed position for
    /// client resync) if paused
    pub async fn toggle_pause(&self) -> Result<PauseToggle> {
        let mut core = self.core.lock().await;

        if core.clock.is_playing() {
            if !core.clock.pause() {
                return Ok(PauseToggle::NoSong);
            }
            self.broadcaster.emit(ClubEvent::Paused { timestamp: Utc::now() });
            self.emit_queue_updated(&core);
            return Ok(PauseToggle::Paused);
        }

        if !core.clock.resume() {
            return Ok(PauseToggle::NoSong);
        }
        let position_seconds = core.clock.elapsed().as_secs_f64();
        // resume() only succeeds with a song loaded
        let Some(current) = core.clock.current() else {
            return Ok(PauseToggle::NoSong);
        };
        let song = current.now_playing();
        let media_url = self.media_url_for(current);
        self.broadcaster.emit(ClubEvent::Resumed {
            media_url: media_url.clone(),
            song: song.clone(),
            position_seconds,
            timestamp: Utc::now(),
        });
        self.emit_queue_updated(&core);

        Ok(PauseToggle::Resumed { song, media_url, position_seconds })
    }

    /// Clamp and set the master volume
    pub async fn set_volume(&self, level: i64) -> u8 {
        let mut core = self.core.lock().await;
        let volume = core.clock.set_volume(level);
        self.broadcaster
            .emit(ClubEvent::VolumeChanged { volume, timestamp: Utc::now() });
        volume
    }

    /// Periodic expiry check: advance when the current song's elapsed
    /// time reaches its duration, minus the early-trigger tolerance.
    /// Non-positive durations never auto-expire; those songs require an
    /// explicit skip (prevents a rapid-fire advance loop on bad metadata).
    pub async fn check_expiry(&self) -> Result<bool> {
        let mut core = self.core.lock().await;

        if !core.clock.is_playing() {
            return Ok(false);
        }
        let Some(current) = core.clock.current() else {
            return Ok(false);
        };
        if current.duration_seconds <= 0 {
            return Ok(false);
        }

        let runtime = Duration::from_secs(current.duration_seconds as u64);
        let elapsed = core.clock.elapsed();
        if elapsed + EXPIRY_EARLY_TRIGGER < runtime {
            return Ok(false);
        }

        self.advance_locked(&mut core).await?;
        Ok(true)
    }

    /// Dequeue and start the next song. Entries whose song vanished from
    /// the catalog are skipped with a warning. Holding the core lock for
    /// the metadata fetch keeps ticks and commands strictly serialized.
    async fn advance_locked(&self, core: &mut CoreState) -> Result<Option<NowPlaying>> {
        loop {
            let Some(head) = core.queue.dequeue_head() else {
                if let Some(previous) = core.clock.stop() {
                    core.history.push(previous, Utc::now());
                }
                core.active.clear_active();
                self.broadcaster
                    .emit(ClubEvent::PlaylistFinished { timestamp: Utc::now() });
                self.emit_queue_updated(core);
                return Ok(None);
            };

            // Queued entries may carry partial metadata; re-fetch the
            // authoritative record before going on air
            let Some(song) = db::songs::find_song(&self.pool, head.song_id).await? else {
                warn!(song_id = head.song_id, "Queued song missing from catalog, skipping");
                continue;
            };

            let mut entry = QueueEntry::from_song(head.id, &song, head.origin.clone());
            entry.requested_at = head.requested_at;

            let media_url = self.media_url_for(&entry);
            let now_playing = entry.now_playing();

            if let Some(previous) = core.clock.load_next(entry) {
                core.history.push(previous, Utc::now());
            }

            info!(song_id = song.id, title = %song.title, "Now playing");
            self.broadcaster.emit(ClubEvent::SongChanged {
                media_url,
                song: now_playing.clone(),
                position_seconds: 0.0,
                timestamp: Utc::now(),
            });
            self.emit_queue_updated(core);

            return Ok(Some(now_playing));
        }
    }

    // ========== Snapshots ==========

    pub async fn live_snapshot(&self) -> LiveQueueSnapshot {
        let core = self.core.lock().await;
        LiveQueueSnapshot {
            upcoming_requests: core.queue.entries().iter().map(|e| e.info()).collect(),
            play_history: core.history.entries().map(|h| h.entry.info()).collect(),
            player_state: Self::player_snapshot_locked(&core),
            current_song: core.clock.current().map(|e| e.now_playing()),
        }
    }

    pub async fn player_state(&self) -> PlayerSnapshot {
        let core = self.core.lock().await;
        Self::player_snapshot_locked(&core)
    }

    pub async fn current_song(&self) -> Option<NowPlaying> {
        let core = self.core.lock().await;
        core.clock.current().map(|e| e.now_playing())
    }

    pub async fn active_playlist(&self) -> ActivePlaylistInfo {
        let core = self.core.lock().await;
        core.active.info()
    }

    /// Snapshot for the scheduler reconciler
    pub async fn scheduler_view(&self) -> SchedulerView {
        let core = self.core.lock().await;
        SchedulerView {
            active_playlist_id: core.active.playlist_id,
            source: core.active.source,
            last_manual_action: core.active.last_manual_action,
            is_playing: core.clock.is_playing(),
            is_idle: core.clock.is_idle(),
        }
    }

    /// Current queue state as a QueueUpdated event, for the initial SSE
    /// frame sent to newly connected clients
    pub async fn queue_updated_event(&self) -> ClubEvent {
        let core = self.core.lock().await;
        Self::queue_updated_locked(&core)
    }

    // ========== Internals ==========

    fn media_url_for(&self, entry: &QueueEntry) -> Option<String> {
        entry.filename.as_deref().map(|f| self.config.media_url(f))
    }

    fn player_snapshot_locked(core: &CoreState) -> PlayerSnapshot {
        PlayerSnapshot {
            is_playing: core.clock.is_playing(),
            volume: core.clock.volume(),
            position_seconds: core.clock.elapsed().as_secs_f64(),
        }
    }

    fn queue_updated_locked(core: &CoreState) -> ClubEvent {
        ClubEvent::QueueUpdated {
            upcoming: core.queue.entries().iter().map(|e| e.info()).collect(),
            history: core.history.entries().map(|h| h.entry.info()).collect(),
            player: Self::player_snapshot_locked(core),
            current: core.clock.current().map(|e| e.now_playing()),
            timestamp: Utc::now(),
        }
    }

    fn emit_queue_updated(&self, core: &CoreState) {
        self.broadcaster.emit(Self::queue_updated_locked(core));
    }

    /// Shift the current song's start into the past (expiry tests)
    #[cfg(test)]
    pub(crate) async fn backdate_current(&self, by: Duration) {
        self.core.lock().await.clock.backdate_start(by);
    }
}
