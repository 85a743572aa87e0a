//! Event types for the Clubcast push channel
//!
//! Every state change in the live queue is broadcast to connected clients.
//! Two audiences exist: ordinary viewers receive display-only payloads,
//! trusted player agents additionally receive direct media references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Full metadata for the song currently on air.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NowPlaying {
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub record_label: Option<String>,
    pub director: Option<String>,
    pub duration_seconds: i64,
}

/// One entry of the upcoming queue or play history, as shown to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntryInfo {
    pub entry_id: u64,
    pub song_id: i64,
    pub title: String,
    pub artist: String,
    /// Priority class of the entry: "commercial", "dj", "user" or "playlist".
    pub origin: String,
    pub requested_at: DateTime<Utc>,
}

/// Player state snapshot included in queue updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub is_playing: bool,
    pub volume: u8,
    /// Reconstructed elapsed position of the current song, in seconds.
    pub position_seconds: f64,
}

/// Currently active playlist, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePlaylistInfo {
    pub playlist_id: Option<i64>,
    pub playlist_name: Option<String>,
    /// "dj", "scheduler" or "none".
    pub source: String,
}

/// Clubcast event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClubEvent {
    /// A new song started playing
    SongChanged {
        /// Direct media reference; present only on the agent channel
        media_url: Option<String>,
        song: NowPlaying,
        position_seconds: f64,
        timestamp: DateTime<Utc>,
    },

    /// Queue contents changed (full snapshot for UI display)
    QueueUpdated {
        upcoming: Vec<QueueEntryInfo>,
        history: Vec<QueueEntryInfo>,
        player: PlayerSnapshot,
        current: Option<NowPlaying>,
        timestamp: DateTime<Utc>,
    },

    /// Playback paused
    Paused {
        timestamp: DateTime<Utc>,
    },

    /// Playback resumed; carries the reconstructed position so a
    /// reconnecting client can seek to the correct point
    Resumed {
        media_url: Option<String>,
        song: NowPlaying,
        position_seconds: f64,
        timestamp: DateTime<Utc>,
    },

    /// Queue exhausted, broadcast stopped
    PlaylistFinished {
        timestamp: DateTime<Utc>,
    },

    /// Ban list changed (notification only - clients re-fetch)
    BansUpdated {
        timestamp: DateTime<Utc>,
    },

    /// Master volume changed
    VolumeChanged {
        volume: u8,
        timestamp: DateTime<Utc>,
    },
}

impl ClubEvent {
    /// Event type string for the SSE `event:` field
    pub fn event_name(&self) -> &'static str {
        match self {
            ClubEvent::SongChanged { .. } => "SongChanged",
            ClubEvent::QueueUpdated { .. } => "QueueUpdated",
            ClubEvent::Paused { .. } => "Paused",
            ClubEvent::Resumed { .. } => "Resumed",
            ClubEvent::PlaylistFinished { .. } => "PlaylistFinished",
            ClubEvent::BansUpdated { .. } => "BansUpdated",
            ClubEvent::VolumeChanged { .. } => "VolumeChanged",
        }
    }

    /// Copy of this event with media references stripped, for the viewer
    /// channel. All other payload fields are display-safe.
    pub fn display_only(&self) -> ClubEvent {
        let mut event = self.clone();
        match &mut event {
            ClubEvent::SongChanged { media_url, .. }
            | ClubEvent::Resumed { media_url, .. } => {
                *media_url = None;
            }
            _ => {}
        }
        event
    }
}
