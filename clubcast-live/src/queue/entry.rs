//! Queue entry types

use crate::db::models::SongRecord;
use chrono::{DateTime, Utc};
use clubcast_common::events::{NowPlaying, QueueEntryInfo};
use serde::{Deserialize, Serialize};

/// Who put an entry into the queue. The tag governs insertion position:
/// Commercial > DJ > User > Playlist filler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestOrigin {
    /// Paid spot, jumps to the absolute head
    Commercial,
    /// DJ pick, queues behind existing priority entries
    DjPriority,
    /// Jukebox patron request, identified by an opaque requester token
    UserRequest { requester: String },
    /// Filler sourced from the active playlist
    PlaylistFiller,
}

impl RequestOrigin {
    /// Commercial and DJ entries form the priority run at the queue head
    pub fn is_priority(&self) -> bool {
        matches!(self, RequestOrigin::Commercial | RequestOrigin::DjPriority)
    }

    pub fn is_filler(&self) -> bool {
        matches!(self, RequestOrigin::PlaylistFiller)
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            RequestOrigin::Commercial => "commercial",
            RequestOrigin::DjPriority => "dj",
            RequestOrigin::UserRequest { .. } => "user",
            RequestOrigin::PlaylistFiller => "playlist",
        }
    }
}

/// Opaque, time-ordered unique queue entry id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

/// Generates millisecond-timestamp ids, bumped on collision so ids stay
/// strictly increasing within the process.
#[derive(Debug, Default)]
pub struct EntryIdGenerator {
    last: u64,
}

impl EntryIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> EntryId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last + 1);
        EntryId(self.last)
    }
}

/// A pending request in the live queue. Ownership moves to the playback
/// clock when dequeued as the current song, then to the play history.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: EntryId,
    pub song_id: i64,
    pub artist_id: i64,
    pub title: String,
    pub artist_name: String,
    pub album: Option<String>,
    pub record_label: Option<String>,
    pub director: Option<String>,
    pub filename: Option<String>,
    pub duration_seconds: i64,
    pub origin: RequestOrigin,
    pub requested_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn from_song(id: EntryId, song: &SongRecord, origin: RequestOrigin) -> Self {
        Self {
            id,
            song_id: song.id,
            artist_id: song.artist_id,
            title: song.title.clone(),
            artist_name: song.artist_name.clone(),
            album: song.album.clone(),
            record_label: song.record_label.clone(),
            director: song.director.clone(),
            filename: song.filename.clone(),
            duration_seconds: song.duration_seconds,
            origin,
            requested_at: Utc::now(),
        }
    }

    /// Display projection for queue snapshots and events
    pub fn info(&self) -> QueueEntryInfo {
        QueueEntryInfo {
            entry_id: self.id.0,
            song_id: self.song_id,
            title: self.title.clone(),
            artist: self.artist_name.clone(),
            origin: self.origin.class_name().to_string(),
            requested_at: self.requested_at,
        }
    }

    /// Full display projection for the current song
    pub fn now_playing(&self) -> NowPlaying {
        NowPlaying {
            song_id: self.song_id,
            title: self.title.clone(),
            artist: self.artist_name.clone(),
            album: self.album.clone(),
            record_label: self.record_label.clone(),
            director: self.director.clone(),
            duration_seconds: self.duration_seconds,
        }
    }

    pub fn requester(&self) -> Option<&str> {
        match &self.origin {
            RequestOrigin::UserRequest { requester } => Some(requester),
            _ => None,
        }
    }
}
