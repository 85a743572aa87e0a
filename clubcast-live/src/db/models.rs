//! Row types returned by the catalog queries

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

/// A catalog song joined with its artist name
#[derive(Debug, Clone, FromRow)]
pub struct SongRecord {
    pub id: i64,
    pub title: String,
    pub artist_id: i64,
    pub artist_name: String,
    pub album: Option<String>,
    pub record_label: Option<String>,
    pub director: Option<String>,
    /// Object-storage key of the transcoded media, if upload has finished
    pub filename: Option<String>,
    pub duration_seconds: i64,
}

/// A playlist header row
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistRecord {
    pub id: i64,
    pub name: String,
    pub status: String,
}

/// An active ban row
#[derive(Debug, Clone, FromRow)]
pub struct BanRecord {
    pub id: i64,
    pub song_id: i64,
    pub ban_type: String,
    /// NULL means permanent
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A playlist matched by the scheduler query for a specific slot
#[derive(Debug, Clone, FromRow)]
pub struct ScheduledPlaylist {
    pub playlist_id: i64,
    pub name: String,
    /// Explicit date for one-off slots; NULL for weekly slots
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: NaiveTime,
}

/// The weekday-default playlist used to fill silence
#[derive(Debug, Clone, FromRow)]
pub struct FallbackPlaylist {
    pub playlist_id: i64,
    pub name: String,
}

/// Result of the per-tick scheduler query
#[derive(Debug, Clone, Default)]
pub struct ScheduleCandidates {
    pub specific: Option<ScheduledPlaylist>,
    pub fallback: Option<FallbackPlaylist>,
}

impl ScheduledPlaylist {
    /// UTC instant this slot started, for the override-watermark comparison.
    /// Weekly slots without an explicit date start on the given local date.
    pub fn start_utc(&self, local_date: NaiveDate) -> DateTime<Utc> {
        let date = self.scheduled_date.unwrap_or(local_date);
        clubcast_common::time::scheduled_start_utc(date, self.scheduled_time)
    }
}
