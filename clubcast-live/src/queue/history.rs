//! Bounded play history
//!
//! FIFO of the last plays, used only for cooldown lookups. Never
//! persisted; lost on restart by design.

use super::entry::QueueEntry;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Maximum retained history entries; oldest evicted on overflow
pub const HISTORY_MAX_LENGTH: usize = 50;

/// A queue entry augmented with its actual play timestamp
#[derive(Debug, Clone)]
pub struct PlayHistoryEntry {
    pub entry: QueueEntry,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct PlayHistory {
    entries: VecDeque<PlayHistoryEntry>,
}

impl PlayHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest-first view of the full history
    pub fn entries(&self) -> impl Iterator<Item = &PlayHistoryEntry> {
        self.entries.iter()
    }

    /// The most recent `n` plays, oldest-first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &PlayHistoryEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn push(&mut self, entry: QueueEntry, played_at: DateTime<Utc>) {
        self.entries.push_back(PlayHistoryEntry { entry, played_at });
        if self.entries.len() > HISTORY_MAX_LENGTH {
            self.entries.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::entry::{EntryId, RequestOrigin};

    fn entry(song_id: i64) -> QueueEntry {
        QueueEntry {
            id: EntryId(song_id as u64),
            song_id,
            artist_id: 1,
            title: format!("Song {}", song_id),
            artist_name: "Artist".to_string(),
            album: None,
            record_label: None,
            director: None,
            filename: None,
            duration_seconds: 180,
            origin: RequestOrigin::PlaylistFiller,
            requested_at: Utc::now(),
        }
    }

    #[test]
    fn test_history_evicts_oldest_beyond_cap() {
        let mut history = PlayHistory::new();
        for song_id in 1..=51 {
            history.push(entry(song_id), Utc::now());
        }

        assert_eq!(history.len(), HISTORY_MAX_LENGTH);
        let ids: Vec<i64> = history.entries().map(|h| h.entry.song_id).collect();
        // Entry 1 evicted, entry 2 is now the oldest
        assert_eq!(ids.first(), Some(&2));
        assert_eq!(ids.last(), Some(&51));
    }

    #[test]
    fn test_recent_window_is_last_n_oldest_first() {
        let mut history = PlayHistory::new();
        for song_id in 1..=30 {
            history.push(entry(song_id), Utc::now());
        }

        let window: Vec<i64> = history.recent(20).map(|h| h.entry.song_id).collect();
        assert_eq!(window.len(), 20);
        assert_eq!(window.first(), Some(&11));
        assert_eq!(window.last(), Some(&30));
    }

    #[test]
    fn test_recent_window_larger_than_history() {
        let mut history = PlayHistory::new();
        history.push(entry(1), Utc::now());
        let window: Vec<i64> = history.recent(20).map(|h| h.entry.song_id).collect();
        assert_eq!(window, vec![1]);
    }
}
