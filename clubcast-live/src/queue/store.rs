//! Queue store
//!
//! The ordered collection of pending requests, segmented by priority
//! class. Ordering invariant: all Commercial entries precede all DJ
//! entries, which precede all User requests, which precede all Playlist
//! filler. User requests cut in ahead of filler but behind anything
//! already prioritized.

use super::entry::{EntryId, QueueEntry, RequestOrigin};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct QueueStore {
    entries: Vec<QueueEntry>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Insert a user request immediately before the first playlist-filler
    /// entry, or append when no filler is queued.
    pub fn enqueue_user_request(&mut self, entry: QueueEntry) {
        let position = self
            .entries
            .iter()
            .position(|e| e.origin.is_filler())
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
    }

    /// Insert a DJ pick after the contiguous run of Commercial/DJ entries
    /// at the head, so multiple DJ adds queue in call order while always
    /// beating user and filler content.
    pub fn enqueue_dj_priority(&mut self, entry: QueueEntry) {
        let position = self
            .entries
            .iter()
            .position(|e| !e.origin.is_priority())
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
    }

    /// Insert a commercial at the absolute head, even ahead of other
    /// commercials already queued.
    pub fn enqueue_commercial(&mut self, entry: QueueEntry) {
        self.entries.insert(0, entry);
    }

    /// Purge every queued entry for a song, regardless of class. Used when
    /// a ban is newly created. Returns the number of removed entries.
    pub fn remove_by_song_id(&mut self, song_id: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.song_id != song_id);
        before - self.entries.len()
    }

    /// Replace the queue with entries reordered to match the given id
    /// sequence. Ids not present in the queue are ignored; queued entries
    /// omitted from the sequence are dropped. The drop-on-omission
    /// behavior is intentional and relied upon by the DJ console.
    pub fn reorder(&mut self, ordered_ids: &[EntryId]) {
        let mut by_id: HashMap<EntryId, QueueEntry> =
            self.entries.drain(..).map(|e| (e.id, e)).collect();
        for id in ordered_ids {
            if let Some(entry) = by_id.remove(id) {
                self.entries.push(entry);
            }
        }
    }

    /// Move a queued entry to the head. Returns false when the id is
    /// unknown or already first.
    pub fn promote(&mut self, id: EntryId) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) if index > 0 => {
                let entry = self.entries.remove(index);
                self.entries.insert(0, entry);
                true
            }
            _ => false,
        }
    }

    /// Remove all playlist-filler entries and append the new filler after
    /// every non-filler entry.
    pub fn replace_filler_section(&mut self, new_filler: Vec<QueueEntry>) {
        self.entries.retain(|e| !e.origin.is_filler());
        self.entries.extend(new_filler);
    }

    /// Pop the first entry, or None when empty
    pub fn dequeue_head(&mut self) -> Option<QueueEntry> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.entries.remove(0))
        }
    }

    /// How many entries this requester token currently has queued
    pub fn requester_load(&self, requester: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.requester() == Some(requester))
            .count()
    }

    /// Ordering invariant check, used by tests: commercial run, then DJ,
    /// then user, then filler.
    #[cfg(test)]
    pub fn is_well_ordered(&self) -> bool {
        fn rank(origin: &RequestOrigin) -> u8 {
            match origin {
                RequestOrigin::Commercial => 0,
                RequestOrigin::DjPriority => 1,
                RequestOrigin::UserRequest { .. } => 2,
                RequestOrigin::PlaylistFiller => 3,
            }
        }
        self.entries
            .windows(2)
            .all(|pair| rank(&pair[0].origin) <= rank(&pair[1].origin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(id: u64, song_id: i64, origin: RequestOrigin) -> QueueEntry {
        QueueEntry {
            id: EntryId(id),
            song_id,
            artist_id: 1,
            title: format!("Song {}", song_id),
            artist_name: "Artist".to_string(),
            album: None,
            record_label: None,
            director: None,
            filename: None,
            duration_seconds: 180,
            origin,
            requested_at: Utc::now(),
        }
    }

    fn user(id: u64, song_id: i64) -> QueueEntry {
        entry(id, song_id, RequestOrigin::UserRequest { requester: "patron".to_string() })
    }

    fn song_ids(store: &QueueStore) -> Vec<i64> {
        store.entries().iter().map(|e| e.song_id).collect()
    }

    #[test]
    fn test_latest_commercial_is_always_head() {
        let mut store = QueueStore::new();
        store.enqueue_dj_priority(entry(1, 10, RequestOrigin::DjPriority));
        store.enqueue_commercial(entry(2, 20, RequestOrigin::Commercial));
        store.enqueue_commercial(entry(3, 30, RequestOrigin::Commercial));
        store.enqueue_commercial(entry(4, 40, RequestOrigin::Commercial));
        assert_eq!(store.entries()[0].song_id, 40);
        assert!(store.is_well_ordered());
    }

    #[test]
    fn test_user_requests_cut_ahead_of_filler_only() {
        let mut store = QueueStore::new();
        store.replace_filler_section(vec![
            entry(1, 100, RequestOrigin::PlaylistFiller),
            entry(2, 101, RequestOrigin::PlaylistFiller),
        ]);
        store.enqueue_user_request(user(3, 50));
        assert_eq!(song_ids(&store), vec![50, 100, 101]);

        store.enqueue_dj_priority(entry(4, 60, RequestOrigin::DjPriority));
        assert_eq!(song_ids(&store), vec![60, 50, 100, 101]);

        store.enqueue_user_request(user(5, 51));
        assert_eq!(song_ids(&store), vec![60, 50, 51, 100, 101]);
        assert!(store.is_well_ordered());
    }

    #[test]
    fn test_dj_adds_queue_in_call_order_behind_commercials() {
        let mut store = QueueStore::new();
        store.enqueue_commercial(entry(1, 10, RequestOrigin::Commercial));
        store.enqueue_dj_priority(entry(2, 20, RequestOrigin::DjPriority));
        store.enqueue_dj_priority(entry(3, 21, RequestOrigin::DjPriority));
        assert_eq!(song_ids(&store), vec![10, 20, 21]);
    }

    #[test]
    fn test_mixed_enqueue_scenario() {
        // Commercial A, DJ B, user C (no filler yet, appended), then
        // filler [D, E] replaces the (empty) filler section.
        let mut store = QueueStore::new();
        store.enqueue_commercial(entry(1, 1, RequestOrigin::Commercial));
        store.enqueue_dj_priority(entry(2, 2, RequestOrigin::DjPriority));
        store.enqueue_user_request(user(3, 3));
        assert_eq!(song_ids(&store), vec![1, 2, 3]);

        store.replace_filler_section(vec![
            entry(4, 4, RequestOrigin::PlaylistFiller),
            entry(5, 5, RequestOrigin::PlaylistFiller),
        ]);
        assert_eq!(song_ids(&store), vec![1, 2, 3, 4, 5]);
        assert!(store.is_well_ordered());
    }

    #[test]
    fn test_replace_filler_preserves_pending_requests() {
        let mut store = QueueStore::new();
        store.replace_filler_section(vec![
            entry(1, 100, RequestOrigin::PlaylistFiller),
            entry(2, 101, RequestOrigin::PlaylistFiller),
        ]);
        store.enqueue_user_request(user(3, 50));
        store.enqueue_commercial(entry(4, 10, RequestOrigin::Commercial));

        store.replace_filler_section(vec![
            entry(5, 200, RequestOrigin::PlaylistFiller),
        ]);
        assert_eq!(song_ids(&store), vec![10, 50, 200]);
    }

    #[test]
    fn test_remove_by_song_id_purges_all_classes() {
        let mut store = QueueStore::new();
        store.enqueue_commercial(entry(1, 7, RequestOrigin::Commercial));
        store.enqueue_user_request(user(2, 7));
        store.enqueue_user_request(user(3, 8));
        store.replace_filler_section(vec![entry(4, 7, RequestOrigin::PlaylistFiller)]);

        assert_eq!(store.remove_by_song_id(7), 3);
        assert_eq!(song_ids(&store), vec![8]);
    }

    #[test]
    fn test_reorder_intersects_with_existing_ids() {
        let mut store = QueueStore::new();
        store.enqueue_user_request(user(1, 1)); // A
        store.enqueue_user_request(user(2, 2)); // B
        store.enqueue_user_request(user(3, 3)); // C

        // [C, A] with an unknown id: B is dropped, unknown ignored
        store.reorder(&[EntryId(3), EntryId(99), EntryId(1)]);
        assert_eq!(song_ids(&store), vec![3, 1]);
    }

    #[test]
    fn test_promote_moves_entry_to_head() {
        let mut store = QueueStore::new();
        store.enqueue_user_request(user(1, 1));
        store.enqueue_user_request(user(2, 2));
        store.enqueue_user_request(user(3, 3));

        assert!(store.promote(EntryId(3)));
        assert_eq!(song_ids(&store), vec![3, 1, 2]);

        // Already first, and unknown ids, are no-ops
        assert!(!store.promote(EntryId(3)));
        assert!(!store.promote(EntryId(42)));
    }

    #[test]
    fn test_dequeue_head_fifo() {
        let mut store = QueueStore::new();
        assert!(store.dequeue_head().is_none());

        store.enqueue_user_request(user(1, 1));
        store.enqueue_user_request(user(2, 2));
        assert_eq!(store.dequeue_head().map(|e| e.song_id), Some(1));
        assert_eq!(store.dequeue_head().map(|e| e.song_id), Some(2));
        assert!(store.dequeue_head().is_none());
    }

    #[test]
    fn test_requester_load_counts_only_that_token() {
        let mut store = QueueStore::new();
        store.enqueue_user_request(user(1, 1));
        store.enqueue_user_request(user(2, 2));
        store.enqueue_user_request(entry(
            3,
            3,
            RequestOrigin::UserRequest { requester: "other".to_string() },
        ));
        store.enqueue_dj_priority(entry(4, 4, RequestOrigin::DjPriority));

        assert_eq!(store.requester_load("patron"), 2);
        assert_eq!(store.requester_load("other"), 1);
        assert_eq!(store.requester_load("nobody"), 0);
    }
}
