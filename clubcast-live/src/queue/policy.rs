//! Cooldown/fairness policy
//!
//! Stateless rule evaluator over recent-play history and current queue
//! contents. Applies only to ordinary jukebox requests; DJ picks,
//! commercials, and playlist loads bypass it entirely since staff actions
//! are trusted.

use super::history::PlayHistory;
use super::store::QueueStore;
use std::fmt;

/// A song is ineligible while it appears in this many recent plays
pub const SONG_COOLDOWN_COUNT: usize = 20;

/// An artist is ineligible after this many plays inside the cooldown window
pub const ARTIST_COOLDOWN_SONG_LIMIT: usize = 5;

/// Maximum simultaneous queued requests per requester token
pub const USER_REQUEST_LIMIT: usize = 5;

/// Why a request was refused. The Display string is the exact message
/// shown to the patron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    SongBanned,
    SongOnCooldown,
    ArtistOnCooldown,
    RequesterLimitReached,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            RejectReason::SongBanned => "This song is temporarily banned from the program.",
            RejectReason::SongOnCooldown => "This song played recently and needs to wait.",
            RejectReason::ArtistOnCooldown => {
                "This artist has played a lot recently. Try another one."
            }
            RejectReason::RequesterLimitReached => {
                "You have reached the request limit. Please wait a while."
            }
        };
        f.write_str(message)
    }
}

/// Evaluate the fairness rules in order; the first failure wins.
/// `banned` is the ban-registry verdict, resolved by the caller before
/// the queue lock is taken.
pub fn evaluate(
    song_id: i64,
    artist_id: i64,
    requester: &str,
    banned: bool,
    history: &PlayHistory,
    queue: &QueueStore,
) -> Option<RejectReason> {
    if banned {
        return Some(RejectReason::SongBanned);
    }

    let recent: Vec<_> = history.recent(SONG_COOLDOWN_COUNT).collect();

    if recent.iter().any(|h| h.entry.song_id == song_id) {
        return Some(RejectReason::SongOnCooldown);
    }

    let artist_plays = recent.iter().filter(|h| h.entry.artist_id == artist_id).count();
    if artist_plays >= ARTIST_COOLDOWN_SONG_LIMIT {
        return Some(RejectReason::ArtistOnCooldown);
    }

    if queue.requester_load(requester) >= USER_REQUEST_LIMIT {
        return Some(RejectReason::RequesterLimitReached);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::entry::{EntryId, QueueEntry, RequestOrigin};
    use chrono::Utc;

    fn entry(id: u64, song_id: i64, artist_id: i64, origin: RequestOrigin) -> QueueEntry {
        QueueEntry {
            id: EntryId(id),
            song_id,
            artist_id,
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

    fn played(history: &mut PlayHistory, song_id: i64, artist_id: i64) {
        history.push(
            entry(song_id as u64, song_id, artist_id, RequestOrigin::PlaylistFiller),
            Utc::now(),
        );
    }

    #[test]
    fn test_ban_wins_over_everything() {
        let history = PlayHistory::new();
        let queue = QueueStore::new();
        assert_eq!(
            evaluate(1, 1, "patron", true, &history, &queue),
            Some(RejectReason::SongBanned)
        );
    }

    #[test]
    fn test_song_in_cooldown_window_rejected() {
        let mut history = PlayHistory::new();
        let queue = QueueStore::new();
        played(&mut history, 7, 1);

        assert_eq!(
            evaluate(7, 1, "patron", false, &history, &queue),
            Some(RejectReason::SongOnCooldown)
        );
    }

    #[test]
    fn test_song_ages_out_of_cooldown_window() {
        let mut history = PlayHistory::new();
        let queue = QueueStore::new();
        played(&mut history, 7, 1);
        // 20 more plays by other artists push song 7 out of the window
        for i in 0..20 {
            played(&mut history, 100 + i, 50 + i);
        }

        assert_eq!(evaluate(7, 1, "patron", false, &history, &queue), None);
    }

    #[test]
    fn test_artist_saturation_rejected_at_limit() {
        let mut history = PlayHistory::new();
        let queue = QueueStore::new();
        for i in 0..ARTIST_COOLDOWN_SONG_LIMIT as i64 {
            played(&mut history, 200 + i, 9);
        }

        // A different song by the saturated artist is refused
        assert_eq!(
            evaluate(300, 9, "patron", false, &history, &queue),
            Some(RejectReason::ArtistOnCooldown)
        );
        // Another artist is fine
        assert_eq!(evaluate(301, 10, "patron", false, &history, &queue), None);
    }

    #[test]
    fn test_requester_limit() {
        let history = PlayHistory::new();
        let mut queue = QueueStore::new();
        for i in 0..USER_REQUEST_LIMIT as u64 {
            queue.enqueue_user_request(entry(
                i,
                400 + i as i64,
                20 + i as i64,
                RequestOrigin::UserRequest { requester: "patron".to_string() },
            ));
        }

        assert_eq!(
            evaluate(500, 30, "patron", false, &history, &queue),
            Some(RejectReason::RequesterLimitReached)
        );
        assert_eq!(evaluate(500, 30, "someone-else", false, &history, &queue), None);
    }

    #[test]
    fn test_reason_messages_are_human_readable() {
        assert_eq!(
            RejectReason::SongOnCooldown.to_string(),
            "This song played recently and needs to wait."
        );
    }
}
