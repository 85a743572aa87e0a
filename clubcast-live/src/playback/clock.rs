//! Playback clock / player state machine
//!
//! States: Idle (no current song), Playing, Paused. Elapsed time is
//! reconstructed as (now - playback_start) - accumulated_paused while
//! playing, and frozen at (last_pause - playback_start - accumulated_paused)
//! while paused. Invariant: `last_pause` is Some iff a song is loaded and
//! playback is paused.

use crate::queue::entry::QueueEntry;
use std::time::{Duration, Instant};

const DEFAULT_VOLUME: u8 = 80;

#[derive(Debug)]
pub struct PlayerClock {
    current: Option<QueueEntry>,
    is_playing: bool,
    volume: u8,
    playback_start: Option<Instant>,
    accumulated_paused: Duration,
    last_pause: Option<Instant>,
}

impl Default for PlayerClock {
    fn default() -> Self {
        Self {
            current: None,
            is_playing: false,
            volume: DEFAULT_VOLUME,
            playback_start: None,
            accumulated_paused: Duration::ZERO,
            last_pause: None,
        }
    }
}

impl PlayerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&QueueEntry> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Load a new current song and start it from zero. Returns the
    /// displaced song, which the caller moves into the play history.
    pub fn load_next(&mut self, entry: QueueEntry) -> Option<QueueEntry> {
        self.load_next_at(entry, Instant::now())
    }

    pub fn load_next_at(&mut self, entry: QueueEntry, now: Instant) -> Option<QueueEntry> {
        let displaced = self.current.replace(entry);
        self.is_playing = true;
        self.playback_start = Some(now);
        self.accumulated_paused = Duration::ZERO;
        self.last_pause = None;
        displaced
    }

    /// Transition to Idle. Returns the displaced song, if any.
    pub fn stop(&mut self) -> Option<QueueEntry> {
        let displaced = self.current.take();
        self.is_playing = false;
        self.playback_start = None;
        self.accumulated_paused = Duration::ZERO;
        self.last_pause = None;
        displaced
    }

    /// Pause playback. No-op unless playing with a song loaded.
    /// Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        self.pause_at(Instant::now())
    }

    pub fn pause_at(&mut self, now: Instant) -> bool {
        if !self.is_playing || self.current.is_none() {
            return false;
        }
        self.is_playing = false;
        self.last_pause = Some(now);
        true
    }

    /// Resume playback, folding the pause interval into the accumulated
    /// paused duration. No-op unless paused with a song loaded.
    pub fn resume(&mut self) -> bool {
        self.resume_at(Instant::now())
    }

    pub fn resume_at(&mut self, now: Instant) -> bool {
        if self.is_playing || self.current.is_none() {
            return false;
        }
        let Some(last_pause) = self.last_pause.take() else {
            return false;
        };
        self.accumulated_paused += now.saturating_duration_since(last_pause);
        self.is_playing = true;
        true
    }

    /// Clamp and set the master volume, independent of play state
    pub fn set_volume(&mut self, level: i64) -> u8 {
        self.volume = level.clamp(0, 100) as u8;
        self.volume
    }

    /// Reconstructed elapsed playback time of the current song.
    /// Zero when idle; frozen while paused; never negative.
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let Some(start) = self.playback_start else {
            return Duration::ZERO;
        };
        if self.current.is_none() {
            return Duration::ZERO;
        }
        let reference = if self.is_playing {
            now
        } else {
            match self.last_pause {
                Some(pause) => pause,
                None => return Duration::ZERO,
            }
        };
        reference
            .saturating_duration_since(start)
            .saturating_sub(self.accumulated_paused)
    }

    /// Shift the playback start into the past, simulating elapsed time
    #[cfg(test)]
    pub fn backdate_start(&mut self, by: Duration) {
        if let Some(start) = self.playback_start {
            self.playback_start = Some(start - by);
        }
    }
}
