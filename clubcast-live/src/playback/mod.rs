//! Playback state
//!
//! The player clock reconstructs elapsed playback time from wall-clock
//! timestamps; no authoritative media-position feed exists.

pub mod clock;

pub use clock::PlayerClock;
