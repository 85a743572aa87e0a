//! # Clubcast Live Engine (clubcast-live)
//!
//! Live queue and playback scheduling service for the Clubcast nightclub
//! broadcast system.
//!
//! **Purpose:** Accept jukebox requests and DJ commands, keep the priority
//! queue ordered, drive song-to-song playback on a wall-clock timer, run
//! the playlist schedule, and push state changes to clients over SSE.
//!
//! **Architecture:** A single [`engine::LiveEngine`] owns all mutable
//! state behind one mutex; the HTTP layer, the scheduler ticks, and the
//! expiry timer are thin drivers around it. Catalog data (songs,
//! playlists, schedules, bans) lives in SQLite.

pub mod api;
pub mod broadcast;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod playback;
pub mod queue;
pub mod scheduler;

pub use config::Config;
pub use engine::LiveEngine;
pub use error::{Error, Result};
