//! SQLite persistence adapters
//!
//! The live engine treats storage as an external collaborator: catalog
//! reads (songs, playlists, schedules, bans) and ban writes. In-flight
//! queue state is intentionally never persisted.

pub mod bans;
pub mod init;
pub mod models;
pub mod playlists;
pub mod songs;
