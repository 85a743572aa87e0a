//! # Clubcast shared types (clubcast-common)
//!
//! Event vocabulary and club-local time utilities shared between the live
//! broadcast service and any future companion modules.

pub mod events;
pub mod time;
