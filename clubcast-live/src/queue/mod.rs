//! The in-memory live queue
//!
//! Pending requests segmented by priority class, the bounded play history,
//! and the cooldown/fairness policy applied to jukebox requests.

pub mod entry;
pub mod history;
pub mod policy;
pub mod store;

pub use entry::{EntryId, EntryIdGenerator, QueueEntry, RequestOrigin};
pub use history::{PlayHistory, HISTORY_MAX_LENGTH};
pub use policy::RejectReason;
pub use store::QueueStore;
