//! Event broadcaster
//!
//! Two audiences subscribe to the push channel: ordinary viewers and
//! trusted player agents. Agents receive full payloads including direct
//! media references; viewers receive display-only copies. Sends are
//! lossy: no receivers is fine, and a failed broadcast never rolls back
//! the queue mutation that triggered it.

use clubcast_common::events::ClubEvent;
use tokio::sync::broadcast;

const EVENT_BUFFER: usize = 100;

#[derive(Debug)]
pub struct Broadcaster {
    viewer_tx: broadcast::Sender<ClubEvent>,
    agent_tx: broadcast::Sender<ClubEvent>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (viewer_tx, _) = broadcast::channel(EVENT_BUFFER);
        let (agent_tx, _) = broadcast::channel(EVENT_BUFFER);
        Self { viewer_tx, agent_tx }
    }

    /// Broadcast an event to both audiences, stripping media references
    /// from the viewer copy
    pub fn emit(&self, event: ClubEvent) {
        let _ = self.viewer_tx.send(event.display_only());
        let _ = self.agent_tx.send(event);
    }

    pub fn subscribe_viewers(&self) -> broadcast::Receiver<ClubEvent> {
        self.viewer_tx.subscribe()
    }

    pub fn subscribe_agents(&self) -> broadcast::Receiver<ClubEvent> {
        self.agent_tx.subscribe()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
