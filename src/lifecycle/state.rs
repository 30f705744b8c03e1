//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Created → Listening → ShuttingDown → Stopped
//! ```
//!
//! Transitions only move forward; a request to move backwards is ignored.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ServerState {
    Created,
    Listening,
    ShuttingDown,
    Stopped,
}

/// Publishes the current [`ServerState`] to any number of watchers.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    tx: Arc<watch::Sender<ServerState>>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Created);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> ServerState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.tx.subscribe()
    }

    /// Move to `next` if it is later than the current state.
    pub fn advance(&self, next: ServerState) -> bool {
        let moved = self.tx.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });
        if moved {
            tracing::debug!(state = ?next, "Server state changed");
        }
        moved
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
