use tracing::info;

use crate::events::CirculationEvent;

/// Trait for circulation observation
pub trait CirculationObserver {
    /// Called after a borrow or return has been applied
    fn on_event(&self, event: &CirculationEvent);
}

/// Emits a tracing event for every circulation transition
#[derive(Debug)]
pub struct TransactionLogger;

impl CirculationObserver for TransactionLogger {
    fn on_event(&self, event: &CirculationEvent) {
        match event {
            CirculationEvent::Borrowed { user, book } => {
                info!(target: "circulation::observers", %user, %book, "Book checked out");
            }
            CirculationEvent::Returned { user, book } => {
                info!(target: "circulation::observers", %user, %book, "Book checked in");
            }
        }
    }
}
