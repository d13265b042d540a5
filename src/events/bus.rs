//! # Event bus.
//!
//! [`Bus`] carries task events from the tasks that publish them to whoever listens,
//! usually a [`Monitor`](crate::Monitor).
//!
//! ```text
//!   Task "a" ──┐
//!   Task "b" ──┼── publish(Event) ──► [ring buffer] ──► Monitor listener
//!   Task "c" ──┘                                    └──► Bus::subscribe() receivers
//! ```
//!
//! ## Rules
//! - `publish` never blocks, so steps and `cancel()` may publish freely.
//! - Without receivers an event is dropped; [`Bus::has_receivers`] lets publishers skip
//!   building it at all.
//! - A receiver falling more than `capacity` events behind gets `Lagged(n)` and loses the
//!   `n` oldest.

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable, non-blocking event channel shared by a group of tasks.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus buffering up to `capacity` events (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Sends `ev` to every current receiver; dropped if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Returns a receiver observing events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns `true` while at least one receiver is alive.
    pub fn has_receivers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}
