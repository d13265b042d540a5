//! # Subscriber fan-out.
//!
//! [`SubscriberSet`] hands every event to each subscriber through its own bounded queue, so
//! a slow or panicking subscriber never holds up the publisher or its neighbours.
//!
//! ```text
//! emit(event) ──► lane "log"     [mpsc] ──► worker ──► LogWriter::on_event
//!             ├─► lane "metrics" [mpsc] ──► worker ──► Metrics::on_event
//!             └─► lane "audit"   [mpsc] ──► worker ──► Audit::on_event
//!                                              └─ panic ──► Bus: SubscriberPanicked
//! ```
//!
//! ## Rules
//! - `emit` only uses `try_send`; it never waits on a subscriber.
//! - A full or closed lane drops the event for that subscriber alone and reports
//!   `SubscriberOverflow` on the bus (overflow reports are never re-reported).
//! - Events reach one subscriber in emit order; subscribers are not ordered among themselves.
//! - A panic inside `on_event` is caught (`AssertUnwindSafe`), so state the subscriber
//!   shares behind a lock may be left half-updated.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::error::panic_message;
use crate::events::{Bus, Event};
use crate::subscribers::Subscribe;

/// Sending half of one subscriber's queue.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out of events to a fixed list of subscribers.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Opens one lane and spawns one worker per subscriber.
    ///
    /// Must be called inside a tokio runtime. Delivery problems are reported on `bus`.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let (lanes, workers) = subs
            .into_iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let lane = Lane {
                    name: sub.name(),
                    tx,
                };
                (lane, tokio::spawn(drive(sub, rx, bus.clone())))
            })
            .unzip();

        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Returns `true` if there is nobody to deliver to.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Emits a copy of `event` to every subscriber.
    pub fn emit(&self, event: &Event) {
        self.emit_arc(Arc::new(event.clone()));
    }

    /// Emits a shared event to every subscriber without copying it.
    pub fn emit_arc(&self, event: Arc<Event>) {
        let report = !event.is_subscriber_overflow();

        for lane in &self.lanes {
            let reason = match lane.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(TrySendError::Full(_)) => "full",
                Err(TrySendError::Closed(_)) => "closed",
            };
            if report {
                self.bus.publish(Event::subscriber_overflow(lane.name, reason));
            }
        }
    }

    /// Closes every lane and waits for the workers to drain what they already hold.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Worker loop for one subscriber: runs until its lane is closed.
async fn drive(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        if let Err(payload) = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}
