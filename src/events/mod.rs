//! # Event system.
//!
//! Tasks publish lifecycle [`Event`]s to a [`Bus`]; a monitor forwards them to subscribers.
//!
//! ```text
//! Task ── publish(Event) ──► Bus ──► Monitor listener ──► SubscriberSet ──► Subscribe::on_event
//! ```
//!
//! Publishing is optional: a task built without a bus emits nothing.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
