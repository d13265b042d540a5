//! # Events emitted by tasks and subscribers.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Task events**: creation, suspension, settlement and cancellation of a task
//! - **Subscriber events**: delivery problems in the subscriber fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! step number and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use tasklet::{Event, EventKind, Mode};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("fetch")
//!     .with_mode(Mode::Stepped)
//!     .with_step(3)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("fetch"));
//! assert_eq!(ev.step, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::Mode;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Task events ===
    /// Runner was invoked and an execution mode selected.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `mode`: selected mode
    TaskCreated,

    /// A step returned at a suspension point (only with `Config::publish_steps`).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `step`: step number (1-based)
    StepSuspended,

    /// Result resolved with a value (or locked onto a future to adopt).
    ///
    /// Sets:
    /// - `task`: task name
    /// - `mode`: execution mode
    /// - `step`: number of steps taken (stepped mode)
    /// - `reason`: `"adopting future"` when the value is a future
    TaskResolved,

    /// Result rejected.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `mode`: execution mode
    /// - `step`: number of steps taken (stepped mode)
    /// - `reason`: failure message
    TaskFailed,

    /// `cancel()` injected (or deferred) an interrupt.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `step`: number of steps taken so far
    /// - `reason`: `"deferred"` when a step was running
    CancelRequested,

    /// `cancel()` had no effect on the result.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: why (already settled, already requested, ...)
    CancelDiscarded,
}

/// Event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Execution mode of the task.
    pub mode: Option<Mode>,
    /// Step number (starting from 1).
    pub step: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            mode: None,
            step: None,
            reason: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the execution mode.
    #[inline]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Attaches a step number.
    #[inline]
    pub fn with_step(mut self, n: u32) -> Self {
        self.step = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// Returns `true` for events that report a settled result.
    #[inline]
    pub fn is_settlement(&self) -> bool {
        matches!(self.kind, EventKind::TaskResolved | EventKind::TaskFailed)
    }
}
