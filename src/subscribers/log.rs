//! # LogWriter — simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [created] task="fetch" mode=Stepped
//! [suspended] task="fetch" step=1
//! [cancel] task="fetch" step=1
//! [failed] task="fetch" step=2 err="task cancelled"
//! [cancel-discarded] task="fetch" reason="already settled"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::TaskCreated => {
                println!("[created] task={:?} mode={:?}", e.task, e.mode);
            }
            EventKind::StepSuspended => {
                println!("[suspended] task={:?} step={:?}", e.task, e.step);
            }
            EventKind::TaskResolved => {
                println!(
                    "[resolved] task={:?} step={:?} note={:?}",
                    e.task, e.step, e.reason
                );
            }
            EventKind::TaskFailed => {
                println!(
                    "[failed] task={:?} step={:?} err={:?}",
                    e.task, e.step, e.reason
                );
            }
            EventKind::CancelRequested => {
                println!(
                    "[cancel] task={:?} step={:?} note={:?}",
                    e.task, e.step, e.reason
                );
            }
            EventKind::CancelDiscarded => {
                println!("[cancel-discarded] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.task, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.task.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
