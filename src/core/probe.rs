//! Event publishing for one task.
//!
//! A task built without a bus gets a silent probe; every method is then a no-op. So is a
//! probe whose bus has no receivers.

use std::sync::Arc;

use crate::core::Mode;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};

#[derive(Clone)]
pub(crate) struct Probe {
    bus: Option<Bus>,
    name: Arc<str>,
    publish_steps: bool,
}

impl Probe {
    pub(crate) fn new(bus: Option<Bus>, name: Arc<str>, publish_steps: bool) -> Self {
        Self {
            bus,
            name,
            publish_steps,
        }
    }

    pub(crate) fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Builds and publishes the event only if someone is listening.
    fn publish(&self, ev: impl FnOnce() -> Event) {
        if let Some(bus) = self.bus.as_ref().filter(|b| b.has_receivers()) {
            bus.publish(ev().with_task(Arc::clone(&self.name)));
        }
    }

    pub(crate) fn created(&self, mode: Mode) {
        self.publish(|| Event::new(EventKind::TaskCreated).with_mode(mode));
    }

    pub(crate) fn suspended(&self, step: u32) {
        if self.publish_steps {
            self.publish(|| Event::new(EventKind::StepSuspended).with_step(step));
        }
    }

    pub(crate) fn resolved(&self, mode: Mode, step: Option<u32>, adopting: bool) {
        self.publish(|| {
            let mut ev = Event::new(EventKind::TaskResolved).with_mode(mode);
            if let Some(n) = step {
                ev = ev.with_step(n);
            }
            if adopting {
                ev = ev.with_reason("adopting future");
            }
            ev
        });
    }

    pub(crate) fn failed(&self, mode: Mode, step: Option<u32>, err: &TaskError) {
        self.publish(|| {
            let ev = Event::new(EventKind::TaskFailed)
                .with_mode(mode)
                .with_reason(err.to_string());
            match step {
                Some(n) => ev.with_step(n),
                None => ev,
            }
        });
    }

    pub(crate) fn cancel_requested(&self, step: u32, deferred: bool) {
        self.publish(|| {
            let ev = Event::new(EventKind::CancelRequested).with_step(step);
            if deferred { ev.with_reason("deferred") } else { ev }
        });
    }

    pub(crate) fn cancel_discarded(&self, reason: &str) {
        self.publish(|| Event::new(EventKind::CancelDiscarded).with_reason(reason));
    }
}
