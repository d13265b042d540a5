//! # Monitor: event wiring for a group of tasks.
//!
//! The [`Monitor`] owns the event bus, a [`SubscriberSet`], and the shared [`Config`].
//! Tasks built through it publish lifecycle events that are fanned out to subscribers.
//!
//! ## Architecture
//! ```text
//! Monitor::new(cfg, subscribers)
//!   ├─► Bus::new(cfg.bus_capacity)
//!   ├─► SubscriberSet::new(subscribers, bus)     (one worker per subscriber)
//!   └─► listener: Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!                                                (skipped without subscribers)
//!
//! Monitor::builder() / spawn()
//!   └─► TaskBuilder { bus, cfg, TokioScheduler } ─► Task ── publish(Event) ──► Bus
//!
//! Monitor::shutdown()
//!   ├─► token.cancel()                  (listener stops waiting)
//!   ├─► drain events still in the bus   (try_recv until empty)
//!   └─► SubscriberSet::shutdown()       (workers finish their queues, then join)
//! ```
//!
//! Tasks are not tracked: shutting the monitor down neither cancels nor waits for them.
//! Events they publish afterwards are dropped.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tasklet::{Config, Monitor, Run, StepContext, Subscribe, TaskError};
//! #[cfg(feature = "logging")]
//! use tasklet::LogWriter;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[allow(unused_mut)]
//!     let mut subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!     #[cfg(feature = "logging")]
//!     subs.push(Arc::new(LogWriter::new()));
//!
//!     let monitor = Monitor::new(Config::default(), subs)?;
//!     let task = monitor.spawn("answer", || {
//!         Ok(Run::from_async(|cx: StepContext| async move {
//!             cx.suspend().await?;
//!             Ok::<_, TaskError>(42)
//!         }))
//!     })?;
//!
//!     assert_eq!(task.await?, 42);
//!     monitor.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::builder::TaskBuilder;
use crate::core::config::Config;
use crate::core::scheduler::{SchedulerRef, TokioScheduler};
use crate::core::task::Task;
use crate::error::{RuntimeError, TaskError};
use crate::events::{Bus, Event};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::Run;

/// Owns the event bus and subscriber fan-out shared by the tasks it builds.
pub struct Monitor {
    cfg: Config,
    bus: Bus,
    scheduler: SchedulerRef,
    token: CancellationToken,
    /// `None` without subscribers: nobody listens, so tasks skip publishing.
    listener: Option<JoinHandle<()>>,
}

impl Monitor {
    /// Creates a monitor and starts forwarding bus events to `subscribers`.
    ///
    /// Fails with [`RuntimeError::NoScheduler`] outside a tokio runtime.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Result<Self, RuntimeError> {
        let scheduler = TokioScheduler::current()?;
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let set = SubscriberSet::new(subscribers, bus.clone());
        let token = CancellationToken::new();

        let listener = (!set.is_empty())
            .then(|| tokio::spawn(listen(bus.subscribe(), set, token.clone())));
        Ok(Self {
            cfg,
            bus,
            scheduler: Arc::new(scheduler),
            token,
            listener,
        })
    }

    /// Returns a builder wired to this monitor's bus, config and runtime.
    pub fn builder<T>(&self) -> TaskBuilder<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        TaskBuilder::new()
            .with_bus(self.bus.clone())
            .with_config(self.cfg.clone())
            .with_scheduler(Arc::clone(&self.scheduler))
    }

    /// Launches a named task; shorthand for `builder().with_name(name).runner(runner).spawn()`.
    pub fn spawn<T, R>(
        &self,
        name: impl Into<Cow<'static, str>>,
        runner: R,
    ) -> Result<Task<T>, RuntimeError>
    where
        T: Clone + Send + Sync + 'static,
        R: FnOnce() -> Result<Run<T>, TaskError> + 'static,
    {
        self.builder().with_name(name).runner(runner).spawn()
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Delivers every event published so far, then stops the subscriber workers.
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Some(listener) = self.listener {
            let _ = listener.await;
        }
    }
}

/// Forwards bus events to the set until cancelled, then drains what is left.
async fn listen(mut rx: broadcast::Receiver<Event>, set: SubscriberSet, token: CancellationToken) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            res = rx.recv() => match res {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        }
    }

    loop {
        match rx.try_recv() {
            Ok(ev) => set.emit(&ev),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    set.shutdown().await;
}
