use std::borrow::Cow;
use std::sync::Arc;

use crate::core::Config;
use crate::core::probe::Probe;
use crate::core::scheduler::{SchedulerRef, TokioScheduler};
use crate::core::task::Task;
use crate::error::{RuntimeError, TaskError};
use crate::events::Bus;
use crate::tasks::Run;

type BoxRunner<T> = Box<dyn FnOnce() -> Result<Run<T>, TaskError>>;

/// Builder for a [`Task`] with fluent API.
///
/// Without [`with_scheduler`](TaskBuilder::with_scheduler) the task uses the current tokio
/// runtime. Without [`with_bus`](TaskBuilder::with_bus) it publishes no events.
pub struct TaskBuilder<T> {
    name: Cow<'static, str>,
    scheduler: Option<SchedulerRef>,
    bus: Option<Bus>,
    cfg: Config,
    runner: Option<BoxRunner<T>>,
}

impl<T> TaskBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a builder named `"task"` with default [`Config`].
    pub fn new() -> Self {
        Self {
            name: Cow::Borrowed("task"),
            scheduler: None,
            bus: None,
            cfg: Config::default(),
            runner: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerRef) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the runner invoked by [`spawn`](TaskBuilder::spawn).
    pub fn runner<R>(mut self, runner: R) -> Self
    where
        R: FnOnce() -> Result<Run<T>, TaskError> + 'static,
    {
        self.runner = Some(Box::new(runner));
        self
    }

    /// Invokes the runner and returns the task.
    ///
    /// ### Errors
    /// - [`RuntimeError::InvalidRunner`] if no runner was set
    /// - [`RuntimeError::NoScheduler`] if no scheduler was set and no tokio runtime is running
    ///
    /// Both are raised before the runner is invoked; failures of the runner itself are
    /// delivered through [`Task::result`].
    pub fn spawn(self) -> Result<Task<T>, RuntimeError> {
        let runner = self.runner.ok_or(RuntimeError::InvalidRunner)?;
        let scheduler = match self.scheduler {
            Some(s) => s,
            None => Arc::new(TokioScheduler::current()?),
        };
        let probe = Probe::new(self.bus, Arc::from(self.name), self.cfg.publish_steps);
        Ok(Task::launch(runner, scheduler, probe))
    }
}

impl<T> Default for TaskBuilder<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Mode, TurnQueue};
    use crate::events::EventKind;
    use crate::tasks::StepContext;

    #[test]
    fn test_missing_runner_is_invalid() {
        let res = TaskBuilder::<u32>::new()
            .with_scheduler(Arc::new(TurnQueue::new()))
            .spawn();
        assert_eq!(res.unwrap_err(), RuntimeError::InvalidRunner);
    }

    #[test]
    fn test_invalid_runner_checked_before_scheduler() {
        let res = TaskBuilder::<u32>::new().spawn();
        assert_eq!(res.unwrap_err(), RuntimeError::InvalidRunner);
    }

    #[test]
    fn test_events_follow_the_task_lifecycle() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let queue = TurnQueue::new();

        let task = TaskBuilder::new()
            .with_name("fetch")
            .with_scheduler(Arc::new(queue.clone()))
            .with_bus(bus)
            .with_config(Config {
                publish_steps: true,
                ..Config::default()
            })
            .runner(|| {
                Ok(Run::from_async(|cx: StepContext| async move {
                    cx.suspend().await?;
                    cx.suspend().await?;
                    Ok::<_, TaskError>(1)
                }))
            })
            .spawn()
            .unwrap();
        assert_eq!(task.name(), "fetch");

        task.cancel();
        task.cancel();
        queue.run_until_idle();
        task.cancel();

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            assert_eq!(ev.task.as_deref(), Some("fetch"));
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskCreated,
                EventKind::StepSuspended,
                EventKind::CancelRequested,
                EventKind::CancelDiscarded,
                EventKind::TaskFailed,
                EventKind::CancelDiscarded,
            ]
        );
    }

    #[test]
    fn test_immediate_task_events() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let _task = TaskBuilder::new()
            .with_scheduler(Arc::new(TurnQueue::new()))
            .with_bus(bus)
            .runner(|| Ok(Run::future(async { Ok(3) })))
            .spawn()
            .unwrap();

        let created = rx.try_recv().unwrap();
        assert_eq!(created.kind, EventKind::TaskCreated);
        assert_eq!(created.mode, Some(Mode::Immediate));

        let resolved = rx.try_recv().unwrap();
        assert_eq!(resolved.kind, EventKind::TaskResolved);
        assert_eq!(resolved.reason.as_deref(), Some("adopting future"));
        assert!(resolved.step.is_none());
    }
}
