//! # Task handle.
//!
//! [`Task`] is what a caller holds after launching a runner: a settlement channel
//! ([`Task::result`]) and a [`Task::cancel`] operation.
//!
//! ## Mode selection
//! ```text
//! runner() ─┬─ Err(e)                    ─► Immediate: result = Err(e)
//!           ├─ panic                     ─► Immediate: result = Err(Panicked)
//!           ├─ Run::Value(Ready(v))      ─► Immediate: result = Ok(v)
//!           ├─ Run::Value(Pending(f))    ─► Immediate: result adopts f
//!           └─ Run::Stepper(s)           ─► Stepped:   Driver steps s (first step now),
//!                                                      cancel() interrupts s
//! ```
//!
//! ## Rules
//! - The runner is invoked exactly once, synchronously, inside construction.
//! - `cancel()` is a no-op for immediate tasks and idempotent for stepped ones.
//! - Dropping a `Task` does not stop it; scheduled steps keep the driver alive.

use std::fmt;
use std::future::IntoFuture;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::core::builder::TaskBuilder;
use crate::core::driver::Driver;
use crate::core::probe::Probe;
use crate::core::scheduler::SchedulerRef;
use crate::core::settle::{TaskResult, channel};
use crate::core::{Mode, TaskState};
use crate::error::{RuntimeError, TaskError};
use crate::tasks::Run;

/// Cancellable unit of work.
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use futures::FutureExt;
/// use tasklet::{Run, StepContext, Task, TaskError, TurnQueue};
///
/// let queue = TurnQueue::new();
/// let task = Task::with_scheduler(Arc::new(queue.clone()), || {
///     Ok(Run::from_async(|cx: StepContext| async move {
///         cx.suspend().await?;
///         Ok::<_, TaskError>(42)
///     }))
/// })
/// .unwrap();
///
/// assert!(task.result().now_or_never().is_none());
/// queue.run_until_idle();
/// assert_eq!(task.result().now_or_never(), Some(Ok(42)));
/// ```
pub struct Task<T> {
    name: Arc<str>,
    result: TaskResult<T>,
    control: Control<T>,
}

enum Control<T> {
    /// Settled at construction.
    Immediate { state: TaskState },
    Stepped(Arc<Driver<T>>),
}

impl<T> Task<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Launches `runner` on the current tokio runtime.
    ///
    /// Fails with [`RuntimeError::NoScheduler`] outside a runtime; use
    /// [`Task::with_scheduler`] or [`Task::builder`] to pick another scheduler.
    pub fn new<R>(runner: R) -> Result<Self, RuntimeError>
    where
        R: FnOnce() -> Result<Run<T>, TaskError> + 'static,
    {
        TaskBuilder::new().runner(runner).spawn()
    }

    /// Launches `runner`, deferring steps through `scheduler`.
    pub fn with_scheduler<R>(scheduler: SchedulerRef, runner: R) -> Result<Self, RuntimeError>
    where
        R: FnOnce() -> Result<Run<T>, TaskError> + 'static,
    {
        TaskBuilder::new()
            .with_scheduler(scheduler)
            .runner(runner)
            .spawn()
    }

    /// Creates a builder for naming the task and wiring events.
    pub fn builder() -> TaskBuilder<T> {
        TaskBuilder::new()
    }

    /// Invokes the runner and selects the execution mode.
    pub(crate) fn launch<R>(runner: R, scheduler: SchedulerRef, probe: Probe) -> Self
    where
        R: FnOnce() -> Result<Run<T>, TaskError>,
    {
        let (mut resolver, result) = channel::<T>();
        let name = Arc::clone(probe.name());

        let produced = catch_unwind(AssertUnwindSafe(runner))
            .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)));

        let control = match produced {
            Ok(Run::Stepper(stepper)) => {
                probe.created(Mode::Stepped);
                let driver = Driver::new(stepper, resolver, scheduler, probe);
                driver.start();
                Control::Stepped(driver)
            }
            Ok(Run::Value(value)) => {
                probe.created(Mode::Immediate);
                let adopting = value.is_pending();
                resolver.settle(Ok(value));
                probe.resolved(Mode::Immediate, None, adopting);
                Control::Immediate {
                    state: TaskState::Finished,
                }
            }
            Err(e) => {
                probe.created(Mode::Immediate);
                probe.failed(Mode::Immediate, None, &e);
                resolver.settle(Err(e));
                Control::Immediate {
                    state: TaskState::Failed,
                }
            }
        };

        Self {
            name,
            result,
            control,
        }
    }

    /// Returns the settlement channel. Every call returns a handle to the same settlement.
    pub fn result(&self) -> TaskResult<T> {
        self.result.clone()
    }

    /// Returns a cloneable handle that cancels this task.
    pub fn canceller(&self) -> Canceller {
        Canceller {
            target: match &self.control {
                Control::Immediate { .. } => None,
                Control::Stepped(driver) => Some(Arc::clone(driver) as Arc<dyn Cancel>),
            },
        }
    }
}

impl<T: Send + 'static> Task<T> {
    /// Requests cancellation.
    ///
    /// For a suspended stepped task the next step observes [`TaskError::Canceled`] at its
    /// suspension point. Never blocks, never fails; calling it again, or after the task
    /// settled, has no effect on the result.
    pub fn cancel(&self) {
        if let Control::Stepped(driver) = &self.control {
            driver.cancel();
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        match &self.control {
            Control::Immediate { state } => *state,
            Control::Stepped(driver) => driver.state(),
        }
    }

    /// Returns `true` once the outcome is fixed.
    ///
    /// A task that settled with a future to adopt counts as settled before that future has
    /// run; [`Task::result`] may still be pending and may still reject.
    pub fn is_settled(&self) -> bool {
        self.state().is_terminal()
    }

    /// Execution mode picked from the runner's output.
    pub fn mode(&self) -> Mode {
        match &self.control {
            Control::Immediate { .. } => Mode::Immediate,
            Control::Stepped(_) => Mode::Stepped,
        }
    }

    /// Number of steps taken so far (always 0 for immediate tasks).
    pub fn steps(&self) -> u32 {
        match &self.control {
            Control::Immediate { .. } => 0,
            Control::Stepped(driver) => driver.steps(),
        }
    }

    /// Task name used in events.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> IntoFuture for Task<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Result<T, TaskError>;
    type IntoFuture = TaskResult<T>;

    fn into_future(self) -> Self::IntoFuture {
        self.result
    }
}

impl<T: Send + 'static> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("mode", &self.mode())
            .field("state", &self.state())
            .finish()
    }
}

/// Type-erased cancel target.
trait Cancel: Send + Sync {
    fn cancel(&self);
}

impl<T: Send + 'static> Cancel for Driver<T> {
    fn cancel(&self) {
        Driver::cancel(self);
    }
}

/// Cloneable cancel handle obtained from [`Task::canceller`].
///
/// Behaves exactly like [`Task::cancel`]; for an immediate task it does nothing.
#[derive(Clone)]
pub struct Canceller {
    target: Option<Arc<dyn Cancel>>,
}

impl Canceller {
    /// Requests cancellation of the task this handle was taken from.
    pub fn cancel(&self) {
        if let Some(target) = &self.target {
            target.cancel();
        }
    }
}

impl fmt::Debug for Canceller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canceller")
            .field("armed", &self.target.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TurnQueue;
    use crate::tasks::{Step, StepContext, Stepper, Value};
    use futures::FutureExt;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::task::Context;
    use std::time::Duration;

    fn spawn_on<T, R>(queue: &TurnQueue, runner: R) -> Task<T>
    where
        T: Clone + Send + Sync + 'static,
        R: FnOnce() -> Result<Run<T>, TaskError> + 'static,
    {
        Task::with_scheduler(Arc::new(queue.clone()), runner).unwrap()
    }

    fn now<T: Clone + Send + Sync + 'static>(task: &Task<T>) -> Option<Result<T, TaskError>> {
        task.result().now_or_never()
    }

    /// Scripted state machine: plays `script` one entry per step.
    struct Script {
        script: Vec<Result<Option<u32>, TaskError>>,
        stepped: Arc<AtomicUsize>,
        interrupt: Option<TaskError>,
    }

    impl Script {
        fn new(script: Vec<Result<Option<u32>, TaskError>>, stepped: Arc<AtomicUsize>) -> Self {
            Self {
                script,
                stepped,
                interrupt: None,
            }
        }
    }

    impl Stepper<u32> for Script {
        fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step<u32>, TaskError> {
            self.stepped.fetch_add(1, Ordering::SeqCst);
            if let Some(reason) = self.interrupt.take() {
                return Err(reason);
            }
            match self.script.remove(0) {
                Ok(None) => Ok(Step::Suspended),
                Ok(Some(v)) => Ok(Step::Finished(Value::Ready(v))),
                Err(e) => Err(e),
            }
        }

        fn interrupt(&mut self, reason: TaskError) -> Result<(), TaskError> {
            if self.script.is_empty() {
                return Err(reason);
            }
            self.interrupt = Some(reason);
            Ok(())
        }
    }

    #[test]
    fn test_plain_value_resolves() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || Ok(Run::value(42)));
        assert_eq!(task.mode(), Mode::Immediate);
        assert_eq!(task.state(), TaskState::Finished);
        assert_eq!(now(&task), Some(Ok(42)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_runner_failure_rejects() {
        let queue = TurnQueue::new();
        let task: Task<u32> = spawn_on(&queue, || Err(TaskError::fail("OOPS")));
        assert_eq!(task.state(), TaskState::Failed);
        assert_eq!(now(&task), Some(Err(TaskError::fail("OOPS"))));
    }

    #[test]
    fn test_runner_panic_rejects_instead_of_escaping() {
        let queue = TurnQueue::new();
        let task: Task<u32> = spawn_on(&queue, || panic!("runner exploded"));
        assert_eq!(
            now(&task),
            Some(Err(TaskError::Panicked {
                info: "runner exploded".into()
            }))
        );
    }

    #[test]
    fn test_runner_is_invoked_once_synchronously() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let queue = TurnQueue::new();
        let _task = spawn_on(&queue, move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(Run::value(()))
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_returned_future_is_adopted() {
        let queue = TurnQueue::new();
        let ok = spawn_on(&queue, || Ok(Run::future(async { Ok(42) })));
        assert_eq!(now(&ok), Some(Ok(42)));

        let err: Task<u32> =
            spawn_on(&queue, || Ok(Run::future(async { Err(TaskError::fail("OOPS")) })));
        assert_eq!(now(&err), Some(Err(TaskError::fail("OOPS"))));
    }

    #[test]
    fn test_cancel_is_noop_for_immediate_tasks() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || Ok(Run::value(7)));
        task.cancel();
        task.canceller().cancel();
        assert_eq!(now(&task), Some(Ok(7)));
    }

    #[test]
    fn test_stepper_finishing_immediately_resolves() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || {
            Ok(Run::from_async(|_cx| async { Ok::<_, TaskError>(42) }))
        });
        assert_eq!(task.mode(), Mode::Stepped);
        assert_eq!(task.steps(), 1);
        assert_eq!(now(&task), Some(Ok(42)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_suspend_then_finish_resolves_after_one_turn() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                cx.suspend().await?;
                Ok::<_, TaskError>(42)
            }))
        });

        assert_eq!(task.state(), TaskState::Suspended);
        assert_eq!(queue.len(), 1);
        assert_eq!(now(&task), None);

        assert_eq!(queue.run_turn(), 1);
        assert_eq!(task.state(), TaskState::Finished);
        assert_eq!(task.steps(), 2);
        assert_eq!(now(&task), Some(Ok(42)));
    }

    #[test]
    fn test_many_suspensions_do_not_grow_the_stack() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                for _ in 0..10_000 {
                    cx.suspend().await?;
                }
                Ok::<_, TaskError>("done")
            }))
        });
        assert_eq!(queue.run_until_idle(), 10_000);
        assert_eq!(now(&task), Some(Ok("done")));
    }

    #[test]
    fn test_step_failure_rejects_and_stops_stepping() {
        let stepped = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&stepped);
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, move || {
            Ok(Run::stepper(Script::new(
                vec![Ok(None), Err(TaskError::fail("OOPS")), Ok(Some(1))],
                s,
            )))
        });

        queue.run_until_idle();
        assert_eq!(now(&task), Some(Err(TaskError::fail("OOPS"))));
        assert_eq!(stepped.load(Ordering::SeqCst), 2);
        assert_eq!(task.state(), TaskState::Failed);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_step_panic_rejects() {
        let queue = TurnQueue::new();
        let task: Task<u32> = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                cx.suspend().await?;
                if !cx.is_interrupted() {
                    panic!("step exploded");
                }
                Ok::<u32, TaskError>(0)
            }))
        });
        queue.run_until_idle();
        assert!(matches!(now(&task), Some(Err(TaskError::Panicked { .. }))));
    }

    #[test]
    fn test_cancel_without_suspension_point_is_noop() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || {
            Ok(Run::from_async(|_cx| async { Ok::<_, TaskError>(()) }))
        });
        task.cancel();
        queue.run_until_idle();
        assert_eq!(now(&task), Some(Ok(())));
    }

    #[test]
    fn test_cancel_while_suspended_rejects_with_cancellation() {
        let queue = TurnQueue::new();
        let task: Task<()> = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                for _ in 0_u64.. {
                    cx.suspend().await?;
                }
                Ok::<(), TaskError>(())
            }))
        });

        queue.run_turns(3);
        assert_eq!(now(&task), None);

        task.cancel();
        queue.run_until_idle();
        assert_eq!(now(&task), Some(Err(TaskError::Canceled)));
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn test_cancel_runs_cleanup_before_rejecting() {
        let clean = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&clean);
        let queue = TurnQueue::new();
        let task: Task<()> = spawn_on(&queue, move || {
            Ok(Run::from_async(move |cx: StepContext| async move {
                if let Err(e) = cx.suspend().await {
                    flag.store(true, Ordering::SeqCst);
                    return Err(e);
                }
                Ok::<(), TaskError>(())
            }))
        });

        task.cancel();
        queue.run_until_idle();
        assert_eq!(now(&task), Some(Err(TaskError::Canceled)));
        assert!(clean.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cleanup_can_replace_the_outcome() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                match cx.suspend().await {
                    Ok(()) => Ok::<_, TaskError>("finished"),
                    Err(_) => {
                        cx.suspend().await?;
                        Ok("rolled back")
                    }
                }
            }))
        });

        task.cancel();
        queue.run_until_idle();
        assert_eq!(now(&task), Some(Ok("rolled back")));
    }

    #[test]
    fn test_double_cancel_equals_single_cancel() {
        let queue = TurnQueue::new();
        let task: Task<&str> = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                // Swallow the first interrupt, then keep suspending.
                let _ = cx.suspend().await;
                cx.suspend().await?;
                Ok::<_, TaskError>("survived")
            }))
        });

        task.cancel();
        task.cancel();
        task.canceller().cancel();
        queue.run_until_idle();
        assert_eq!(now(&task), Some(Ok("survived")));
    }

    #[test]
    fn test_cancel_after_settlement_is_discarded() {
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || {
            Ok(Run::from_async(|cx: StepContext| async move {
                cx.suspend().await?;
                Ok::<_, TaskError>(5)
            }))
        });
        queue.run_until_idle();
        task.cancel();
        assert_eq!(now(&task), Some(Ok(5)));
    }

    #[test]
    fn test_interrupt_failure_rejects() {
        let stepped = Arc::new(AtomicUsize::new(0));
        let s = Arc::clone(&stepped);
        let queue = TurnQueue::new();
        // Script is exhausted after the first suspension, so interrupt refuses.
        let task = spawn_on(&queue, move || {
            Ok(Run::stepper(Script::new(vec![Ok(None)], s)))
        });
        task.cancel();
        assert_eq!(now(&task), Some(Err(TaskError::Canceled)));
        assert_eq!(task.state(), TaskState::Failed);

        queue.run_until_idle();
        assert_eq!(stepped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_from_inside_a_step_is_deferred() {
        let slot: Arc<Mutex<Option<Canceller>>> = Arc::new(Mutex::new(None));
        let inner_slot = Arc::clone(&slot);
        let queue = TurnQueue::new();
        let task: Task<()> = spawn_on(&queue, move || {
            Ok(Run::from_async(move |cx: StepContext| async move {
                cx.suspend().await?;
                if let Some(c) = inner_slot.lock().unwrap().as_ref() {
                    c.cancel();
                }
                cx.suspend().await?;
                Ok::<(), TaskError>(())
            }))
        });
        *slot.lock().unwrap() = Some(task.canceller());

        queue.run_until_idle();
        assert_eq!(now(&task), Some(Err(TaskError::Canceled)));
    }

    #[test]
    fn test_stepper_can_finish_with_a_future() {
        struct Once;
        impl Stepper<u32> for Once {
            fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step<u32>, TaskError> {
                Ok(Step::Finished(Value::pending(async { Ok(9) })))
            }
            fn interrupt(&mut self, reason: TaskError) -> Result<(), TaskError> {
                Err(reason)
            }
        }

        let queue = TurnQueue::new();
        let task = spawn_on(&queue, || Ok(Run::stepper(Once)));
        assert_eq!(now(&task), Some(Ok(9)));
    }

    #[tokio::test]
    async fn test_await_task_on_tokio() {
        let task = Task::new(|| {
            Ok(Run::from_async(|cx: StepContext| async move {
                cx.suspend().await?;
                cx.suspend().await?;
                Ok::<_, TaskError>(42)
            }))
        })
        .unwrap();
        assert_eq!(task.await, Ok(42));
    }

    #[tokio::test]
    async fn test_cancel_on_tokio() {
        let task: Task<()> = Task::new(|| {
            Ok(Run::from_async(|cx: StepContext| async move {
                for _ in 0_u64.. {
                    cx.suspend().await?;
                }
                Ok::<(), TaskError>(())
            }))
        })
        .unwrap();
        tokio::task::yield_now().await;
        task.cancel();
        assert_eq!(task.result().await, Err(TaskError::Canceled));
    }

    #[test]
    fn test_new_without_runtime_fails() {
        let res = Task::new(|| Ok(Run::value(1)));
        assert_eq!(res.unwrap_err(), RuntimeError::NoScheduler);
    }

    #[test]
    fn test_foreign_await_is_not_polled_until_woken() {
        let (tx, rx) = tokio::sync::oneshot::channel::<u32>();
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, move || {
            Ok(Run::from_async(|_cx| async move {
                rx.await.map_err(|_| TaskError::fail("sender dropped"))
            }))
        });

        assert_eq!(task.state(), TaskState::Suspended);
        assert!(queue.is_empty());
        assert_eq!(queue.run_until_idle(), 0);
        assert_eq!(task.steps(), 1);

        tx.send(11).unwrap();
        assert_eq!(queue.len(), 1);
        queue.run_until_idle();
        assert_eq!(task.steps(), 2);
        assert_eq!(now(&task), Some(Ok(11)));
    }

    #[test]
    fn test_cancel_wakes_a_waiting_computation() {
        let (_tx, rx) = tokio::sync::oneshot::channel::<u32>();
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, move || {
            Ok(Run::from_async(|cx: StepContext| async move {
                tokio::select! {
                    _ = cx.token().cancelled() => Err(TaskError::Canceled),
                    v = rx => v.map_err(|_| TaskError::fail("sender dropped")),
                }
            }))
        });
        assert!(queue.is_empty());

        task.cancel();
        assert_eq!(queue.len(), 1);
        queue.run_until_idle();
        assert_eq!(now(&task), Some(Err(TaskError::Canceled)));
    }

    #[test]
    fn test_interrupt_and_drop_may_call_back_into_the_task() {
        struct Reentrant {
            slot: Arc<Mutex<Option<Canceller>>>,
        }

        impl Reentrant {
            fn poke(&self) {
                if let Some(c) = self.slot.lock().unwrap().as_ref() {
                    c.cancel();
                }
            }
        }

        impl Stepper<u32> for Reentrant {
            fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step<u32>, TaskError> {
                Ok(Step::Suspended)
            }
            fn interrupt(&mut self, reason: TaskError) -> Result<(), TaskError> {
                self.poke();
                Err(reason)
            }
        }

        impl Drop for Reentrant {
            fn drop(&mut self) {
                self.poke();
            }
        }

        let slot: Arc<Mutex<Option<Canceller>>> = Arc::new(Mutex::new(None));
        let stepper_slot = Arc::clone(&slot);
        let queue = TurnQueue::new();
        let task = spawn_on(&queue, move || {
            Ok(Run::stepper(Reentrant { slot: stepper_slot }))
        });
        *slot.lock().unwrap() = Some(task.canceller());

        task.cancel();
        assert_eq!(now(&task), Some(Err(TaskError::Canceled)));
        assert_eq!(task.state(), TaskState::Failed);
        slot.lock().unwrap().take();
    }

    #[test]
    fn test_adopted_rejection_is_fixed_at_construction() {
        let queue = TurnQueue::new();
        let task: Task<u32> =
            spawn_on(&queue, || Ok(Run::future(async { Err(TaskError::fail("late")) })));
        // The outcome is fixed (adopt this future), even though it has not run yet.
        assert!(task.is_settled());
        assert_eq!(task.state(), TaskState::Finished);
        assert_eq!(task.result().peek(), None);
        assert_eq!(now(&task), Some(Err(TaskError::fail("late"))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_timer_inside_block_takes_few_steps() {
        let task = Task::new(|| {
            Ok(Run::from_async(|_cx| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, TaskError>(1_u32)
            }))
        })
        .unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(task.steps() <= 2, "steps while sleeping: {}", task.steps());

        assert_eq!(task.result().await, Ok(1));
        assert!(task.steps() <= 4, "total steps: {}", task.steps());
    }
}
