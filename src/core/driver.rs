//! # Step driver: trampoline and cancellation wiring.
//!
//! Drives one [`Stepper`] to completion, one step per scheduling turn, and owns the
//! task's [`Resolver`].
//!
//! ## Flow
//! ```text
//! start() ──► advance()                     (first step, on the constructor's stack)
//!
//! advance():
//!   ├─► take stepper, state = Stepping, steps += 1
//!   ├─► stepper.step(cx)                    (lock NOT held; panics caught)
//!   │       ├─ Err(e)          ──► state = Failed,   settle(Err(e))
//!   │       ├─ Finished(v)     ──► state = Finished, settle(Ok(v))
//!   │       ├─ Suspended       ──► deliver deferred interrupt (if any)
//!   │       │                      state = Suspended, schedule(advance)   (next turn)
//!   │       └─ Waiting         ──► deliver deferred interrupt (if any)
//!   │                              state = Suspended, schedule only if already woken
//!   └─► return
//!
//! wake (cx.waker()):
//!   ├─ Stepping   ──► remember; the running step reschedules when it returns
//!   └─ Suspended  ──► schedule(advance) unless a step is already queued
//!
//! cancel():
//!   ├─ already requested  ──► discard
//!   ├─ Suspended          ──► take stepper, stepper.interrupt(Canceled), schedule a step
//!   │                          └─ Err(e) ──► state = Failed, settle(Err(e))
//!   ├─ Stepping           ──► defer; delivered when the running step suspends
//!   └─ Finished | Failed  ──► discard (cancel after settlement)
//! ```
//!
//! ## Rules
//! - At most one step job is queued at a time.
//! - User code (`step`, `interrupt`, the stepper's `Drop`) never runs under the state lock.
//! - A terminal state is final: later jobs, wakes and cancels leave the result untouched.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::task::{Context, Wake, Waker};

use crate::core::probe::Probe;
use crate::core::scheduler::SchedulerRef;
use crate::core::settle::{Resolver, Settlement};
use crate::core::{Mode, TaskState};
use crate::error::TaskError;
use crate::tasks::{Step, Stepper, Value};

struct Inner<T> {
    state: TaskState,
    /// `None` while a step or an interrupt is running outside the lock.
    stepper: Option<Box<dyn Stepper<T>>>,
    resolver: Resolver<T>,
    cancel_requested: bool,
    deferred: Option<TaskError>,
    /// A step job is queued.
    scheduled: bool,
    /// A wake (or job) arrived while the stepper was out of the lock.
    woken: bool,
    steps: u32,
}

pub(crate) struct Driver<T> {
    inner: Mutex<Inner<T>>,
    me: Weak<Driver<T>>,
    scheduler: SchedulerRef,
    probe: Probe,
}

impl<T: Send + 'static> Driver<T> {
    pub(crate) fn new(
        stepper: Box<dyn Stepper<T>>,
        resolver: Resolver<T>,
        scheduler: SchedulerRef,
        probe: Probe,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            inner: Mutex::new(Inner {
                state: TaskState::Stepping,
                stepper: Some(stepper),
                resolver,
                cancel_requested: false,
                deferred: None,
                scheduled: false,
                woken: false,
                steps: 0,
            }),
            me: me.clone(),
            scheduler,
            probe,
        })
    }

    /// Runs the first step synchronously.
    pub(crate) fn start(self: &Arc<Self>) {
        self.advance();
    }

    pub(crate) fn state(&self) -> TaskState {
        self.lock().state
    }

    pub(crate) fn steps(&self) -> u32 {
        self.lock().steps
    }

    fn advance(self: &Arc<Self>) {
        let (mut stepper, step_no) = {
            let mut inner = self.lock();
            if inner.state.is_terminal() {
                return;
            }
            inner.scheduled = false;
            let Some(stepper) = inner.stepper.take() else {
                // An interrupt is being delivered; cancel() schedules the next step.
                inner.woken = true;
                return;
            };
            inner.state = TaskState::Stepping;
            inner.woken = false;
            inner.steps += 1;
            (stepper, inner.steps)
        };

        let waker = Waker::from(Arc::clone(self));
        let mut cx = Context::from_waker(&waker);
        let outcome = catch_unwind(AssertUnwindSafe(|| stepper.step(&mut cx)))
            .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)));

        let waiting = match outcome {
            Err(e) => return self.fail(&mut self.lock(), step_no, e),
            Ok(Step::Finished(value)) => return self.finish(&mut self.lock(), step_no, value),
            Ok(Step::Suspended) => false,
            Ok(Step::Waiting) => true,
        };

        let mut interrupted = false;
        let mut inner = loop {
            let mut inner = self.lock();
            let Some(reason) = inner.deferred.take() else {
                break inner;
            };
            drop(inner);
            if let Err(e) = deliver(&mut stepper, reason) {
                return self.fail(&mut self.lock(), step_no, e);
            }
            interrupted = true;
        };

        inner.stepper = Some(stepper);
        inner.state = TaskState::Suspended;
        if !waiting || interrupted || inner.woken {
            inner.woken = false;
            self.schedule_step(&mut inner);
        }
        drop(inner);
        self.probe.suspended(step_no);
    }

    pub(crate) fn cancel(&self) {
        let mut inner = self.lock();
        if inner.cancel_requested {
            drop(inner);
            self.probe.cancel_discarded("already requested");
            return;
        }
        inner.cancel_requested = true;
        let steps = inner.steps;

        match inner.state {
            TaskState::Finished | TaskState::Failed => {
                drop(inner);
                self.probe.cancel_discarded("already settled");
            }
            TaskState::Stepping => {
                inner.deferred = Some(TaskError::Canceled);
                drop(inner);
                self.probe.cancel_requested(steps, true);
            }
            TaskState::Suspended => {
                let Some(mut stepper) = inner.stepper.take() else {
                    inner.deferred = Some(TaskError::Canceled);
                    return;
                };
                inner.state = TaskState::Stepping;
                drop(inner);
                self.probe.cancel_requested(steps, false);

                let delivered = deliver(&mut stepper, TaskError::Canceled);
                let mut inner = self.lock();
                match delivered {
                    Ok(()) => {
                        inner.stepper = Some(stepper);
                        inner.state = TaskState::Suspended;
                        inner.woken = false;
                        self.schedule_step(&mut inner);
                    }
                    // `stepper` outlives the guard, so its drop runs unlocked.
                    Err(e) => self.fail(&mut inner, steps, e),
                }
            }
        }
    }

    /// Queues the next step unless one is already queued.
    fn schedule_step(&self, inner: &mut Inner<T>) {
        if inner.scheduled {
            return;
        }
        if let Some(this) = self.me.upgrade() {
            inner.scheduled = true;
            self.scheduler.schedule(Box::new(move || this.advance()));
        }
    }

    fn finish(&self, inner: &mut Inner<T>, step_no: u32, value: Value<T>) {
        inner.state = TaskState::Finished;
        let adopting = value.is_pending();
        if inner.resolver.settle(Ok(value)) {
            self.probe.resolved(Mode::Stepped, Some(step_no), adopting);
        }
        self.discard_deferred(inner);
    }

    fn fail(&self, inner: &mut Inner<T>, step_no: u32, err: TaskError) {
        inner.state = TaskState::Failed;
        let outcome: Settlement<T> = Err(err.clone());
        if inner.resolver.settle(outcome) {
            self.probe.failed(Mode::Stepped, Some(step_no), &err);
        }
        self.discard_deferred(inner);
    }

    /// A cancel that arrived during the final step never reaches the stepper.
    fn discard_deferred(&self, inner: &mut Inner<T>) {
        if inner.deferred.take().is_some() {
            self.probe.cancel_discarded("already settled");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Send + 'static> Wake for Driver<T> {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let mut inner = self.lock();
        match inner.state {
            TaskState::Stepping => inner.woken = true,
            TaskState::Suspended => self.schedule_step(&mut inner),
            TaskState::Finished | TaskState::Failed => {}
        }
    }
}

/// Calls `interrupt`, treating a panic as an interrupt failure.
fn deliver<T: 'static>(
    stepper: &mut Box<dyn Stepper<T>>,
    reason: TaskError,
) -> Result<(), TaskError> {
    catch_unwind(AssertUnwindSafe(|| stepper.interrupt(reason)))
        .unwrap_or_else(|payload| Err(TaskError::from_panic(payload)))
}
