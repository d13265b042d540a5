//! # tasklet
//!
//! **Tasklet** is a small cancellable-task primitive for Rust.
//!
//! A [`Task`] wraps a user-supplied runner. The runner is invoked once, synchronously, and
//! what it returns decides how the task executes: a plain value or future settles the task
//! immediately, while a [`Stepper`] is driven one step per scheduling turn and can be
//! interrupted by [`Task::cancel`]. Every outcome reaches observers through one settlement
//! channel, [`Task::result`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!                       ┌──────────────────────┐
//!                       │  runner: FnOnce()    │
//!                       │  -> Result<Run<T>>   │
//!                       └──────────┬───────────┘
//!                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Task<T>                                                          │
//! │  - TaskResult<T> (single settlement channel, cloneable)           │
//! │  - Canceller / cancel()                                           │
//! └──────┬───────────────────────────────────────────────┬────────────┘
//!        │ Run::Value / Err                              │ Run::Stepper
//!        ▼                                               ▼
//!   settle immediately                         ┌──────────────────────┐
//!   (adopt a future if given)                  │  Driver (trampoline) │
//!                                              │  step ─► Suspended ──┼──► Schedule
//!                                              │  cancel ─► interrupt │    (next turn)
//!                                              └──────────┬───────────┘
//!                                                         │ publish(Event)
//!                                                         ▼
//!                                   Bus ──► Monitor listener ──► SubscriberSet
//!                                                                ┌────┼────┐
//!                                                                ▼    ▼    ▼
//!                                                             sub1  sub2  subN
//! ```
//!
//! ### Lifecycle (stepped mode)
//! ```text
//! Task::new(runner) ──► runner() ──► Run::Stepper(s)
//!
//! step 1 (synchronously, inside construction)
//! loop {
//!   ├─► s.step()
//!   │       ├─ Suspended   ──► schedule next step (never inline)
//!   │       ├─ Waiting     ──► schedule next step when the step's waker fires
//!   │       ├─ Finished(v) ──► result = Ok(v), exit
//!   │       └─ Err(e)      ──► result = Err(e), exit
//!   │
//!   └─ cancel() while suspended:
//!        s.interrupt(Canceled) ──► next step observes Err(Canceled) at its suspension point
//!                                  (cleanup may handle it and still finish)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                      |
//! |-------------------|----------------------------------------------------------------|-----------------------------------------|
//! | **Tasks**         | Launch runners, await or cancel them.                          | [`Task`], [`TaskBuilder`], [`Canceller`]|
//! | **Computations**  | Values, futures and suspendable step-wise computations.        | [`Run`], [`Stepper`], [`AsyncStepper`]  |
//! | **Scheduling**    | Next-turn deferral on tokio or a manual turn queue.            | [`Schedule`], [`TurnQueue`]             |
//! | **Subscriber API**| Hook into task lifecycle events (logging, metrics, custom).    | [`Subscribe`], [`Monitor`]              |
//! | **Errors**        | Typed errors for construction and task outcomes.               | [`TaskError`], [`RuntimeError`]         |
//! | **Configuration** | Event bus settings.                                            | [`Config`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use tasklet::{Run, StepContext, Task, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Counts forever until cancelled.
//!     let task: Task<()> = Task::new(|| {
//!         Ok(Run::from_async(|cx: StepContext| async move {
//!             let mut ticks = 0_u64;
//!             while cx.suspend().await.is_ok() {
//!                 ticks += 1;
//!             }
//!             println!("stopped after {ticks} ticks");
//!             Err::<(), _>(TaskError::Canceled)
//!         }))
//!     })?;
//!
//!     tokio::task::yield_now().await;
//!     task.cancel();
//!     assert_eq!(task.await, Err(TaskError::Canceled));
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use core::{
    Canceller, Config, Job, Mode, Monitor, Schedule, SchedulerRef, Task, TaskBuilder, TaskResult,
    TaskState, TokioScheduler, TurnQueue,
};
pub use error::{RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{AsyncStepper, BoxResultFuture, Run, Step, StepContext, Stepper, Suspend, Value};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
