//! # Stepper abstraction.
//!
//! A [`Stepper`] is a computation that advances one suspension point at a time and can
//! receive an injected interrupt. The driver calls [`Stepper::step`] once per scheduling
//! turn until it reports [`Step::Finished`] or fails.
//!
//! ## Contract
//! ```text
//! step(cx) ──► Ok(Suspended)        → driver schedules the next step on a later turn
//!          ──► Ok(Waiting)          → next step runs once cx.waker() is woken
//!          ──► Ok(Finished(value))  → driver settles the result, stepper is dropped
//!          ──► Err(e)               → driver rejects the result, stepper is dropped
//!
//! interrupt(reason) (only while suspended or waiting)
//!          ──► Ok(())  → a step is scheduled; it observes `reason` at its suspension point
//!          ──► Err(e)  → interrupt could not be delivered; `e` rejects the result
//! ```
//!
//! ## Example: an explicit state machine
//! ```rust
//! use std::task::Context;
//! use tasklet::{Step, Stepper, TaskError, Value};
//!
//! /// Suspends `remaining` times, then finishes with 42.
//! struct Countdown {
//!     remaining: u32,
//!     interrupted: Option<TaskError>,
//! }
//!
//! impl Stepper<u32> for Countdown {
//!     fn step(&mut self, _cx: &mut Context<'_>) -> Result<Step<u32>, TaskError> {
//!         if let Some(reason) = self.interrupted.take() {
//!             return Err(reason);
//!         }
//!         if self.remaining == 0 {
//!             return Ok(Step::Finished(Value::Ready(42)));
//!         }
//!         self.remaining -= 1;
//!         Ok(Step::Suspended)
//!     }
//!
//!     fn interrupt(&mut self, reason: TaskError) -> Result<(), TaskError> {
//!         self.interrupted = Some(reason);
//!         Ok(())
//!     }
//! }
//! ```

use std::future::Future;
use std::task::Context;

use futures::future::BoxFuture;

use crate::error::TaskError;

/// Boxed future resolving to a task outcome.
pub type BoxResultFuture<T> = BoxFuture<'static, Result<T, TaskError>>;

/// A final value: either available now or a future whose settlement is adopted.
pub enum Value<T> {
    /// Plain value.
    Ready(T),
    /// Future adopted transparently: its value or failure becomes the task's.
    Pending(BoxResultFuture<T>),
}

impl<T> Value<T> {
    /// Wraps a future so its eventual settlement is adopted.
    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Value::Pending(Box::pin(fut))
    }

    /// Returns `true` for [`Value::Pending`].
    pub fn is_pending(&self) -> bool {
        matches!(self, Value::Pending(_))
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Ready(v) => f.debug_tuple("Ready").field(v).finish(),
            Value::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Outcome of a single [`Stepper::step`] call.
#[derive(Debug)]
pub enum Step<T> {
    /// The computation reached a suspension point and wants to be stepped again later.
    Suspended,
    /// The computation is blocked on something that will wake the step's waker.
    ///
    /// No step is scheduled until that happens (or an interrupt is injected).
    Waiting,
    /// The computation completed.
    Finished(Value<T>),
}

/// # Step-wise suspendable computation.
///
/// Implementations are driven by exactly one driver; `step` and `interrupt` are never
/// called concurrently for the same stepper. Neither is called with the driver's state
/// locked, so both may call back into the task (e.g. [`Canceller::cancel`](crate::Canceller)).
pub trait Stepper<T>: Send + 'static {
    /// Advances the computation to its next suspension point (or to completion).
    ///
    /// `cx` carries a waker that schedules the next step; it only matters when returning
    /// [`Step::Waiting`].
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step<T>, TaskError>;

    /// Injects `reason` at the current suspension point.
    ///
    /// The next [`step`](Stepper::step) must either fail with `reason` (or a failure derived
    /// from it) or finish/fail differently if the computation handled the interrupt.
    /// Fails when the computation is no longer suspended.
    fn interrupt(&mut self, reason: TaskError) -> Result<(), TaskError>;
}
