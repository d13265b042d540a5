//! # Runner output (`Run`)
//!
//! A runner is a `FnOnce() -> Result<Run<T>, TaskError>`. What it returns decides how the
//! task executes:
//!
//! ```text
//! Ok(Run::Value(Ready(v)))    ─► immediate: result resolves with v
//! Ok(Run::Value(Pending(f)))  ─► immediate: result adopts f
//! Err(e)                      ─► immediate: result rejects with e
//! Ok(Run::Stepper(s))         ─► stepped:   driver steps s, cancel() interrupts it
//! ```

use std::fmt;
use std::future::Future;

use crate::error::TaskError;
use crate::tasks::async_stepper::{AsyncStepper, StepContext};
use crate::tasks::stepper::{Stepper, Value};

/// What a runner produced.
pub enum Run<T> {
    /// Plain value or future; executed in immediate mode.
    Value(Value<T>),
    /// Suspendable computation; executed in stepped mode.
    Stepper(Box<dyn Stepper<T>>),
}

impl<T> Run<T> {
    /// Plain value.
    pub fn value(v: T) -> Self {
        Run::Value(Value::Ready(v))
    }

    /// Future whose settlement is adopted.
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Run::Value(Value::pending(fut))
    }

    /// Custom stepper.
    pub fn stepper<S>(stepper: S) -> Self
    where
        S: Stepper<T>,
    {
        Run::Stepper(Box::new(stepper))
    }

    /// Returns `true` when the task will be stepped.
    pub fn is_stepper(&self) -> bool {
        matches!(self, Run::Stepper(_))
    }
}

impl<T: Send + 'static> Run<T> {
    /// Async block driven one poll per step (see [`AsyncStepper`]).
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce(StepContext) -> Fut,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        Run::stepper(AsyncStepper::new(f))
    }
}

impl<T> From<Value<T>> for Run<T> {
    fn from(v: Value<T>) -> Self {
        Run::Value(v)
    }
}

impl<T> fmt::Debug for Run<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Run::Value(Value::Ready(_)) => f.write_str("Run::Value(Ready)"),
            Run::Value(Value::Pending(_)) => f.write_str("Run::Value(Pending)"),
            Run::Stepper(_) => f.write_str("Run::Stepper"),
        }
    }
}
