//! # Computation abstractions.
//!
//! This module provides what a runner can hand to a task:
//! - [`Run`] - runner output selecting immediate or stepped mode
//! - [`Value`] - a plain value or a future to adopt
//! - [`Stepper`] / [`Step`] - step-wise suspendable computation
//! - [`AsyncStepper`] / [`StepContext`] - stepper backed by an `async` block

mod async_stepper;
mod run;
mod stepper;

pub use async_stepper::{AsyncStepper, StepContext, Suspend};
pub use run::Run;
pub use stepper::{BoxResultFuture, Step, Stepper, Value};
