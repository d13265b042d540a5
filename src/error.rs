//! Error types used by tasklet.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`] — errors raised synchronously while building a task.
//! - [`TaskError`] — failures carried by a task's settlement channel.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::any::Any;

use thiserror::Error;

/// # Errors produced while constructing a task.
///
/// These never travel through [`TaskResult`](crate::TaskResult); they are returned
/// directly from [`TaskBuilder::spawn`](crate::TaskBuilder::spawn) before the runner is invoked.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// No runner was supplied, so there is nothing to invoke.
    #[error("task runner is missing or not invocable")]
    InvalidRunner,

    /// No scheduler was configured and no tokio runtime is available to fall back to.
    #[error("no scheduler configured and no tokio runtime is running")]
    NoScheduler,
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tasklet::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::InvalidRunner.as_label(), "runtime_invalid_runner");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidRunner => "runtime_invalid_runner",
            RuntimeError::NoScheduler => "runtime_no_scheduler",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidRunner => "runner missing".to_string(),
            RuntimeError::NoScheduler => "no scheduler and no tokio runtime".to_string(),
        }
    }
}

/// # Failures delivered through a task's result.
///
/// A runner or a step reports its own failure with [`TaskError::Fail`]; the value is
/// delivered to observers unchanged. The other variants are produced by tasklet itself.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The computation failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The stepper was misused (e.g. stepped after it had already finished).
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The task was interrupted by `cancel()`.
    #[error("task cancelled")]
    Canceled,

    /// The runner or a step panicked.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The settlement channel was dropped before the task settled.
    #[error("task abandoned before settling")]
    Abandoned,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    ///
    /// # Example
    /// ```
    /// use tasklet::TaskError;
    ///
    /// let err = TaskError::fail("OOPS");
    /// assert_eq!(err.to_string(), "execution failed: OOPS");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Builds a [`TaskError::Panicked`] from a payload caught by `catch_unwind`.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        TaskError::Panicked {
            info: panic_message(payload.as_ref()),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use tasklet::TaskError;
    ///
    /// assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Fatal { .. } => "task_fatal",
            TaskError::Canceled => "task_canceled",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Abandoned => "task_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Fatal { error } => format!("fatal: {error}"),
            TaskError::Canceled => "cancelled".to_string(),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Abandoned => "abandoned".to_string(),
        }
    }

    /// Returns `true` when the failure is the cancellation interrupt itself.
    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
