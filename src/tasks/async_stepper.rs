//! # Async-block stepper (`AsyncStepper`)
//!
//! [`AsyncStepper`] turns an `async` block into a [`Stepper`]: every step polls the
//! future exactly once. The block suspends by awaiting [`StepContext::suspend`], which is
//! also where an injected interrupt surfaces as `Err(reason)`.
//!
//! ## Semantics
//! - The future is created lazily by the caller but not polled until the first step.
//! - `Poll::Pending` from `suspend().await` is reported as [`Step::Suspended`]: the next
//!   step runs on the next turn.
//! - `Poll::Pending` from any other await point (timers, channels, I/O) is reported as
//!   [`Step::Waiting`]: the future holds the step's waker and the next step runs when it
//!   is woken.
//! - An interrupt is delivered once: the first `suspend().await` reached after it returns
//!   `Err(reason)`. Propagating it with `?` is the normal outcome; handling it and carrying
//!   on is how cleanup intercepts cancellation.
//! - The context's [`CancellationToken`] is cancelled on interrupt, so the block can
//!   `select!` on it while awaiting other futures.
//!
//! ## Example
//! ```rust
//! use tasklet::{Run, StepContext, TaskError};
//!
//! let run: Run<u32> = Run::from_async(|cx: StepContext| async move {
//!     cx.suspend().await?;
//!     Ok::<_, TaskError>(42)
//! });
//! assert!(run.is_stepper());
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::stepper::{BoxResultFuture, Step, Stepper, Value};

/// Handle given to an async block driven by [`AsyncStepper`].
#[derive(Clone, Debug)]
pub struct StepContext {
    interrupt: Arc<Mutex<Option<TaskError>>>,
    /// Set when the last poll stopped at `suspend().await`.
    parked: Arc<AtomicBool>,
    token: CancellationToken,
}

impl StepContext {
    fn new() -> Self {
        Self {
            interrupt: Arc::new(Mutex::new(None)),
            parked: Arc::new(AtomicBool::new(false)),
            token: CancellationToken::new(),
        }
    }

    /// Returns a suspension point.
    ///
    /// Resolves to `Ok(())` on the step after the one that reached it, or to `Err(reason)`
    /// once an interrupt has been injected.
    pub fn suspend(&self) -> Suspend {
        Suspend {
            cx: self.clone(),
            reached: false,
        }
    }

    /// Token cancelled when the task is interrupted.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Returns `true` once an interrupt has been injected.
    pub fn is_interrupted(&self) -> bool {
        self.token.is_cancelled()
    }

    fn deliver(&self, reason: TaskError) {
        *self.interrupt.lock().unwrap_or_else(PoisonError::into_inner) = Some(reason);
        self.token.cancel();
    }

    fn take_interrupt(&self) -> Option<TaskError> {
        self.interrupt
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Future returned by [`StepContext::suspend`].
#[must_use = "suspension points do nothing unless awaited"]
#[derive(Debug)]
pub struct Suspend {
    cx: StepContext,
    reached: bool,
}

impl Future for Suspend {
    type Output = Result<(), TaskError>;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(reason) = self.cx.take_interrupt() {
            return Poll::Ready(Err(reason));
        }
        if self.reached {
            return Poll::Ready(Ok(()));
        }
        self.reached = true;
        self.cx.parked.store(true, Ordering::Release);
        Poll::Pending
    }
}

/// Stepper backed by an async block.
pub struct AsyncStepper<T> {
    fut: Option<BoxResultFuture<T>>,
    cx: StepContext,
}

impl<T: Send + 'static> AsyncStepper<T> {
    /// Builds the future with a fresh [`StepContext`]; it is not polled until the first step.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(StepContext) -> Fut,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let cx = StepContext::new();
        let fut = f(cx.clone());
        Self {
            fut: Some(Box::pin(fut)),
            cx,
        }
    }

    /// Returns `true` once the future has completed.
    pub fn is_done(&self) -> bool {
        self.fut.is_none()
    }
}

impl<T: Send + 'static> Stepper<T> for AsyncStepper<T> {
    fn step(&mut self, cx: &mut Context<'_>) -> Result<Step<T>, TaskError> {
        let Some(fut) = self.fut.as_mut() else {
            return Err(TaskError::Fatal {
                error: "stepper already finished".to_string(),
            });
        };

        self.cx.parked.store(false, Ordering::Release);
        match fut.as_mut().poll(cx) {
            Poll::Pending if self.cx.parked.swap(false, Ordering::AcqRel) => {
                Ok(Step::Suspended)
            }
            Poll::Pending => Ok(Step::Waiting),
            Poll::Ready(res) => {
                self.fut = None;
                res.map(|v| Step::Finished(Value::Ready(v)))
            }
        }
    }

    fn interrupt(&mut self, reason: TaskError) -> Result<(), TaskError> {
        if self.fut.is_none() {
            return Err(reason);
        }
        self.cx.deliver(reason);
        Ok(())
    }
}
