//! # Settlement channel.
//!
//! A single-assignment channel between a task's driver ([`Resolver`]) and any number of
//! observers ([`TaskResult`]).
//!
//! ```text
//! Resolver::settle(Ok(Ready(v)))    ──► oneshot ──► Shared ──► every TaskResult: Ok(v)
//! Resolver::settle(Ok(Pending(f)))  ──► oneshot ──► Shared awaits f (adoption)
//! Resolver::settle(Err(e))          ──► oneshot ──► Shared ──► every TaskResult: Err(e)
//! Resolver dropped unsettled        ──► oneshot closed ──► Err(Abandoned)
//! ```
//!
//! ## Rules
//! - The first `settle` wins; later calls return `false` and are discarded.
//! - Adoption is performed on the observer side, the first time any clone is polled.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::oneshot;

use crate::error::TaskError;
use crate::tasks::Value;

/// What a resolver hands over: a value to resolve with (or adopt), or a failure.
pub(crate) type Settlement<T> = Result<Value<T>, TaskError>;

/// Write side of the settlement channel.
pub(crate) struct Resolver<T> {
    tx: Option<oneshot::Sender<Settlement<T>>>,
}

impl<T> Resolver<T> {
    /// Settles the channel. Returns `false` if it was already settled.
    pub(crate) fn settle(&mut self, outcome: Settlement<T>) -> bool {
        match self.tx.take() {
            Some(tx) => {
                // All observers gone is still a settlement.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

/// Creates a connected resolver/result pair.
pub(crate) fn channel<T>() -> (Resolver<T>, TaskResult<T>)
where
    T: Clone + Send + Sync + 'static,
{
    let (tx, rx) = oneshot::channel::<Settlement<T>>();
    let fut = async move {
        match rx.await {
            Ok(Ok(Value::Ready(v))) => Ok(v),
            Ok(Ok(Value::Pending(f))) => f.await,
            Ok(Err(e)) => Err(e),
            Err(_closed) => Err(TaskError::Abandoned),
        }
    }
    .boxed();

    (
        Resolver { tx: Some(tx) },
        TaskResult {
            inner: fut.shared(),
        },
    )
}

/// # Read side of a task's settlement channel.
///
/// A cloneable future resolving to `Result<T, TaskError>`. Every clone observes the same
/// settlement.
pub struct TaskResult<T> {
    inner: Shared<BoxFuture<'static, Result<T, TaskError>>>,
}

impl<T> TaskResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Returns the settlement if some clone has already polled it to completion.
    pub fn peek(&self) -> Option<&Result<T, TaskError>> {
        self.inner.peek()
    }
}

impl<T> Clone for TaskResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Future for TaskResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Result<T, TaskError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl<T> fmt::Debug for TaskResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskResult").finish_non_exhaustive()
    }
}
