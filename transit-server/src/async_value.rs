//! Eagerly started, single-assignment async values.
//!
//! An [`AsyncValue`] spawns its computation on the tokio runtime as soon as
//! it is created. Readers block (asynchronously) in
//! [`AsyncValue::wait_and_get`] until the value is resolved; every reader
//! gets the same shared result. There is no cancellation: dropping the
//! handle detaches the task, which runs to completion.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// The task computing an async value panicked or was aborted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("async computation failed: {message}")]
pub struct TaskFailed {
    message: String,
}

impl From<tokio::task::JoinError> for TaskFailed {
    fn from(err: tokio::task::JoinError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

type SharedResult<T, E> = Shared<BoxFuture<'static, Result<Arc<T>, E>>>;

/// A value computed in the background, resolved exactly once.
///
/// # Examples
///
/// ```
/// use transit_server::async_value::{AsyncValue, TaskFailed};
///
/// # #[tokio::main]
/// # async fn main() {
/// let value: AsyncValue<u32> = AsyncValue::spawn(async { Ok::<_, TaskFailed>(6 * 7) });
/// assert_eq!(*value.wait_and_get().await.unwrap(), 42);
/// # }
/// ```
pub struct AsyncValue<T, E = TaskFailed> {
    inner: SharedResult<T, E>,
}

impl<T, E> AsyncValue<T, E>
where
    T: Send + Sync + 'static,
    E: From<TaskFailed> + Clone + Send + Sync + 'static,
{
    /// Start computing `fut` now, on the current tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        let inner = handle
            .map(|joined| match joined {
                Ok(result) => result.map(Arc::new),
                Err(join_err) => Err(E::from(TaskFailed::from(join_err))),
            })
            .boxed()
            .shared();

        Self { inner }
    }

    /// An already resolved value.
    pub fn ready(value: T) -> Self {
        let value = Arc::new(value);
        Self {
            inner: futures::future::ready(Ok(value)).boxed().shared(),
        }
    }

    /// Wait for the value and return it.
    pub async fn wait_and_get(&self) -> Result<Arc<T>, E> {
        self.inner.clone().await
    }

    /// The value, if a reader has already seen it resolved.
    pub fn peek(&self) -> Option<Result<Arc<T>, E>> {
        self.inner.peek().cloned()
    }
}

impl<T, E> Clone for AsyncValue<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E: Clone> fmt::Debug for AsyncValue<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncValue")
            .field("resolved", &self.inner.peek().is_some())
            .finish()
    }
}
