//! Task - Run any provider operation in the background
//!
//! Every vendor operation is a single async function. Callers that want to
//! fire several of them concurrently, or to receive the outcome through a
//! callback, wrap the operation with `spawn_call` or `spawn_with_callback`.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::task::JoinHandle;

use crate::provider::{ProviderError, ProviderResult};

/// Handle to an operation running on the tokio runtime.
///
/// Awaiting the handle yields the operation's result. A panicked or aborted
/// task is reported as `ProviderError::Task`.
#[derive(Debug)]
pub struct CallHandle<T> {
    operation: String,
    inner: JoinHandle<ProviderResult<T>>,
}

impl<T> CallHandle<T> {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn abort(&self) {
        self.inner.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Future for CallHandle<T> {
    type Output = ProviderResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.inner).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(e)) => Poll::Ready(Err(ProviderError::Task {
                operation: self.operation.clone(),
                message: e.to_string(),
            })),
        }
    }
}

/// Spawn `future` and return a handle resolving to its result
pub fn spawn_call<F, T>(operation: impl Into<String>, future: F) -> CallHandle<T>
where
    F: Future<Output = ProviderResult<T>> + Send + 'static,
    T: Send + 'static,
{
    let operation = operation.into();
    log::trace!("spawning {}", operation);
    CallHandle {
        operation,
        inner: tokio::spawn(future),
    }
}

/// Spawn `future` and hand its result to `callback` once it completes
pub fn spawn_with_callback<F, T, C>(future: F, callback: C) -> JoinHandle<()>
where
    F: Future<Output = ProviderResult<T>> + Send + 'static,
    T: Send + 'static,
    C: FnOnce(ProviderResult<T>) + Send + 'static,
{
    tokio::spawn(async move {
        let result = future.await;
        callback(result);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn spawn_call_resolves_to_result() {
        let handle = spawn_call("Echo", async { Ok::<_, ProviderError>(42) });
        assert_eq!(handle.operation(), "Echo");
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn spawn_call_propagates_error() {
        let handle = spawn_call("Describe", async {
            Err::<(), _>(ProviderError::not_found("CsKubernetes", "c-1"))
        });
        assert!(handle.await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn aborted_call_reports_task_error() {
        let handle = spawn_call("Sleep", async {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            Ok::<_, ProviderError>(())
        });
        handle.abort();
        let err = handle.await.unwrap_err();
        assert!(matches!(err, ProviderError::Task { ref operation, .. } if operation == "Sleep"));
    }

    #[tokio::test]
    async fn callback_receives_result() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        spawn_with_callback(async { Ok::<_, ProviderError>("done") }, move |result| {
            *sink.lock().unwrap() = Some(result.is_ok());
        })
        .await
        .unwrap();

        assert_eq!(*seen.lock().unwrap(), Some(true));
    }
}
