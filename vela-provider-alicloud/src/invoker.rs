//! Invoker - Retry vendor calls on transient error codes

use std::future::Future;
use std::time::Duration;

use crate::error::{CLIENT_FAILURE, SERVICE_UNAVAILABLE, THROTTLING, VendorError};

/// Retry rule for one error code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catcher {
    pub reason: &'static str,
    /// Total attempts allowed while this code keeps coming back
    pub retry_count: u32,
    pub retry_wait: Duration,
}

pub const CLIENT_ERROR_CATCHER: Catcher = Catcher {
    reason: CLIENT_FAILURE,
    retry_count: 10,
    retry_wait: Duration::from_secs(5),
};

pub const SERVICE_BUSY_CATCHER: Catcher = Catcher {
    reason: SERVICE_UNAVAILABLE,
    retry_count: 10,
    retry_wait: Duration::from_secs(5),
};

pub const THROTTLING_CATCHER: Catcher = Catcher {
    reason: THROTTLING,
    retry_count: 50,
    retry_wait: Duration::from_secs(2),
};

/// Runs a vendor call, retrying while it fails with a caught error code
#[derive(Debug, Clone)]
pub struct Invoker {
    catchers: Vec<Catcher>,
}

impl Default for Invoker {
    fn default() -> Self {
        Self {
            catchers: vec![CLIENT_ERROR_CATCHER, SERVICE_BUSY_CATCHER, THROTTLING_CATCHER],
        }
    }
}

impl Invoker {
    /// Invoker that never retries
    pub fn none() -> Self {
        Self {
            catchers: Vec::new(),
        }
    }

    pub fn with_catcher(mut self, catcher: Catcher) -> Self {
        self.catchers.retain(|c| c.reason != catcher.reason);
        self.catchers.push(catcher);
        self
    }

    pub async fn run<F, Fut, T>(&self, mut call: F) -> Result<T, VendorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, VendorError>>,
    {
        let mut remaining: Vec<u32> = self.catchers.iter().map(|c| c.retry_count).collect();

        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let Some(index) = self.catchers.iter().position(|c| err.code() == c.reason) else {
                return Err(err);
            };

            remaining[index] = remaining[index].saturating_sub(1);
            if remaining[index] == 0 {
                return Err(VendorError::RetryExhausted {
                    last: Box::new(err),
                });
            }

            let wait = self.catchers[index].retry_wait;
            log::warn!("{}, retrying in {:?}", err, wait);
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retries_throttling_until_success() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = Invoker::default()
            .run(move || async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(VendorError::service(THROTTLING, "Request was denied"))
                } else {
                    Ok("c-1")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "c-1");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let err = Invoker::default()
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(VendorError::service("InvalidParameter", "bad id"))
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "InvalidParameter");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_wrap_last_error() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let invoker = Invoker::none().with_catcher(Catcher {
            reason: SERVICE_UNAVAILABLE,
            retry_count: 3,
            retry_wait: Duration::from_secs(1),
        });

        let start = tokio::time::Instant::now();
        let err = invoker
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(VendorError::service(SERVICE_UNAVAILABLE, "busy"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, VendorError::RetryExhausted { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn client_failures_are_retried() {
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let result = Invoker::default()
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(VendorError::Client("connection reset".to_string()))
                } else {
                    Ok(())
                }
            })
            .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
