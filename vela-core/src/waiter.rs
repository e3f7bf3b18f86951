//! Waiter - Poll a describer until the observed status converges
//!
//! Status changes of managed cloud resources are asynchronous and the vendor
//! APIs offer no notification, so convergence is observed by polling at a
//! fixed interval against a wall-clock deadline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::describe::Describer;
use crate::provider::{ProviderError, ProviderResult};
use crate::snapshot::Snapshot;
use crate::status::Status;

/// Default interval between two polls (5 seconds)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Timeout applied when the caller passes a zero budget (2 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Status the caller waits for, and the statuses that make it unreachable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitTarget {
    pub status: Status,
    #[serde(default)]
    pub fail_states: Vec<Status>,
}

impl WaitTarget {
    pub fn new(status: impl Into<Status>) -> Self {
        Self {
            status: status.into(),
            fail_states: Vec::new(),
        }
    }

    pub fn with_fail_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Status>,
    {
        self.fail_states = states.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_fail_state(&self, status: &Status) -> bool {
        self.fail_states.iter().any(|s| s.matches(status))
    }
}

/// Polling behaviour shared by all waits of one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiterConfig {
    pub poll_interval: Duration,
    pub default_timeout: Duration,
    /// Log every observed snapshot payload
    pub debug: bool,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_timeout: DEFAULT_TIMEOUT,
            debug: false,
        }
    }
}

/// Deadline `timeout` from now. `None` when it lies beyond what the clock
/// can represent, in which case the wait never expires.
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

fn is_past(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

/// Drives a `Describer` until a target status, a fail state, or a deadline
#[derive(Debug, Clone, Default)]
pub struct Waiter {
    config: WaiterConfig,
}

impl Waiter {
    pub fn new(config: WaiterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WaiterConfig {
        &self.config
    }

    fn effective_timeout(&self, timeout: Duration) -> Duration {
        if timeout.is_zero() {
            self.config.default_timeout
        } else {
            timeout
        }
    }

    fn trace<T: std::fmt::Debug>(&self, kind: &str, id: &str, snapshot: &Snapshot<T>) {
        if self.config.debug {
            log::debug!("{} {} responded with {:?}", kind, id, snapshot);
        }
    }

    /// Wait until the resource reports `target.status`.
    ///
    /// NotFound while waiting for `Deleted` is success. NotFound for any other
    /// target keeps polling. Transport errors and fail states end the wait
    /// immediately.
    pub async fn wait_for<D>(
        &self,
        describer: &D,
        id: &str,
        target: &WaitTarget,
        timeout: Duration,
    ) -> ProviderResult<()>
    where
        D: Describer + ?Sized,
    {
        let timeout = self.effective_timeout(timeout);
        let deadline = deadline_after(timeout);
        let mut last: Option<(String, Status)>;

        loop {
            match describer.describe(id).await {
                Ok(snapshot) => {
                    self.trace(describer.kind(), id, &snapshot);
                    let status = snapshot.status();
                    if target.is_fail_state(status) {
                        return Err(ProviderError::UnreachableTargetStatus {
                            id: id.to_string(),
                            status: status.clone(),
                        });
                    }
                    if status.matches(&target.status) {
                        return Ok(());
                    }
                    log::debug!(
                        "{} {} is {}, waiting for {}",
                        describer.kind(),
                        id,
                        status,
                        target.status
                    );
                    last = Some((snapshot.identifier().to_string(), status.clone()));
                }
                Err(e) if e.is_not_found() => {
                    if target.status.is_deleted() {
                        return Ok(());
                    }
                    log::debug!("{} {} is not visible yet", describer.kind(), id);
                    last = None;
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(self.config.poll_interval).await;

            if is_past(deadline) {
                let (last_identifier, last_status) = last.unzip();
                return Err(ProviderError::TimedOut {
                    id: id.to_string(),
                    target: target.status.clone(),
                    timeout,
                    last_identifier,
                    last_status,
                });
            }
        }
    }

    /// Wait until the resource exists, whatever its status.
    ///
    /// With `expect` set to `Deleted` the wait is inverted: it succeeds once
    /// the resource is reported as not found.
    pub async fn wait_for_existence<D>(
        &self,
        describer: &D,
        id: &str,
        expect: &Status,
        timeout: Duration,
    ) -> ProviderResult<()>
    where
        D: Describer + ?Sized,
    {
        let timeout = self.effective_timeout(timeout);
        let deadline = deadline_after(timeout);
        let mut last: Option<(String, Status)>;

        loop {
            match describer.describe(id).await {
                Ok(snapshot) => {
                    self.trace(describer.kind(), id, &snapshot);
                    if !expect.is_deleted() {
                        return Ok(());
                    }
                    last = Some((snapshot.identifier().to_string(), snapshot.status().clone()));
                }
                Err(e) if e.is_not_found() => {
                    if expect.is_deleted() {
                        return Ok(());
                    }
                    last = None;
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(self.config.poll_interval).await;

            if is_past(deadline) {
                let (last_identifier, last_status) = last.unzip();
                return Err(ProviderError::TimedOut {
                    id: id.to_string(),
                    target: expect.clone(),
                    timeout,
                    last_identifier,
                    last_status,
                });
            }
        }
    }

    /// Read the resource once for an external state-change loop.
    ///
    /// Returns `None` when the resource is not found, and
    /// `UnreachableTargetStatus` when it reports one of `fail_states`.
    pub async fn refresh<D>(
        &self,
        describer: &D,
        id: &str,
        fail_states: &[Status],
    ) -> ProviderResult<Option<Snapshot<D::Details>>>
    where
        D: Describer + ?Sized,
    {
        let snapshot = match describer.describe(id).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        self.trace(describer.kind(), id, &snapshot);

        if fail_states.iter().any(|s| s.matches(snapshot.status())) {
            return Err(ProviderError::UnreachableTargetStatus {
                id: id.to_string(),
                status: snapshot.status().clone(),
            });
        }
        Ok(Some(snapshot))
    }
}
