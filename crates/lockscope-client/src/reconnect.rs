//! Bounded reconnect supervisor.
//!
//! The store only reports failures; this task decides what to do about them.
//! It watches store updates and, after a failed connect or a lost
//! connection, schedules up to `max_retries` fresh connects separated by a
//! fixed delay. After that it gives up and the store stays `Disconnected`
//! until someone calls [`StoreHandle::connect`] again.
//!
//! A scheduled retry carries the generation that failed. Anything newer
//! (manual connect, disconnect) cancels it here, and the store suppresses it
//! anyway if it slips through.

use std::pin::Pin;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Sleep;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::actor::{StoreError, StoreHandle};
use crate::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use crate::subscriptions::{Subscription, UpdateCause};

/// How hard to try before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Running supervisor. Dropping it stops supervision.
pub struct ReconnectTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
    _guard: DropGuard,
}

impl ReconnectTask {
    /// Stop supervising and wait for the task to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.join.await;
    }
}

/// Subscribe to `handle` and start supervising reconnects.
pub async fn spawn_reconnector(
    handle: StoreHandle,
    policy: ReconnectPolicy,
) -> Result<ReconnectTask, StoreError> {
    let subscription = handle.subscribe().await?;
    let cancel = CancellationToken::new();
    let join = tokio::spawn(supervise(handle, policy, subscription, cancel.clone()));
    Ok(ReconnectTask {
        _guard: cancel.clone().drop_guard(),
        cancel,
        join,
    })
}

struct ScheduledRetry {
    generation: u64,
    sleep: Pin<Box<Sleep>>,
}

async fn supervise(
    handle: StoreHandle,
    policy: ReconnectPolicy,
    mut subscription: Subscription,
    cancel: CancellationToken,
) {
    let mut attempts: u32 = 0;
    let mut scheduled: Option<ScheduledRetry> = None;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            update = subscription.recv() => {
                let Some(update) = update else { break };
                match update.cause {
                    UpdateCause::ConnectStarted { manual: true } | UpdateCause::Connected => {
                        attempts = 0;
                        scheduled = None;
                    }
                    UpdateCause::ConnectStarted { manual: false } | UpdateCause::Snapshot => {}
                    UpdateCause::Disconnected => {
                        scheduled = None;
                    }
                    UpdateCause::ConnectionLost { .. } => {
                        attempts = 0;
                        scheduled = schedule_retry(attempts, &policy, update.generation);
                    }
                    UpdateCause::ConnectFailed { .. } => {
                        scheduled = schedule_retry(attempts, &policy, update.generation);
                    }
                }
            }
            generation = next_retry(&mut scheduled) => {
                scheduled = None;
                attempts += 1;
                info!(attempt = attempts, max = policy.max_retries, "reconnecting to state stream");
                if handle.retry(generation).is_err() {
                    break;
                }
            }
        }
    }

    debug!("reconnect supervisor stopped");
}

/// Schedule the next retry for a failed `generation`, unless the budget is spent.
fn schedule_retry(attempts: u32, policy: &ReconnectPolicy, generation: u64) -> Option<ScheduledRetry> {
    if attempts >= policy.max_retries {
        warn!(attempts, "giving up on state stream; waiting for manual reconnect");
        return None;
    }
    debug!(generation, delay = ?policy.delay, "scheduling reconnect");
    Some(ScheduledRetry {
        generation,
        sleep: Box::pin(tokio::time::sleep(policy.delay)),
    })
}

/// Wait for the scheduled retry to come due, or never if none is scheduled.
async fn next_retry(scheduled: &mut Option<ScheduledRetry>) -> u64 {
    match scheduled {
        Some(retry) => {
            retry.sleep.as_mut().await;
            retry.generation
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(3));
    }
}
