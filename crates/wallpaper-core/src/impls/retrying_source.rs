//! RetryingSource - wraps any [`PayloadSource`] with a [`RetryPolicy`].

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{FetchError, Record, RetryDecision, RetryPolicy};
use crate::ports::{PayloadSource, Sleeper};

pub struct RetryingSource<S, Z> {
    inner: S,
    policy: RetryPolicy,
    sleeper: Z,
}

impl<S: PayloadSource, Z: Sleeper> RetryingSource<S, Z> {
    pub fn new(inner: S, policy: RetryPolicy, sleeper: Z) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }
}

#[async_trait]
impl<S: PayloadSource, Z: Sleeper> PayloadSource for RetryingSource<S, Z> {
    async fn fetch(&self) -> Result<Record, FetchError> {
        let mut attempts = 0u32;
        let mut slept = Duration::ZERO;
        loop {
            attempts = attempts.saturating_add(1);
            let err = match self.inner.fetch().await {
                Ok(record) => return Ok(record),
                Err(err) => err,
            };

            match self.policy.decide(attempts, slept) {
                RetryDecision::Retry { delay } => {
                    warn!(attempt = attempts, error = %err, ?delay, "fetch failed, retrying");
                    self.sleeper.sleep(delay).await;
                    slept = slept.saturating_add(delay);
                }
                RetryDecision::GiveUp { reason } => {
                    // keep single-attempt errors as they are
                    if attempts == 1 {
                        return Err(err);
                    }
                    warn!(attempts, %reason, "giving up");
                    return Err(FetchError::Exhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
            }
        }
    }
}
