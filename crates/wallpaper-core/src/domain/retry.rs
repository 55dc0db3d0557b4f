//! Retry policy: how many times the payload fetch is attempted and how long
//! to wait in between.
//!
//! The policy is a pure value. Sleeping happens in
//! [`RetryingSource`](crate::impls::RetryingSource) through an injected
//! [`Sleeper`](crate::ports::Sleeper).

use std::time::Duration;

/// What to do after a failed attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    /// Try again after `delay`.
    Retry { delay: Duration },

    /// Stop and surface the last error.
    GiveUp { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// `None` = unlimited attempts.
    pub max_attempts: Option<u32>,

    /// Cap on the cumulative time spent sleeping between attempts.
    pub max_total_delay: Option<Duration>,

    /// Delay before the first retry.
    pub base_delay: Duration,

    /// `1.0` gives a fixed delay.
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Single attempt, any failure is reported to the caller.
    pub fn fail_fast() -> Self {
        Self {
            max_attempts: Some(1),
            max_total_delay: None,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Up to `max_attempts` attempts with a fixed `delay`.
    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            max_total_delay: None,
            base_delay: delay,
            multiplier: 1.0,
        }
    }

    /// Retry with a fixed `delay` until a payload arrives.
    ///
    /// There is no cancellation path: a permanently broken endpoint blocks
    /// the run forever.
    pub fn forever(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            max_total_delay: None,
            base_delay: delay,
            multiplier: 1.0,
        }
    }

    pub fn with_max_total_delay(mut self, cap: Duration) -> Self {
        self.max_total_delay = Some(cap);
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay before the retry that follows attempt number `attempts` (1-indexed).
    ///
    /// `base_delay * multiplier^(attempts - 1)`
    pub fn next_delay(&self, attempts: u32) -> Duration {
        let exp = attempts.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exp);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Decide after `attempts` failed attempts, having already slept `slept`.
    pub fn decide(&self, attempts: u32, slept: Duration) -> RetryDecision {
        if let Some(max) = self.max_attempts
            && attempts >= max
        {
            return RetryDecision::GiveUp {
                reason: format!("max attempts reached: {attempts}/{max}"),
            };
        }

        let delay = self.next_delay(attempts);
        if let Some(cap) = self.max_total_delay
            && slept.saturating_add(delay) > cap
        {
            return RetryDecision::GiveUp {
                reason: format!("retry budget of {cap:?} exhausted after {slept:?}"),
            };
        }

        RetryDecision::Retry { delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fail_fast()
    }
}
