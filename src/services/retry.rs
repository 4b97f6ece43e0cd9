// src/services/retry.rs
use std::time::Duration;

use crate::error::{GenerationError, RetryError};
use crate::services::generator::TextGenerator;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total upstream calls allowed, the first one included.
    pub max_attempts: u32,
    pub initial_wait: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_wait: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Pulls values that would stall or flatten the backoff back into range:
    /// at least one attempt, a non-zero first wait, and a growing wait.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let initial_wait = if self.initial_wait.is_zero() {
            tracing::warn!(default = ?defaults.initial_wait, "retry initial wait must be positive, using default");
            defaults.initial_wait
        } else {
            self.initial_wait
        };
        let multiplier = if self.multiplier < 2 {
            tracing::warn!(multiplier = self.multiplier, default = defaults.multiplier, "retry multiplier must be at least 2, using default");
            defaults.multiplier
        } else {
            self.multiplier
        };

        Self { max_attempts: self.max_attempts.max(1), initial_wait, multiplier }
    }
}

/// Bookkeeping for one call of [`generate_with_retry`]. Never shared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryState {
    pub attempt_count: u32,
    pub wait: Duration,
}

impl RetryState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self { attempt_count: 0, wait: policy.initial_wait }
    }

    /// Wait to apply before the next attempt, or `None` once the budget is spent.
    /// Advances the wait for the attempt after that.
    pub fn next_backoff(&mut self, policy: &RetryPolicy) -> Option<Duration> {
        if self.attempt_count >= policy.max_attempts {
            return None;
        }
        let wait = self.wait;
        self.wait = self.wait.saturating_mul(policy.multiplier);
        Some(wait)
    }
}

/// Calls the upstream until it answers, retrying overloads with exponential
/// backoff. Any other failure ends the loop at once.
pub async fn generate_with_retry(
    generator: &dyn TextGenerator,
    prompt: &str,
    policy: &RetryPolicy,
) -> Result<String, RetryError> {
    let mut state = RetryState::new(policy);

    loop {
        state.attempt_count += 1;

        let err = match generator.generate(prompt).await {
            Ok(reply) => {
                if state.attempt_count > 1 {
                    tracing::info!(attempts = state.attempt_count, "upstream recovered after retry");
                }
                return Ok(reply);
            }
            Err(err) => err,
        };

        if !err.is_overloaded() {
            tracing::warn!(attempt = state.attempt_count, error = %err, "non-retryable upstream error");
            return Err(RetryError::Fatal { attempts: state.attempt_count, source: err });
        }

        match state.next_backoff(policy) {
            Some(wait) => {
                tracing::warn!(
                    attempt = state.attempt_count,
                    max_attempts = policy.max_attempts,
                    wait_ms = wait.as_millis() as u64,
                    error = %err,
                    "upstream overloaded, backing off"
                );
                tokio::time::sleep(wait).await;
            }
            None => return Err(exhausted(state.attempt_count, err)),
        }
    }
}

fn exhausted(attempts: u32, last: GenerationError) -> RetryError {
    tracing::warn!(attempts, error = %last, "giving up on overloaded upstream");
    RetryError::Exhausted { attempts, last }
}
