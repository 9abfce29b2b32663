use std::fmt::Display;
use std::time::Duration;

use tracing::warn;

// ============================================================================
// Retry policy: bounded attempts with exponential backoff
// ============================================================================

/// `max_attempts` total calls; after failed attempt `n` (0-indexed) the
/// caller waits `unit * 2^n` before trying again. No wait follows the
/// final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

/// All attempts failed; carries the last error.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: Option<E>,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    /// Delay after failed attempt `attempt` (0-indexed): 1, 2, 4, ... units.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// The waits a fully failing run goes through, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.backoff(attempt))
            .collect()
    }

    /// Run `op` until it succeeds or the attempts run out, sleeping the
    /// backoff between attempts.
    pub fn run<T, E, F>(&self, op: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        self.run_with_sleep(op, std::thread::sleep)
    }

    /// Same as `run`, with the wait between attempts delegated to `sleep`.
    pub fn run_with_sleep<T, E, F, S>(
        &self,
        mut op: F,
        mut sleep: S,
    ) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
        S: FnMut(Duration),
    {
        let mut last_error = None;

        for attempt in 0..self.max_attempts {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        max = self.max_attempts,
                        error = %e,
                        "attempt failed"
                    );
                    last_error = Some(e);
                }
            }

            if attempt + 1 < self.max_attempts {
                let delay = self.backoff(attempt);
                if !delay.is_zero() {
                    sleep(delay);
                }
            }
        }

        Err(RetryExhausted {
            attempts: self.max_attempts,
            last_error,
        })
    }
}
