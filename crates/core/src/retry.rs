//! Bounded retry-with-backoff policy.
//!
//! Shared by every call site that waits on something: extraction result
//! polling (fixed one-second interval, 30 attempts) and progress stream
//! reconnects (exponential backoff). The policy only computes delays; the
//! async loop that sleeps between attempts lives with the caller.

use std::time::Duration;

/// Tunable parameters for a bounded retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure. `1.0` is a fixed interval.
    pub multiplier: f64,
}

/// Default attempt cap for extraction polling.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// Default interval for extraction polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

impl RetryPolicy {
    /// A fixed-interval policy.
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay: interval,
            max_delay: interval,
            multiplier: 1.0,
        }
    }

    /// An exponential policy starting at `initial_delay` and doubling up to `max_delay`.
    pub fn exponential(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            multiplier: 2.0,
        }
    }

    /// The extraction polling policy: 30 attempts, one second apart.
    pub fn polling() -> Self {
        Self::fixed(DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL)
    }

    /// Delay to wait after attempt number `attempt` (1-based) failed.
    ///
    /// Returns `None` once `attempt` has reached `max_attempts`.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let mut delay = self.initial_delay;
        for _ in 1..attempt {
            delay = self.next_delay(delay);
            if delay == self.max_delay {
                break;
            }
        }
        Some(delay)
    }

    /// Grow `current` by the multiplier, clamped to `max_delay`.
    pub fn next_delay(&self, current: Duration) -> Duration {
        let next_ms = (current.as_millis() as f64 * self.multiplier) as u64;
        Duration::from_millis(next_ms).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::polling()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_policy_is_fixed_one_second() {
        let policy = RetryPolicy::polling();
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_after(29), Some(Duration::from_secs(1)));
        assert_eq!(policy.delay_after(30), None);
    }

    #[test]
    fn exponential_sequence_clamps_at_max() {
        let policy =
            RetryPolicy::exponential(10, Duration::from_secs(1), Duration::from_secs(30));
        let delays: Vec<u64> = (1..10)
            .map(|attempt| policy.delay_after(attempt).unwrap().as_secs())
            .collect();
        assert_eq!(delays, [1, 2, 4, 8, 16, 30, 30, 30, 30]);
    }

    #[test]
    fn next_delay_with_custom_multiplier() {
        let policy = RetryPolicy {
            multiplier: 3.0,
            max_delay: Duration::from_secs(60),
            ..RetryPolicy::exponential(5, Duration::from_secs(2), Duration::from_secs(60))
        };
        assert_eq!(policy.next_delay(Duration::from_secs(2)), Duration::from_secs(6));
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = RetryPolicy::fixed(1, Duration::from_millis(10));
        assert_eq!(policy.delay_after(1), None);
    }
}
