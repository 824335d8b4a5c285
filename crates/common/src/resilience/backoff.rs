//! Backoff strategies for spacing out retry attempts
//!
//! Every strategy is deterministic: the same attempt index always produces
//! the same delay, and delays never decrease as the attempt index grows.

use std::time::Duration;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Exponential backoff: `min(initial_delay * 2^attempt, max_delay)`
    Exponential { initial_delay: Duration, max_delay: Duration },
}

impl BackoffStrategy {
    /// Exponential doubling from `initial_delay`, capped at `max_delay`.
    ///
    /// A ceiling below the initial delay is raised to the initial delay so
    /// the sequence stays non-decreasing.
    pub fn exponential(initial_delay: Duration, max_delay: Duration) -> Self {
        Self::Exponential { initial_delay, max_delay: max_delay.max(initial_delay) }
    }

    /// Delay to wait after the failure of attempt `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { initial_delay, max_delay } => 2_u32
                .checked_pow(attempt)
                .and_then(|factor| initial_delay.checked_mul(factor))
                .map_or(max_delay, |delay| delay.min(max_delay)),
        }
    }

    /// Largest delay this strategy can produce.
    pub fn ceiling(&self) -> Duration {
        match *self {
            Self::Fixed(delay) => delay,
            Self::Exponential { max_delay, .. } => max_delay,
        }
    }

    /// Sum of the delays slept before attempt `attempts` starts, i.e. the
    /// delays for attempts `0..attempts`.
    pub fn total_delay(&self, attempts: u32) -> Duration {
        (0..attempts).fold(Duration::ZERO, |acc, attempt| acc.saturating_add(self.delay(attempt)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_strategy_fixed() {
        let strategy = BackoffStrategy::Fixed(Duration::from_millis(100));

        assert_eq!(strategy.delay(0), Duration::from_millis(100));
        assert_eq!(strategy.delay(5), Duration::from_millis(100));
        assert_eq!(strategy.ceiling(), Duration::from_millis(100));
    }

    #[test]
    fn test_backoff_strategy_exponential_doubles_until_ceiling() {
        let strategy =
            BackoffStrategy::exponential(Duration::from_millis(100), Duration::from_secs(1));

        assert_eq!(strategy.delay(0), Duration::from_millis(100));
        assert_eq!(strategy.delay(1), Duration::from_millis(200));
        assert_eq!(strategy.delay(2), Duration::from_millis(400));
        assert_eq!(strategy.delay(3), Duration::from_millis(800));
        assert_eq!(strategy.delay(4), Duration::from_secs(1));
        assert_eq!(strategy.delay(20), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_is_monotonic_and_bounded() {
        let strategy =
            BackoffStrategy::exponential(Duration::from_millis(7), Duration::from_secs(30));

        let mut previous = Duration::ZERO;
        for attempt in 0..200 {
            let delay = strategy.delay(attempt);
            assert!(delay >= previous, "attempt {attempt} decreased");
            assert!(delay <= strategy.ceiling());
            previous = delay;
        }
    }

    #[test]
    fn test_exponential_survives_overflowing_attempts() {
        let strategy =
            BackoffStrategy::exponential(Duration::from_secs(u64::MAX / 4), Duration::MAX);

        assert_eq!(strategy.delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_ceiling_below_initial_is_raised() {
        let strategy =
            BackoffStrategy::exponential(Duration::from_secs(2), Duration::from_secs(1));

        assert_eq!(strategy.ceiling(), Duration::from_secs(2));
        assert_eq!(strategy.delay(3), Duration::from_secs(2));
    }

    #[test]
    fn test_total_delay_sums_preceding_attempts() {
        let strategy =
            BackoffStrategy::exponential(Duration::from_millis(10), Duration::from_millis(25));

        assert_eq!(strategy.total_delay(0), Duration::ZERO);
        // 10 + 20 + 25
        assert_eq!(strategy.total_delay(3), Duration::from_millis(55));
    }
}
