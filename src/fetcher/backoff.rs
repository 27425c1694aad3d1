/// Counts how many poll ticks to sit out after consecutive failures.
#[derive(Debug, Clone)]
pub struct Backoff {
    consecutive_failures: u32,
    max_skipped_ticks: u32,
}

impl Backoff {
    #[must_use]
    pub fn new(max_skipped_ticks: u32) -> Self {
        Backoff {
            consecutive_failures: 0,
            max_skipped_ticks,
        }
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Records a failure and returns the ticks to skip: 0, 1, 3, 7, ... capped.
    pub fn on_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        let exponent = (self.consecutive_failures - 1).min(31);
        let skipped = (1u32 << exponent) - 1;
        skipped.min(self.max_skipped_ticks)
    }

    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }
}

/// Ticks to skip so the next attempt lands no earlier than `retry_after`.
#[must_use]
pub fn ticks_to_honour(retry_after: std::time::Duration, period: std::time::Duration) -> u32 {
    if period.is_zero() {
        return 0;
    }
    let wait = retry_after.as_millis();
    let period = period.as_millis();
    let ticks = wait.div_ceil(period);
    u32::try_from(ticks.saturating_sub(1)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{ticks_to_honour, Backoff};

    #[test]
    fn when_failures_accumulate_then_skipped_ticks_double_until_cap() {
        let mut backoff = Backoff::new(8);
        let skipped: Vec<u32> = (0..6).map(|_| backoff.on_failure()).collect();
        assert_eq!(skipped, vec![0, 1, 3, 7, 8, 8]);
        assert_eq!(backoff.consecutive_failures(), 6);
    }

    #[test]
    fn when_reset_after_failures_then_sequence_starts_over() {
        let mut backoff = Backoff::new(8);
        backoff.on_failure();
        backoff.on_failure();
        backoff.reset();
        assert_eq!(backoff.on_failure(), 0);
    }

    #[test]
    fn when_many_failures_then_shift_does_not_overflow() {
        let mut backoff = Backoff::new(u32::MAX);
        for _ in 0..40 {
            backoff.on_failure();
        }
        assert_eq!(backoff.on_failure(), u32::MAX >> 1);
    }

    #[test]
    fn when_retry_after_exceeds_period_then_enough_ticks_are_skipped() {
        let period = std::time::Duration::from_secs(10);
        assert_eq!(ticks_to_honour(std::time::Duration::from_secs(10), period), 0);
        assert_eq!(ticks_to_honour(std::time::Duration::from_secs(11), period), 1);
        assert_eq!(ticks_to_honour(std::time::Duration::from_secs(45), period), 4);
        assert_eq!(ticks_to_honour(std::time::Duration::ZERO, period), 0);
    }
}
