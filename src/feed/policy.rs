use std::time::Duration;

/// Bounded exponential backoff: retry `n` (1-based) waits `base * 2^(n-1)`.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    attempts: u32,
    max_attempts: u32,
    base_delay: Duration,
}

impl ReconnectPolicy {
    const MULTIPLIER: u32 = 2;

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the retry numbered `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(Self::MULTIPLIER.saturating_pow(exp))
    }

    /// Consume one retry. Returns the retry number and its delay, or `None` once exhausted.
    pub fn next_retry(&mut self) -> Option<(u32, Duration)> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some((self.attempts, self.delay_for(self.attempts)))
    }

    /// Called when a connection reaches the open state.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}
