use std::time::Duration;

/// Exponential reconnect delay: `min(2^attempt seconds, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    max: Duration,
}

impl Backoff {
    pub fn new(max: Duration) -> Self {
        Self { max }
    }

    /// Delay before the retry that follows `attempt` previous retries.
    pub fn delay(&self, attempt: u32) -> Duration {
        let secs = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_secs(secs).min(self.max)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
