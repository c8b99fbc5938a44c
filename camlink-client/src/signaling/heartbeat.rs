use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Liveness bookkeeping for one signaling channel.
///
/// Written by the connection task, read synchronously by
/// [`SignalingChannel::is_connection_alive`](crate::SignalingChannel::is_connection_alive).
#[derive(Debug, Default)]
pub struct ChannelHealth {
    open: AtomicBool,
    last_pong: Mutex<Option<Instant>>,
}

impl ChannelHealth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the socket open and starts the staleness clock.
    pub fn mark_open(&self) {
        *self.last_pong() = Some(Instant::now());
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn mark_closed(&self) {
        self.open.store(false, Ordering::SeqCst);
        *self.last_pong() = None;
    }

    pub fn record_pong(&self) {
        *self.last_pong() = Some(Instant::now());
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub fn since_last_pong(&self) -> Option<Duration> {
        let last_pong = *self.last_pong();
        last_pong.map(|at| at.elapsed())
    }

    pub fn is_stale(&self, timeout: Duration) -> bool {
        self.since_last_pong().is_some_and(|since| since > timeout)
    }

    pub fn is_alive(&self, timeout: Duration) -> bool {
        self.is_open() && !self.is_stale(timeout)
    }

    fn last_pong(&self) -> MutexGuard<'_, Option<Instant>> {
        self.last_pong.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatVerdict {
    /// Channel looks healthy; send the next probe.
    Probe,
    /// No acknowledgment for longer than the timeout.
    Stale(Duration),
    /// The socket is not running at all.
    NotRunning,
}

/// Probe schedule: one ping every `interval`, dead after `timeout` of silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Heartbeat {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Evaluated on every tick, before the next probe goes out.
    pub fn check(&self, health: &ChannelHealth) -> HeartbeatVerdict {
        if !health.is_open() {
            return HeartbeatVerdict::NotRunning;
        }
        match health.since_last_pong() {
            Some(since) if since > self.timeout => HeartbeatVerdict::Stale(since),
            _ => HeartbeatVerdict::Probe,
        }
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(30))
    }
}
