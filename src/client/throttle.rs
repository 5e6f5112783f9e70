//! Sliding-window request throttling.
//!
//! Every outbound SpaceTraders call goes through [`RateThrottler::throttle`].
//! The throttler holds one [`RateWindow`] per quota ("2 per second", "30 per
//! minute", ...). A call is admitted only when every window would admit it,
//! so the tightest window at any instant decides the wait: waits combine by
//! maximum, never by sum.
//!
//! The window set sits behind a `tokio::sync::Mutex` that is held across the
//! wait and the call itself. Concurrent callers are therefore serialized and
//! each sees the quota state left by the previous one.

use std::collections::VecDeque;
use std::future::Future;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep_until};

use crate::config::ThrottleConfig;
use crate::v_debug;

/// A quota of `quota` calls per trailing `period`.
#[derive(Debug, Clone)]
pub struct RateWindow {
    quota: usize,
    period: Duration,
    /// Completion instants of the most recent calls, oldest first.
    calls: VecDeque<Instant>,
}

impl RateWindow {
    pub fn new(quota: usize, period: Duration) -> Self {
        let quota = quota.max(1);
        Self {
            quota,
            period,
            calls: VecDeque::with_capacity(quota),
        }
    }

    pub fn quota(&self) -> usize {
        self.quota
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// `None` when a call may start at `now`, otherwise the instant the
    /// window reopens.
    pub fn next_eligible(&self, now: Instant) -> Option<Instant> {
        if self.calls.len() < self.quota {
            return None;
        }
        let reopens_at = *self.calls.front()? + self.period;
        if reopens_at <= now { None } else { Some(reopens_at) }
    }

    /// Record a completed call, evicting the oldest beyond the quota.
    pub fn record(&mut self, completed_at: Instant) {
        self.calls.push_back(completed_at);
        while self.calls.len() > self.quota {
            self.calls.pop_front();
        }
    }
}

pub struct RateThrottler {
    windows: Mutex<Vec<RateWindow>>,
}

impl RateThrottler {
    pub fn new(windows: Vec<RateWindow>) -> Self {
        Self {
            windows: Mutex::new(windows),
        }
    }

    pub fn from_config(config: &ThrottleConfig) -> Self {
        let windows = config
            .windows
            .iter()
            .map(|w| RateWindow::new(w.quota, Duration::from_millis(w.period_ms)))
            .collect();
        Self::new(windows)
    }

    /// Wait for every window to admit a call, run `action` once and, if it
    /// succeeded, record its completion in every window.
    ///
    /// Errors from `action` are returned untouched and are not retried.
    /// Dropping the returned future while it waits abandons the call; it is
    /// never issued late against a quota it did not re-check.
    pub async fn throttle<F, Fut, T, E>(&self, action: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut windows = self.windows.lock().await;

        loop {
            let now = Instant::now();
            let wait_until = windows.iter().filter_map(|w| w.next_eligible(now)).max();
            match wait_until {
                None => break,
                Some(until) => {
                    v_debug!(
                        "🌐 THROTTLE: waiting {:.2}s for a free request slot",
                        until.saturating_duration_since(now).as_secs_f64()
                    );
                    sleep_until(until).await;
                }
            }
        }

        let result = action().await;

        if result.is_ok() {
            let completed_at = Instant::now();
            for window in windows.iter_mut() {
                window.record(completed_at);
            }
        }

        result
    }

    /// Instant the next call could start, or `None` if it could start now.
    pub async fn next_eligible(&self) -> Option<Instant> {
        let windows = self.windows.lock().await;
        let now = Instant::now();
        windows.iter().filter_map(|w| w.next_eligible(now)).max()
    }
}
