//! Request pacing and the per-run request budget.

use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Gate every outbound synthesis call passes through.
///
/// Calls are spaced at least `interval` apart, measured from the start of the
/// previous call, and at most `max_requests` are ever issued.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    max_requests: u32,
    issued: u32,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration, max_requests: u32) -> Self {
        Self { interval, max_requests, issued: 0, last: None }
    }

    /// Wait for the next request slot.
    ///
    /// # Returns
    /// `false` without waiting once the budget is spent.
    pub async fn acquire(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }

        if let Some(last) = self.last {
            let ready = last + self.interval;
            if ready > Instant::now() {
                debug!("Pacing: waiting {:.1}s before next request", (ready - Instant::now()).as_secs_f32());
                sleep_until(ready).await;
            }
        }

        self.last = Some(Instant::now());
        self.issued += 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.issued >= self.max_requests
    }

    pub fn remaining(&self) -> u32 {
        self.max_requests.saturating_sub(self.issued)
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}
