use std::time::{Duration, Instant};

/// Blocking ticker used to pace the simulation against the wall clock.
pub struct Ticker {
    expires_at: Instant,
    period: Duration,
}

impl Ticker {
    /// Creates a new ticker that ticks at the specified interval.
    pub fn every(period: Duration) -> Self {
        Self {
            expires_at: Instant::now() + period,
            period,
        }
    }

    /// Sleeps until the next tick. If the deadline has already passed, returns immediately.
    pub fn next(&mut self) {
        if let Some(remaining) = self.expires_at.checked_duration_since(Instant::now()) {
            std::thread::sleep(remaining);
        }

        self.expires_at += self.period;
    }
}
