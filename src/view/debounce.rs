use std::time::{Duration, Instant};

pub const SEARCH_DELAY: Duration = Duration::from_millis(300);

/// Holds back the latest value until no newer one arrived for `wait`.
///
/// Each input resets the deadline; only the last value is ever released.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn input(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.wait, value));
    }

    /// Release the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = matches!(&self.pending, Some((deadline, _)) if *deadline <= now);
        if !due {
            return None;
        }
        self.pending.take().map(|(_, value)| value)
    }

    /// Time left before the pending value is released.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
