use std::time::{Duration, Instant};

/// Trailing-edge debouncer over an explicit clock reading.
///
/// Each `schedule` replaces the pending payload and pushes the deadline out to
/// `now + delay`. A replaced payload is dropped without ever being yielded.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, payload: T, now: Instant) {
        self.pending = Some((payload, now + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Yields the pending payload once its deadline has been reached.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.flush(),
            _ => None,
        }
    }

    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(payload, _)| payload)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
