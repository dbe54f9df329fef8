use std::time::{Duration, Instant};

/// Cancellable single-shot deadline.
///
/// The panel has no background threads; owners arm a deadline and the event
/// loop polls it on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub const fn new() -> Self {
        Self { at: None }
    }

    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.at = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Returns true exactly once, on the first poll at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let t0 = Instant::now();
        let mut d = Deadline::new();
        assert!(!d.fire(t0));
        d.arm(t0, Duration::from_millis(10));
        assert!(d.is_armed());
        assert!(!d.fire(t0 + Duration::from_millis(9)));
        assert!(d.fire(t0 + Duration::from_millis(10)));
        assert!(!d.fire(t0 + Duration::from_millis(20)));
        assert!(!d.is_armed());
    }

    #[test]
    fn cancel_prevents_firing() {
        let t0 = Instant::now();
        let mut d = Deadline::new();
        d.arm(t0, Duration::ZERO);
        d.cancel();
        assert!(!d.fire(t0 + Duration::from_secs(1)));
        assert_eq!(d.remaining(t0), None);
    }
}
