use std::time::{Duration, Instant};

/// Minimum spacing between handled key presses and header clicks
pub(crate) const INPUT_INTERVAL: Duration = Duration::from_millis(150);

/// Leading-edge rate limiter: the first call goes through, and further calls
/// are dropped until `interval` has passed since the last one that did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new(interval: Duration) -> Throttle {
        Throttle {
            interval,
            last: None,
        }
    }

    pub(crate) fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle() {
        let mut throttle = Throttle::new(INPUT_INTERVAL);
        let t0 = Instant::now();
        assert!(throttle.admit(t0));
        assert!(!throttle.admit(t0 + Duration::from_millis(10)));
        assert!(!throttle.admit(t0 + Duration::from_millis(149)));
        assert!(throttle.admit(t0 + Duration::from_millis(150)));
        // Dropped calls do not push the window forwards
        assert!(!throttle.admit(t0 + Duration::from_millis(200)));
        assert!(throttle.admit(t0 + Duration::from_millis(300)));
    }
}
