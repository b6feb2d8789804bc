//! Per-recipient, per-signature call rate limiting.

use std::collections::HashMap;
use std::time::Duration;

use wire::NetGuid;

/// Remembers when each `(recipient, signature id)` pair last went out.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    last_sent: HashMap<(NetGuid, u16), Duration>,
}

impl Throttle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a call may go out at `now` under `max_per_sec`.
    #[must_use]
    pub fn allows(&self, key: (NetGuid, u16), max_per_sec: Option<u32>, now: Duration) -> bool {
        let Some(interval) = interval(max_per_sec) else {
            return true;
        };
        self.last_sent
            .get(&key)
            .map_or(true, |last| now >= *last + interval)
    }

    /// Records a send at `now`. Unthrottled calls are not tracked.
    pub fn record(&mut self, key: (NetGuid, u16), max_per_sec: Option<u32>, now: Duration) {
        if interval(max_per_sec).is_some() {
            self.last_sent.insert(key, now);
        }
    }
}

fn interval(max_per_sec: Option<u32>) -> Option<Duration> {
    max_per_sec
        .filter(|rate| *rate > 0)
        .map(|rate| Duration::from_secs(1) / rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: (NetGuid, u16) = (NetGuid::new(1), 0);

    #[test]
    fn unthrottled_always_allowed() {
        let mut throttle = Throttle::new();
        throttle.record(KEY, None, Duration::ZERO);
        assert!(throttle.allows(KEY, None, Duration::ZERO));
        assert!(throttle.last_sent.is_empty());
    }

    #[test]
    fn second_call_inside_interval_dropped() {
        let mut throttle = Throttle::new();
        assert!(throttle.allows(KEY, Some(10), Duration::ZERO));
        throttle.record(KEY, Some(10), Duration::ZERO);
        assert!(!throttle.allows(KEY, Some(10), Duration::from_millis(50)));
        assert!(throttle.allows(KEY, Some(10), Duration::from_millis(100)));
    }

    #[test]
    fn keys_are_independent() {
        let mut throttle = Throttle::new();
        throttle.record(KEY, Some(1), Duration::ZERO);
        assert!(throttle.allows((NetGuid::new(1), 1), Some(1), Duration::ZERO));
        assert!(throttle.allows((NetGuid::new(2), 0), Some(1), Duration::ZERO));
    }
}
