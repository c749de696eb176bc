use std::time::Duration;

use tracing::warn;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Period between temperature/pressure requests while open.
    pub poll_interval: Duration,
    pub polling: bool,
    /// Events buffered per subscriber before the oldest are dropped.
    pub event_capacity: usize,
}

impl SessionConfig {
    /// A zero poll interval falls back to the default and a zero event
    /// capacity becomes one.
    pub(crate) fn sanitized(mut self) -> Self {
        if self.poll_interval.is_zero() {
            warn!(
                "Poll interval must be positive, using {:?}",
                DEFAULT_POLL_INTERVAL
            );
            self.poll_interval = DEFAULT_POLL_INTERVAL;
        }
        if self.event_capacity == 0 {
            warn!("Event capacity must be positive, using 1");
            self.event_capacity = 1;
        }
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            polling: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_keeps_valid_values() {
        let config = SessionConfig {
            poll_interval: Duration::from_millis(250),
            polling: false,
            event_capacity: 3,
        }
        .sanitized();
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert!(!config.polling);
        assert_eq!(config.event_capacity, 3);
    }

    #[test]
    fn test_sanitized_replaces_zeroes() {
        let config = SessionConfig {
            poll_interval: Duration::ZERO,
            polling: true,
            event_capacity: 0,
        }
        .sanitized();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.event_capacity, 1);
    }
}
