use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{normalize, DEFAULT_FAILURE_PENALTY, DEFAULT_PROBE_INTERVAL, DEFAULT_TIMEOUT};

/// Global probe settings, used for any per-probe value left unset.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ProbeSettings {
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Duration,
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub interval: Duration,
    #[serde(default)]
    pub failure_penalty: u32,
}

impl ProbeSettings {
    pub fn normalize_timeout(&self, t: Duration) -> Duration {
        normalize(self.timeout, t, Duration::ZERO, DEFAULT_TIMEOUT)
    }

    pub fn normalize_interval(&self, t: Duration) -> Duration {
        normalize(self.interval, t, Duration::ZERO, DEFAULT_PROBE_INTERVAL)
    }

    pub fn normalize_failure_penalty(&self, p: u32) -> u32 {
        normalize(self.failure_penalty, p, 0, DEFAULT_FAILURE_PENALTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_settings() {
        let s = ProbeSettings::default();
        assert_eq!(s.normalize_timeout(Duration::ZERO), DEFAULT_TIMEOUT);
        assert_eq!(s.normalize_interval(Duration::ZERO), DEFAULT_PROBE_INTERVAL);
        assert_eq!(s.normalize_failure_penalty(0), DEFAULT_FAILURE_PENALTY);

        let s = ProbeSettings {
            timeout: Duration::from_secs(5),
            interval: Duration::from_secs(10),
            failure_penalty: 3,
        };
        assert_eq!(s.normalize_timeout(Duration::ZERO), Duration::from_secs(5));
        assert_eq!(s.normalize_timeout(Duration::from_secs(1)), Duration::from_secs(1));
        assert_eq!(s.normalize_interval(Duration::ZERO), Duration::from_secs(10));
        assert_eq!(s.normalize_failure_penalty(0), 3);
        assert_eq!(s.normalize_failure_penalty(7), 7);
    }
}
