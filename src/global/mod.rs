use std::time::Duration;

mod probe;
pub use probe::*;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_FAILURE_PENALTY: u32 = 1;

/// Largest response body accepted from a probe target, in bytes.
pub const MAX_RESPONSE_BYTES: usize = 1_000_000;

/// Picks the local value if it is set, else the global one, else the default.
///
/// A value counts as unset when it is `<= unset`.
pub fn normalize<T: PartialOrd>(global: T, local: T, unset: T, default: T) -> T {
    if local > unset {
        return local;
    }
    if global > unset {
        return global;
    }
    default
}

pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0, 5, 0, 9), 5);
        assert_eq!(normalize(3, 0, 0, 9), 3);
        assert_eq!(normalize(0, 0, 0, 9), 9);
        assert_eq!(
            normalize(Duration::ZERO, Duration::ZERO, Duration::ZERO, DEFAULT_TIMEOUT),
            DEFAULT_TIMEOUT
        );
    }

    #[test]
    fn test_env_default() {
        assert_eq!(
            get_env_or_default("PROBEKIT_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
