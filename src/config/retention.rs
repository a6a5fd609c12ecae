use std::env;
use std::time::Duration;

/// Retention policy for resolved complaints. Resolved records whose last
/// update is older than the window are purged by the background sweeper.
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub enabled: bool,
    pub window_days: i64,
    pub sweep_interval: Duration,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_days: 10,
            sweep_interval: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl RetentionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = env::var("RETENTION_SWEEP_ENABLED")
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.enabled);

        let window_days = env::var("RETENTION_WINDOW_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|d: &i64| *d > 0)
            .unwrap_or(defaults.window_days);

        let sweep_interval = env::var("RETENTION_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|s: &u64| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval);

        Self {
            enabled,
            window_days,
            sweep_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let cfg = RetentionConfig::default();
        assert!(cfg.enabled);
        assert_eq!(cfg.window_days, 10);
        assert_eq!(cfg.sweep_interval, Duration::from_secs(86400));
    }
}
