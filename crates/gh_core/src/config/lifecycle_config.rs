//! Lifecycle Configuration

use serde::{Deserialize, Serialize};

/// Longest accepted delay, in ms (one day)
pub const MAX_DELAY_MS: u64 = 86_400_000;

/// Timing parameters for the request lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Delay between submit and the first matching search, in ms (default: 5000)
    pub resolution_delay_ms: u64,
    /// Delay before searching again when nobody was found, in ms (default: 5000)
    pub retry_delay_ms: u64,
    /// Searches per request before giving up (default: 3)
    pub max_search_attempts: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self { resolution_delay_ms: 5000, retry_delay_ms: 5000, max_search_attempts: 3 }
    }
}

impl LifecycleConfig {
    pub fn resolution_delay(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.resolution_delay_ms as i64)
    }

    pub fn retry_delay(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.retry_delay_ms as i64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_search_attempts == 0 {
            return Err("max_search_attempts must be at least 1".to_string());
        }
        if self.resolution_delay_ms > MAX_DELAY_MS {
            return Err(format!(
                "resolution_delay_ms must be at most {MAX_DELAY_MS}, got {}",
                self.resolution_delay_ms
            ));
        }
        if self.retry_delay_ms > MAX_DELAY_MS {
            return Err(format!(
                "retry_delay_ms must be at most {MAX_DELAY_MS}, got {}",
                self.retry_delay_ms
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delay_is_five_seconds() {
        let cfg = LifecycleConfig::default();
        assert_eq!(cfg.resolution_delay(), chrono::Duration::seconds(5));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let cfg = LifecycleConfig { max_search_attempts: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_delay_bounds() {
        let cfg = LifecycleConfig { resolution_delay_ms: MAX_DELAY_MS, ..Default::default() };
        assert!(cfg.validate().is_ok());

        let cfg = LifecycleConfig { resolution_delay_ms: i64::MAX as u64, ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("resolution_delay_ms"));

        let cfg = LifecycleConfig { retry_delay_ms: MAX_DELAY_MS + 1, ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("retry_delay_ms"));
    }
}
