//! Scheduler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max operations executing at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Max pending operations; a full queue evicts its oldest entry
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Queue-wait timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_max_concurrent() -> usize {
    3
}

fn default_max_queue_size() -> usize {
    1000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            max_queue_size: 1000,
            request_timeout_ms: 30_000,
        }
    }
}

impl SchedulerConfig {
    /// Get the queue-wait timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.max_queue_size, 1000);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn test_request_timeout_duration() {
        let config = SchedulerConfig {
            request_timeout_ms: 1_500,
            ..Default::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: SchedulerConfig = serde_yaml::from_str("max_concurrent: 8").unwrap();
        assert_eq!(config.max_concurrent, 8);
        assert_eq!(config.max_queue_size, 1000);
        assert_eq!(config.request_timeout_ms, 30_000);
    }
}
