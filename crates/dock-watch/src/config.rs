//! Watch engine timing

use std::time::Duration;

use dock_detect::LinkConfig;
use serde::{Deserialize, Serialize};

/// Timing for discovery and polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Pause between poll cycles in milliseconds
    pub poll_interval_ms: u64,
    /// Pause after a discovery pass that found nothing, in milliseconds
    pub discovery_backoff_ms: u64,
    /// Serial settings used for every port
    pub link: LinkConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            discovery_backoff_ms: 1000,
            link: LinkConfig::default(),
        }
    }
}

impl WatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn discovery_backoff(&self) -> Duration {
        Duration::from_millis(self.discovery_backoff_ms)
    }
}
