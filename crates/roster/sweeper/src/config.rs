//! Sweeper configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_RETENTION_SECS: u64 = (i64::MAX / 1000) as u64;

/// Retention policy and sweep cadence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Seconds between sweeps
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Age in seconds after which a group is retired
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            retention_secs: default_retention(),
        }
    }
}

impl SweeperConfig {
    /// Sweep interval, never shorter than one second
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn retention(&self) -> chrono::Duration {
        // chrono panics past i64::MAX milliseconds
        let secs = self.retention_secs.min(MAX_RETENTION_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}

// One hour
fn default_interval() -> u64 {
    60 * 60
}

// One week
fn default_retention() -> u64 {
    7 * 24 * 60 * 60
}
