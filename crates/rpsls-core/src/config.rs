//! Deployment-wide protocol settings.

use crate::error::{GameError, Result};
use crate::rules::timeout::{DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS};
use chrono::Duration;

/// Settings fixed when a service is built; every game copies them at creation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Minimum inactivity before a timeout may be claimed
    pub timeout_window: Duration,
}

impl GameConfig {
    pub fn with_timeout_secs(secs: i64) -> Result<Self> {
        if secs <= 0 || secs > MAX_TIMEOUT_SECS {
            return Err(GameError::InvalidInput(format!(
                "timeout window must be between 1 and {}s, got {}s",
                MAX_TIMEOUT_SECS, secs
            )));
        }
        let timeout_window = Duration::try_seconds(secs).ok_or_else(|| {
            GameError::InvalidInput(format!("timeout window of {}s is out of range", secs))
        })?;
        Ok(Self { timeout_window })
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            timeout_window: Duration::seconds(DEFAULT_TIMEOUT_SECS),
        }
    }
}
