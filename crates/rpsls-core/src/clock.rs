//! Time sources for timeout checks.

use crate::error::{GameError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to (simulation and tests)
#[derive(Clone, Debug)]
pub struct ManualClock {
    current: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Start from the current wall-clock time
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Advance simulated time. Time left unchanged when `by` would carry it
    /// past the representable calendar.
    pub fn advance(&self, by: Duration) -> Result<DateTime<Utc>> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = current
            .checked_add_signed(by)
            .ok_or_else(|| GameError::InvalidInput(format!("cannot advance clock by {}", by)))?;
        Ok(*current)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
