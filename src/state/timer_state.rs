//! Timer snapshot structure

use serde::{Deserialize, Serialize};

use crate::surface::to_seconds;

/// Point-in-time view of a countdown, as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub running: bool,
    pub duration_ms: u64,
    /// Remaining milliseconds, never negative
    pub remaining_ms: u64,
    pub total_seconds: f64,
    pub remaining_seconds: f64,
}

impl TimerSnapshot {
    /// Build a snapshot from raw engine values.
    ///
    /// `remaining_ms` may be transiently negative while an expiry is being
    /// processed; it is clamped to zero here.
    pub fn new(running: bool, duration_ms: u64, remaining_ms: i64) -> Self {
        let remaining_ms = u64::try_from(remaining_ms).unwrap_or(0);
        Self {
            running,
            duration_ms,
            remaining_ms,
            total_seconds: to_seconds(duration_ms),
            remaining_seconds: to_seconds(remaining_ms),
        }
    }

    /// Fraction of the bar still filled, from 1.0 down to 0.0
    pub fn fraction_remaining(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms as f64 / self.duration_ms as f64).min(1.0)
    }
}
