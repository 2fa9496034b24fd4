//! Engine configuration
//!
//! All timing constants and both threshold tables in one serde-loadable
//! struct. Every field has a default, so a config file only needs to name
//! what it overrides.

use crate::error::MonitorError;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::reminders::DEFAULT_FIRING_WINDOW_MS;
use crate::thresholds::ThresholdTable;
use serde::{Deserialize, Serialize};

/// Default vitals poll period (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default reminder-check tick period (ms)
pub const DEFAULT_REMINDER_TICK_MS: u64 = 5_000;

/// Monitoring engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Vitals poll period (ms)
    pub poll_interval_ms: u64,
    /// Reminder-check tick period (ms)
    pub reminder_tick_ms: u64,
    /// Firing window after a reminder's due time (ms)
    pub firing_window_ms: u64,
    /// History window capacity in samples
    pub history_capacity: usize,
    /// Advisory threshold table (visualization)
    pub advisory: ThresholdTable,
    /// Critical threshold table (alarms)
    pub critical: ThresholdTable,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            reminder_tick_ms: DEFAULT_REMINDER_TICK_MS,
            firing_window_ms: DEFAULT_FIRING_WINDOW_MS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            advisory: ThresholdTable::advisory_defaults(),
            critical: ThresholdTable::critical_defaults(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, MonitorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the timing invariants.
    ///
    /// The firing window must be at least twice the reminder tick period,
    /// otherwise a due time could fall between ticks and never fire.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.poll_interval_ms == 0 {
            return Err(MonitorError::Config(
                "poll_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.reminder_tick_ms == 0 {
            return Err(MonitorError::Config(
                "reminder_tick_ms must be non-zero".to_string(),
            ));
        }
        if self.firing_window_ms < 2 * self.reminder_tick_ms {
            return Err(MonitorError::Config(format!(
                "firing_window_ms ({}) must be at least twice reminder_tick_ms ({})",
                self.firing_window_ms, self.reminder_tick_ms
            )));
        }
        if self.history_capacity == 0 {
            return Err(MonitorError::Config(
                "history_capacity must be non-zero".to_string(),
            ));
        }
        if self.critical.is_empty() {
            return Err(MonitorError::Config(
                "critical threshold table must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
