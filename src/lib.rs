//! Vitalwatch - Real-time patient-monitoring engine
//!
//! Vitalwatch polls a vitals feed, classifies each reading against clinical
//! threshold tables, and turns critical deviations into escalating,
//! acknowledgeable alarms. In parallel it schedules health reminders that
//! fire inside a precise time window with dedup and dismissal semantics
//! independent of the vitals alarms. A bounded history window feeds chart
//! consumers without unbounded growth.
//!
//! ## Subsystems
//!
//! - **Vitals path**: `SampleSource` → `HistoryWindow` + threshold evaluation
//!   → `AlarmManager` → `NotificationBridge`
//! - **Reminder path**: `ReminderStore` → `ReminderScheduler` →
//!   `NotificationBridge`, on its own timeline
//!
//! Both paths are driven by [`MonitorEngine`], which owns the two periodic
//! tasks and cancels them deterministically on drop.

pub mod alarms;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod notify;
pub mod reminders;
pub mod source;
pub mod thresholds;
pub mod types;

pub use alarms::AlarmManager;
pub use config::MonitorConfig;
pub use engine::MonitorEngine;
pub use error::MonitorError;
pub use history::HistoryWindow;
pub use notify::{LogBridge, NotificationBridge, NullBridge};
pub use reminders::{NewReminder, ReminderScheduler, ReminderStore};
pub use source::{LatestVitals, SampleSource};
pub use thresholds::{evaluate, ThresholdRange, ThresholdTable};
pub use types::{
    AlarmEvent, HistoryPoint, Reminder, ReminderAlarm, VitalSample, VitalStatus,
};

#[cfg(feature = "http")]
pub use source::HttpSampleSource;

/// Engine version embedded in logs and the CLI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name used in logs and notifications
pub const ENGINE_NAME: &str = "vitalwatch";
