//! Scheduled health reminders
//!
//! Two components on an independent timeline from the vitals alarms: the
//! store holds reminder definitions and their lifecycle status, and the
//! scheduler matches wall-clock time against each active reminder's due time
//! within a firing window, with dedup against outstanding alarms.

mod scheduler;
mod store;

pub use scheduler::{ReminderScheduler, DEFAULT_FIRING_WINDOW_MS};
pub use store::{NewReminder, ReminderStore};
