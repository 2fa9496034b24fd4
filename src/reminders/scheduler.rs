//! Reminder firing
//!
//! The scheduler runs on a fixed tick and matches wall-clock time against
//! each active reminder's due time. A reminder fires when `now` falls inside
//! the window after its due instant and no alarm for it is already
//! outstanding. Delivery is at-least-once within the window: dismissing an
//! alarm while the window is still open allows a later tick to re-fire, and
//! only completion closes the loop for good.
//!
//! The window must be at least twice the tick period so a due time can never
//! fall between ticks unseen.

use super::store::ReminderStore;
use crate::error::MonitorError;
use crate::notify::{NotificationBridge, REMINDER_TONE_DURATION_MS, REMINDER_TONE_FREQ_HZ};
use crate::types::{ReminderAlarm, ReminderStatus};
use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Default firing window after a due time (ms)
pub const DEFAULT_FIRING_WINDOW_MS: u64 = 10_000;

/// Matches due times against the clock and owns the outstanding
/// reminder-alarm list (independent of the vitals alarm list).
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    window: Duration,
    active: Vec<ReminderAlarm>,
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_FIRING_WINDOW_MS)
    }
}

impl ReminderScheduler {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::milliseconds(window_ms as i64),
            active: Vec::new(),
        }
    }

    /// Run one scheduling pass at `now`.
    ///
    /// For every reminder with status `active` that is due and not already
    /// alarmed, creates a [`ReminderAlarm`], delivers a best-effort system
    /// notification and audio cue, and returns the new alarms.
    pub fn tick(
        &mut self,
        store: &ReminderStore,
        now: NaiveDateTime,
        bridge: &dyn NotificationBridge,
    ) -> Vec<ReminderAlarm> {
        let mut fired = Vec::new();

        for reminder in store.iter().filter(|r| r.status == ReminderStatus::Active) {
            if !is_due(reminder.due_time, now, self.window) {
                continue;
            }
            // Membership check: at most one outstanding alarm per reminder
            if self.active.iter().any(|a| a.reminder_id == reminder.id) {
                continue;
            }

            let alarm = ReminderAlarm::new(&reminder.id, now);
            tracing::info!(
                reminder = %reminder.id,
                title = %reminder.title,
                "reminder due, raising alarm"
            );

            if let Err(e) = bridge.notify(&reminder.title, &reminder.description) {
                tracing::debug!(error = %e, "reminder notification unavailable");
            }
            if let Err(e) = bridge.play_tone(REMINDER_TONE_FREQ_HZ, REMINDER_TONE_DURATION_MS) {
                tracing::debug!(error = %e, "reminder tone unavailable");
            }

            self.active.push(alarm.clone());
            fired.push(alarm);
        }

        fired
    }

    /// Dismiss an outstanding alarm, leaving its reminder `active`.
    ///
    /// Within a still-open window the reminder may re-fire on a later tick.
    pub fn dismiss(&mut self, alarm_id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|a| a.id != alarm_id);
        let removed = self.active.len() < before;
        if removed {
            tracing::info!(alarm = alarm_id, "reminder alarm dismissed");
        }
        removed
    }

    /// Complete a reminder and remove any outstanding alarm for it in the
    /// same operation, so no later tick can re-fire it.
    pub fn complete(
        &mut self,
        store: &mut ReminderStore,
        reminder_id: &str,
    ) -> Result<(), MonitorError> {
        store.complete(reminder_id)?;
        self.active.retain(|a| a.reminder_id != reminder_id);
        Ok(())
    }

    /// Outstanding reminder alarms, oldest first
    pub fn active(&self) -> &[ReminderAlarm] {
        &self.active
    }
}

/// Whether a due time falls inside the firing window at `now`.
///
/// The due instant is `now`'s calendar day at `due`, single-day matching
/// only, so a `now` before the due time (including just after midnight for a
/// late-evening reminder) is simply not due yet.
pub fn is_due(due: NaiveTime, now: NaiveDateTime, window: Duration) -> bool {
    let due_instant = now.date().and_time(due);
    let delta = now - due_instant;
    delta >= Duration::zero() && delta <= window
}
