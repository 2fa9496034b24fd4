//! Critical alarm management
//!
//! The alarm manager holds the set of currently active (unacknowledged)
//! critical alarms. Every poll runs the sample against the critical threshold
//! table; each breach appends a new `AlarmEvent`; there is no suppression
//! window and no cross-tick dedup, so a sustained breach keeps appending until
//! the operator acknowledges. While the active list is non-empty the system is
//! in a blocking critical state.

use crate::notify::{
    NotificationBridge, ALARM_TONE_COUNT, ALARM_TONE_DURATION_MS, ALARM_TONE_FREQ_HZ,
    ALARM_TONE_GAP_MS,
};
use crate::thresholds::{self, ThresholdTable};
use crate::types::{AlarmDirection, AlarmEvent, VitalLevel, VitalSample};
use chrono::Utc;
use std::time::Duration;

/// Stateful manager of the active critical alarm list
#[derive(Debug, Clone)]
pub struct AlarmManager {
    critical: ThresholdTable,
    active: Vec<AlarmEvent>,
}

impl AlarmManager {
    pub fn new(critical: ThresholdTable) -> Self {
        Self {
            critical,
            active: Vec::new(),
        }
    }

    /// Evaluate a sample against the critical table and append one alarm per
    /// breaching vital. Returns the number of alarms appended; the caller
    /// escalates (see [`escalate`]) when it is non-zero.
    ///
    /// A sample with no vitals is a no-op: not an error, not an alarm.
    pub fn on_new_sample(&mut self, sample: &VitalSample) -> usize {
        if sample.is_empty() {
            return 0;
        }

        let fired_at = Utc::now();
        let mut appended = 0;

        for status in thresholds::evaluate(sample, &self.critical) {
            let direction = match status.status {
                VitalLevel::Low => AlarmDirection::Low,
                VitalLevel::High => AlarmDirection::High,
                VitalLevel::Normal => continue,
            };
            let range = self.critical.range_for(&status.vital);
            let event = AlarmEvent::new(
                &status.vital,
                direction,
                status.actual_value,
                range.display(),
                fired_at,
            );
            tracing::warn!(
                vital = %event.vital,
                direction = %event.direction,
                value = event.value,
                normal_range = %event.normal_range,
                "critical threshold breach"
            );
            self.active.push(event);
            appended += 1;
        }

        appended
    }

    /// Acknowledge and clear every active alarm, returning the drained
    /// events. Evaluation state is untouched: a still-critical next sample
    /// re-arms immediately.
    pub fn acknowledge_all(&mut self) -> Vec<AlarmEvent> {
        for alarm in &mut self.active {
            alarm.acknowledged = true;
        }
        let cleared = std::mem::take(&mut self.active);
        if !cleared.is_empty() {
            tracing::info!(scope = "all", count = cleared.len(), "alarms acknowledged");
        }
        cleared
    }

    /// Active alarms in insertion order, newest last
    pub fn active(&self) -> &[AlarmEvent] {
        &self.active
    }

    /// True while any unacknowledged alarm exists (blocking critical state)
    pub fn is_critical(&self) -> bool {
        !self.active.is_empty()
    }
}

/// Emit the audible escalation burst: 3 discrete tones, spaced apart.
///
/// Best-effort by contract: an unsupported audio environment is logged and
/// ignored, never fatal to alarm delivery. Kept out of `AlarmManager` so the
/// inter-tone sleeps never run under the state lock.
pub async fn escalate(bridge: &dyn NotificationBridge) {
    for i in 0..ALARM_TONE_COUNT {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(ALARM_TONE_GAP_MS)).await;
        }
        if let Err(e) = bridge.play_tone(ALARM_TONE_FREQ_HZ, ALARM_TONE_DURATION_MS) {
            tracing::debug!(error = %e, "alarm tone unavailable");
        }
    }
}
