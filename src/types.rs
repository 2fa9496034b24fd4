//! Core types for the Vitalwatch engine
//!
//! This module defines the data that flows through the two alerting
//! subsystems: vitals samples and their per-vital evaluation results, active
//! alarm events, reminder definitions and the alarms the scheduler raises for
//! them, and the labeled points kept in the chart history window.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One timestamped vitals reading from the sample source.
///
/// Immutable once created; downstream consumers reference it, never mutate it.
/// Values are keyed by vital name (`heart_rate`, `bp`, `spo2`, `glucose`, ...)
/// in a `BTreeMap` so every evaluation pass sees the vitals in a stable order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSample {
    /// When the reading was taken (UTC)
    pub timestamp: DateTime<Utc>,
    /// Numeric value per vital name
    pub values: BTreeMap<String, f64>,
}

impl VitalSample {
    /// Build a sample, discarding non-finite values.
    ///
    /// NaN and infinities never reach the evaluator; they are dropped here,
    /// and the remaining vitals proceed normally.
    pub fn new(timestamp: DateTime<Utc>, values: BTreeMap<String, f64>) -> Self {
        let values = values
            .into_iter()
            .filter(|(name, value)| {
                if value.is_finite() {
                    true
                } else {
                    tracing::warn!(vital = %name, value, "discarding non-finite vital value");
                    false
                }
            })
            .collect();
        Self { timestamp, values }
    }

    /// True when the reading carries no vitals at all ("no data yet")
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Measurement unit for a known vital name; empty for unknown vitals
pub fn vital_unit(vital: &str) -> &'static str {
    match vital {
        "heart_rate" => "bpm",
        "bp" => "mmHg",
        "spo2" => "%",
        "glucose" => "mg/dL",
        _ => "",
    }
}

/// Display label for a vital name, e.g. `heart_rate` -> `HEART RATE`
pub fn vital_label(vital: &str) -> String {
    vital.replace('_', " ").to_uppercase()
}

/// Classification of a single vital against a threshold range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VitalLevel {
    Normal,
    Low,
    High,
}

impl VitalLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalLevel::Normal => "normal",
            VitalLevel::Low => "low",
            VitalLevel::High => "high",
        }
    }
}

impl std::fmt::Display for VitalLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-vital evaluation result. Ephemeral: recomputed on every poll, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalStatus {
    /// Vital name as it appeared in the sample
    pub vital: String,
    /// The measured value
    pub actual_value: f64,
    /// Classification against the table the evaluation ran with
    pub status: VitalLevel,
    /// Magnitude of the breach; `0` when normal, always non-negative
    pub deviation: f64,
    /// Measurement unit for display
    pub unit: String,
}

/// Which side of the critical range a breach crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmDirection {
    Low,
    High,
}

impl AlarmDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmDirection::Low => "low",
            AlarmDirection::High => "high",
        }
    }

    /// Banner label, e.g. `CRITICAL LOW`
    pub fn label(&self) -> &'static str {
        match self {
            AlarmDirection::Low => "CRITICAL LOW",
            AlarmDirection::High => "CRITICAL HIGH",
        }
    }
}

impl std::fmt::Display for AlarmDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alarm severity. Every critical-table breach is raised at the same
/// priority; there are no per-alarm tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmSeverity {
    High,
}

impl AlarmSeverity {
    pub fn as_str(&self) -> &'static str {
        "HIGH"
    }
}

/// An active critical alarm raised by the alarm manager.
///
/// Identity is synthetic (vital + direction + creation tick); repeated
/// breaches across polls each produce a new event. Lives in the active list
/// until acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmEvent {
    /// Synthetic id: `<vital>_<direction>_<millis>`
    pub id: String,
    /// Vital name that breached
    pub vital: String,
    /// Which bound was crossed
    pub direction: AlarmDirection,
    /// The breaching value
    pub value: f64,
    /// Measurement unit for display
    pub unit: String,
    /// The critical range as a display string, e.g. `45-130`
    pub normal_range: String,
    /// Always `HIGH`
    pub severity: AlarmSeverity,
    /// When the breach was observed (UTC)
    pub fired_at: DateTime<Utc>,
    /// Set when the operator acknowledges the alarm
    pub acknowledged: bool,
}

impl AlarmEvent {
    pub fn new(
        vital: &str,
        direction: AlarmDirection,
        value: f64,
        normal_range: String,
        fired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: format!(
                "{}_{}_{}",
                vital,
                direction.as_str(),
                fired_at.timestamp_millis()
            ),
            vital: vital.to_string(),
            direction,
            value,
            unit: vital_unit(vital).to_string(),
            normal_range,
            severity: AlarmSeverity::High,
            fired_at,
            acknowledged: false,
        }
    }
}

/// Category of a reminder. Unknown categories on the wire are accepted as
/// `Other` rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Medication,
    Appointment,
    Exercise,
    Diet,
    Checkup,
    Other,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Medication => "medication",
            ReminderKind::Appointment => "appointment",
            ReminderKind::Exercise => "exercise",
            ReminderKind::Diet => "diet",
            ReminderKind::Checkup => "checkup",
            ReminderKind::Other => "other",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s {
            "medication" => ReminderKind::Medication,
            "appointment" => ReminderKind::Appointment,
            "exercise" => ReminderKind::Exercise,
            "diet" => ReminderKind::Diet,
            "checkup" => ReminderKind::Checkup,
            _ => ReminderKind::Other,
        }
    }
}

impl Serialize for ReminderKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReminderKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ReminderKind::from_wire(&s))
    }
}

/// How often a reminder recurs. Informational for scheduling order and
/// display; the scheduler itself matches time-of-day only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderFrequency {
    Daily,
    Weekly,
    Monthly,
    AsNeeded,
}

/// Reminder priority, used for list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderPriority {
    Low,
    Medium,
    High,
}

impl ReminderPriority {
    /// Sort rank: high before medium before low
    pub fn rank(&self) -> u8 {
        match self {
            ReminderPriority::High => 0,
            ReminderPriority::Medium => 1,
            ReminderPriority::Low => 2,
        }
    }
}

/// Reminder lifecycle status.
///
/// `Overdue` exists in the vocabulary for authoring collaborators but no
/// automatic transition in this crate ever writes it; a reminder stays
/// `Active` until explicitly completed or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Active,
    Completed,
    Overdue,
}

/// A scheduled health reminder.
///
/// Created by an authoring collaborator, read by the scheduler every tick,
/// and mutated by the scheduler only to flip `status` on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Id of the form `rem_` + 6 hex chars
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Time of day the reminder is due, `HH:MM` on the wire
    #[serde(rename = "time", with = "time_of_day")]
    pub due_time: NaiveTime,
    pub frequency: ReminderFrequency,
    pub priority: ReminderPriority,
    pub status: ReminderStatus,
    pub created_at: NaiveDate,
    /// Next occurrence, computed at creation; used for list ordering
    pub next_due: NaiveDateTime,
}

/// An outstanding alarm raised for a due reminder.
///
/// At most one exists per reminder id at any time; it is removed on dismissal
/// or when the reminder is completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderAlarm {
    pub id: String,
    pub reminder_id: String,
    pub fired_at: NaiveDateTime,
}

impl ReminderAlarm {
    pub fn new(reminder_id: &str, fired_at: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            reminder_id: reminder_id.to_string(),
            fired_at,
        }
    }
}

/// One labeled entry in the chart history window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPoint {
    /// Wall-clock label, `HH:MM:SS`
    pub time_label: String,
    /// Vital values at that instant
    pub values: BTreeMap<String, f64>,
}

impl HistoryPoint {
    /// Label a sample with its local wall-clock time
    pub fn from_sample(sample: &VitalSample) -> Self {
        Self {
            time_label: sample
                .timestamp
                .with_timezone(&Local)
                .format("%H:%M:%S")
                .to_string(),
            values: sample.values.clone(),
        }
    }
}

/// Serde helper for `HH:MM` time-of-day fields
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sample_filters_non_finite() {
        let mut values = BTreeMap::new();
        values.insert("heart_rate".to_string(), 72.0);
        values.insert("bp".to_string(), f64::NAN);
        values.insert("spo2".to_string(), f64::INFINITY);

        let sample = VitalSample::new(Utc::now(), values);

        assert_eq!(sample.values.len(), 1);
        assert_eq!(sample.values.get("heart_rate"), Some(&72.0));
    }

    #[test]
    fn test_empty_sample() {
        let sample = VitalSample::new(Utc::now(), BTreeMap::new());
        assert!(sample.is_empty());
    }

    #[test]
    fn test_vital_labels_and_units() {
        assert_eq!(vital_label("heart_rate"), "HEART RATE");
        assert_eq!(vital_unit("heart_rate"), "bpm");
        assert_eq!(vital_unit("glucose"), "mg/dL");
        assert_eq!(vital_unit("unknown_metric"), "");
    }

    #[test]
    fn test_alarm_event_id_shape() {
        let fired_at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let event = AlarmEvent::new(
            "heart_rate",
            AlarmDirection::Low,
            35.0,
            "45-130".to_string(),
            fired_at,
        );

        assert_eq!(
            event.id,
            format!("heart_rate_low_{}", fired_at.timestamp_millis())
        );
        assert_eq!(event.unit, "bpm");
        assert_eq!(event.severity.as_str(), "HIGH");
        assert!(!event.acknowledged);
    }

    #[test]
    fn test_reminder_wire_format() {
        let json = r#"{
            "id": "rem_a1b2c3",
            "type": "medication",
            "title": "Morning insulin",
            "description": "10 units before breakfast",
            "time": "08:00",
            "frequency": "daily",
            "priority": "high",
            "status": "active",
            "created_at": "2024-03-01",
            "next_due": "2024-03-02T08:00:00"
        }"#;

        let reminder: Reminder = serde_json::from_str(json).unwrap();
        assert_eq!(reminder.kind, ReminderKind::Medication);
        assert_eq!(
            reminder.due_time,
            NaiveTime::from_hms_opt(8, 0, 0).unwrap()
        );
        assert_eq!(reminder.frequency, ReminderFrequency::Daily);
        assert_eq!(reminder.status, ReminderStatus::Active);

        let round_trip = serde_json::to_value(&reminder).unwrap();
        assert_eq!(round_trip["type"], "medication");
        assert_eq!(round_trip["time"], "08:00");
    }

    #[test]
    fn test_unknown_reminder_kind_accepted() {
        let reminder: Reminder = serde_json::from_str(
            r#"{
                "id": "rem_000000",
                "type": "hydration",
                "title": "Drink water",
                "time": "12:30",
                "frequency": "as-needed",
                "priority": "low",
                "status": "active",
                "created_at": "2024-03-01",
                "next_due": "2024-03-01T12:30:00"
            }"#,
        )
        .unwrap();

        assert_eq!(reminder.kind, ReminderKind::Other);
        assert_eq!(reminder.frequency, ReminderFrequency::AsNeeded);
    }
}
