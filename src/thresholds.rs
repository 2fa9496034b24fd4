//! Threshold tables and the per-vital evaluator
//!
//! Two independently configured range tables drive the engine: a wider
//! advisory table used for chart/trend visualization, and a narrower critical
//! table whose breaches raise alarms. The same reading can be
//! advisory-abnormal without being alarm-critical.

use crate::types::{vital_unit, VitalLevel, VitalSample, VitalStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Range applied to vitals with no configured entry
pub const FALLBACK_RANGE: ThresholdRange = ThresholdRange {
    low: 0.0,
    high: 100.0,
};

/// Inclusive-normal range for one vital: `low..=high` is normal, strictly
/// below is `low`, strictly above is `high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRange {
    pub low: f64,
    pub high: f64,
}

impl ThresholdRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Classify a value and return the breach magnitude (0 when normal,
    /// always non-negative).
    pub fn classify(&self, value: f64) -> (VitalLevel, f64) {
        if value < self.low {
            (VitalLevel::Low, self.low - value)
        } else if value > self.high {
            (VitalLevel::High, value - self.high)
        } else {
            (VitalLevel::Normal, 0.0)
        }
    }

    /// Display string, e.g. `45-130`
    pub fn display(&self) -> String {
        format!("{}-{}", self.low, self.high)
    }
}

/// Named threshold ranges for a set of vitals.
///
/// Process-wide configuration, read-only at runtime. Serializes as a plain
/// `{vital: {low, high}}` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable(BTreeMap<String, ThresholdRange>);

impl ThresholdTable {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// The advisory table: tight clinical norms, used for visualization only
    pub fn advisory_defaults() -> Self {
        let mut table = Self::new();
        table.insert("heart_rate", ThresholdRange::new(60.0, 100.0));
        table.insert("bp", ThresholdRange::new(90.0, 140.0));
        table.insert("spo2", ThresholdRange::new(95.0, 100.0));
        table.insert("glucose", ThresholdRange::new(70.0, 140.0));
        table
    }

    /// The critical table: the wider bounds whose breach raises an alarm
    pub fn critical_defaults() -> Self {
        let mut table = Self::new();
        table.insert("heart_rate", ThresholdRange::new(45.0, 130.0));
        table.insert("bp", ThresholdRange::new(70.0, 190.0));
        table.insert("spo2", ThresholdRange::new(85.0, 100.0));
        table.insert("glucose", ThresholdRange::new(50.0, 250.0));
        table
    }

    pub fn insert(&mut self, vital: &str, range: ThresholdRange) {
        self.0.insert(vital.to_string(), range);
    }

    pub fn get(&self, vital: &str) -> Option<&ThresholdRange> {
        self.0.get(vital)
    }

    /// Range for a vital, falling back to the wide-open default for vitals
    /// with no configured entry.
    pub fn range_for(&self, vital: &str) -> ThresholdRange {
        self.0.get(vital).copied().unwrap_or(FALLBACK_RANGE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ThresholdRange)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate a sample against a threshold table.
///
/// Pure function: exactly one `VitalStatus` per vital present in the sample,
/// ordered by vital name. Vitals absent from the table classify against
/// [`FALLBACK_RANGE`].
pub fn evaluate(sample: &VitalSample, table: &ThresholdTable) -> Vec<VitalStatus> {
    sample
        .values
        .iter()
        .map(|(vital, &value)| {
            let range = table.range_for(vital);
            let (status, deviation) = range.classify(value);
            VitalStatus {
                vital: vital.clone(),
                actual_value: value,
                status,
                deviation,
                unit: vital_unit(vital).to_string(),
            }
        })
        .collect()
}
