//! Chart history window
//!
//! A bounded FIFO buffer of labeled samples for chart/trend consumers.
//! Appending past capacity evicts from the head, so memory use is constant
//! however long the engine runs.

use crate::types::{HistoryPoint, VitalSample};
use std::collections::VecDeque;

/// Default window capacity in samples
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Bounded FIFO history of labeled vitals samples
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a labeled sample, evicting the oldest entry when full
    pub fn append(&mut self, sample: &VitalSample) {
        self.points.push_back(HistoryPoint::from_sample(sample));
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Read-only view for chart consumers, oldest first
    pub fn snapshot(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn sample_with_hr(hr: f64) -> VitalSample {
        let mut values = BTreeMap::new();
        values.insert("heart_rate".to_string(), hr);
        VitalSample::new(Utc::now(), values)
    }

    #[test]
    fn test_append_below_capacity() {
        let mut window = HistoryWindow::default();
        for i in 0..5 {
            window.append(&sample_with_hr(70.0 + i as f64));
        }
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut window = HistoryWindow::default();
        for i in 0..25 {
            window.append(&sample_with_hr(i as f64));
        }

        // 25 appends at capacity 20 keep exactly the last 20
        assert_eq!(window.len(), 20);
        let snapshot = window.snapshot();
        assert_eq!(snapshot[0].values["heart_rate"], 5.0);
        assert_eq!(snapshot[19].values["heart_rate"], 24.0);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut window = HistoryWindow::new(3);
        window.append(&sample_with_hr(70.0));

        let snapshot = window.snapshot();
        window.append(&sample_with_hr(80.0));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(window.len(), 2);
    }
}
