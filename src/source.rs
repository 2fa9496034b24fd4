//! Vitals sample sources
//!
//! The engine pulls readings through the [`SampleSource`] trait so the core
//! never depends on a particular transport. The wire format of the
//! latest-vitals endpoint is a flat object of optional numeric fields; all
//! fields absent means "no data yet", which is not an error.

use crate::error::MonitorError;
use crate::types::VitalSample;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provider of the latest vitals reading
#[async_trait]
pub trait SampleSource: Send + Sync {
    /// Fetch the latest reading. `Ok(None)` means no data yet.
    async fn latest(&self) -> Result<Option<VitalSample>, MonitorError>;
}

/// Wire format of the latest-vitals endpoint. Any subset of fields may be
/// absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestVitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
}

impl LatestVitals {
    /// Convert to a sample, or `None` when no vital is present.
    ///
    /// `observed_at` stands in for a missing wire timestamp.
    pub fn into_sample(self, observed_at: DateTime<Utc>) -> Option<VitalSample> {
        let mut values = BTreeMap::new();
        if let Some(v) = self.heart_rate {
            values.insert("heart_rate".to_string(), v);
        }
        if let Some(v) = self.bp {
            values.insert("bp".to_string(), v);
        }
        if let Some(v) = self.spo2 {
            values.insert("spo2".to_string(), v);
        }
        if let Some(v) = self.glucose {
            values.insert("glucose".to_string(), v);
        }

        if values.is_empty() {
            return None;
        }
        Some(VitalSample::new(
            self.timestamp.unwrap_or(observed_at),
            values,
        ))
    }
}

/// HTTP sample source polling a latest-vitals endpoint
#[cfg(feature = "http")]
pub struct HttpSampleSource {
    client: reqwest::Client,
    url: String,
}

#[cfg(feature = "http")]
impl HttpSampleSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl SampleSource for HttpSampleSource {
    async fn latest(&self) -> Result<Option<VitalSample>, MonitorError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| MonitorError::Fetch(e.to_string()))?;

        let wire: LatestVitals = response
            .json()
            .await
            .map_err(|e| MonitorError::Fetch(e.to_string()))?;

        Ok(wire.into_sample(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_wire_reading() {
        let wire: LatestVitals = serde_json::from_str(
            r#"{"timestamp": "2024-03-01T10:00:00Z", "heart_rate": 72, "bp": 120, "spo2": 98, "glucose": 110}"#,
        )
        .unwrap();

        let sample = wire.into_sample(Utc::now()).unwrap();
        assert_eq!(sample.values.len(), 4);
        assert_eq!(sample.values["heart_rate"], 72.0);
        assert_eq!(sample.timestamp.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_partial_reading() {
        let wire: LatestVitals = serde_json::from_str(r#"{"heart_rate": 55}"#).unwrap();
        let observed_at = Utc::now();

        let sample = wire.into_sample(observed_at).unwrap();
        assert_eq!(sample.values.len(), 1);
        // Missing wire timestamp falls back to the observation time
        assert_eq!(sample.timestamp, observed_at);
    }

    #[test]
    fn test_all_fields_absent_means_no_data() {
        let wire: LatestVitals = serde_json::from_str("{}").unwrap();
        assert!(wire.into_sample(Utc::now()).is_none());
    }

    #[test]
    fn test_non_finite_field_is_dropped_not_classified() {
        let wire = LatestVitals {
            heart_rate: Some(f64::NAN),
            spo2: Some(97.0),
            ..Default::default()
        };

        let sample = wire.into_sample(Utc::now()).unwrap();
        assert_eq!(sample.values.len(), 1);
        assert!(sample.values.contains_key("spo2"));
    }
}
