//! Error types for Vitalwatch

use thiserror::Error;

/// Errors that can occur in the monitoring engine
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Failed to fetch latest sample: {0}")]
    Fetch(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid time-of-day (expected HH:MM): {0}")]
    InvalidTime(String),

    #[error("Unknown reminder id: {0}")]
    UnknownReminder(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Notification delivery failed: {0}")]
    Notify(String),
}
