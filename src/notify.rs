//! Notification and audio capability interface
//!
//! Both alarm subsystems deliver their side effects through
//! [`NotificationBridge`], so the core has no dependency on any particular
//! platform notification or audio API. Both operations are best-effort:
//! callers swallow errors (a platform without audio still gets alarm state).

use crate::error::MonitorError;

/// Tones in one critical alarm burst
pub const ALARM_TONE_COUNT: u32 = 3;

/// Critical alarm tone frequency (Hz)
pub const ALARM_TONE_FREQ_HZ: f32 = 800.0;

/// Single critical alarm tone duration (ms)
pub const ALARM_TONE_DURATION_MS: u64 = 300;

/// Gap between tones in a burst (ms)
pub const ALARM_TONE_GAP_MS: u64 = 400;

/// Reminder audio cue frequency (Hz)
pub const REMINDER_TONE_FREQ_HZ: f32 = 660.0;

/// Reminder audio cue duration (ms)
pub const REMINDER_TONE_DURATION_MS: u64 = 500;

/// Platform notification and audio primitives.
///
/// Implementations must not block; failures must be returned, never panic.
pub trait NotificationBridge: Send + Sync {
    /// Raise a system notification
    fn notify(&self, title: &str, body: &str) -> Result<(), MonitorError>;

    /// Play a single tone
    fn play_tone(&self, freq_hz: f32, duration_ms: u64) -> Result<(), MonitorError>;
}

/// Bridge that drops everything. For headless deployments and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBridge;

impl NotificationBridge for NullBridge {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), MonitorError> {
        Ok(())
    }

    fn play_tone(&self, _freq_hz: f32, _duration_ms: u64) -> Result<(), MonitorError> {
        Ok(())
    }
}

/// Bridge that renders notifications and tones as log lines. Used by the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBridge;

impl NotificationBridge for LogBridge {
    fn notify(&self, title: &str, body: &str) -> Result<(), MonitorError> {
        tracing::info!(title, body, "notification");
        Ok(())
    }

    fn play_tone(&self, freq_hz: f32, duration_ms: u64) -> Result<(), MonitorError> {
        tracing::info!(freq_hz, duration_ms, "tone");
        Ok(())
    }
}

/// Test double that records every delivery.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingBridge {
    notifications: std::sync::Mutex<Vec<(String, String)>>,
    tones: std::sync::Mutex<Vec<(f32, u64)>>,
}

#[cfg(test)]
impl RecordingBridge {
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn tones(&self) -> Vec<(f32, u64)> {
        self.tones.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl NotificationBridge for RecordingBridge {
    fn notify(&self, title: &str, body: &str) -> Result<(), MonitorError> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }

    fn play_tone(&self, freq_hz: f32, duration_ms: u64) -> Result<(), MonitorError> {
        self.tones.lock().unwrap().push((freq_hz, duration_ms));
        Ok(())
    }
}

/// Test double for platforms where both operations fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct UnsupportedBridge;

#[cfg(test)]
impl NotificationBridge for UnsupportedBridge {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), MonitorError> {
        Err(MonitorError::Notify("notifications not granted".to_string()))
    }

    fn play_tone(&self, _freq_hz: f32, _duration_ms: u64) -> Result<(), MonitorError> {
        Err(MonitorError::Notify("audio not supported".to_string()))
    }
}
