//! Engine lifecycle and periodic tasks
//!
//! The engine owns the two independent timelines: the vitals poll (sample →
//! history + alarm evaluation) and the reminder tick (wall clock → firing
//! window). Each is a single interval loop, so a tick can never re-enter
//! before the previous body returns; the fetch is awaited inline, which also
//! serializes polls. Stopping the engine aborts both tasks and discards any
//! in-flight fetch; no tick fires after teardown.

use crate::alarms::{self, AlarmManager};
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::history::HistoryWindow;
use crate::notify::NotificationBridge;
use crate::reminders::{ReminderScheduler, ReminderStore};
use crate::source::SampleSource;
use crate::types::AlarmEvent;
use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Running monitoring engine.
///
/// Owns both periodic tasks arena-style: dropping the engine cancels them.
/// All state is shared behind async mutexes so presentation collaborators can
/// read alarms, history, and reminders while the engine runs.
pub struct MonitorEngine {
    config: MonitorConfig,
    alarms: Arc<Mutex<AlarmManager>>,
    history: Arc<Mutex<HistoryWindow>>,
    store: Arc<Mutex<ReminderStore>>,
    scheduler: Arc<Mutex<ReminderScheduler>>,
    poll_task: JoinHandle<()>,
    reminder_task: JoinHandle<()>,
}

impl MonitorEngine {
    /// Spawn both periodic tasks on the current tokio runtime and return the
    /// running engine.
    pub fn start(
        config: MonitorConfig,
        source: Arc<dyn SampleSource>,
        bridge: Arc<dyn NotificationBridge>,
    ) -> Self {
        let alarms = Arc::new(Mutex::new(AlarmManager::new(config.critical.clone())));
        let history = Arc::new(Mutex::new(HistoryWindow::new(config.history_capacity)));
        let store = Arc::new(Mutex::new(ReminderStore::new()));
        let scheduler = Arc::new(Mutex::new(ReminderScheduler::new(config.firing_window_ms)));

        let poll_task = {
            let history = Arc::clone(&history);
            let alarms = Arc::clone(&alarms);
            let bridge = Arc::clone(&bridge);
            let period = Duration::from_millis(config.poll_interval_ms);
            tokio::spawn(async move {
                let mut ticks = interval(period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticks.tick().await;
                    poll_once(source.as_ref(), &history, &alarms, bridge.as_ref()).await;
                }
            })
        };

        let reminder_task = {
            let store = Arc::clone(&store);
            let scheduler = Arc::clone(&scheduler);
            let period = Duration::from_millis(config.reminder_tick_ms);
            tokio::spawn(async move {
                let mut ticks = interval(period);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticks.tick().await;
                    let now = Local::now().naive_local();
                    let mut scheduler = scheduler.lock().await;
                    let store = store.lock().await;
                    scheduler.tick(&store, now, bridge.as_ref());
                }
            })
        };

        tracing::info!(
            poll_interval_ms = config.poll_interval_ms,
            reminder_tick_ms = config.reminder_tick_ms,
            "monitor engine started"
        );

        Self {
            config,
            alarms,
            history,
            store,
            scheduler,
            poll_task,
            reminder_task,
        }
    }

    /// The configuration the engine runs with. Chart consumers evaluate
    /// samples against `config().advisory` for deviation rendering.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Stop both periodic tasks. Idempotent; also runs on drop.
    pub fn stop(&self) {
        self.poll_task.abort();
        self.reminder_task.abort();
        tracing::info!("monitor engine stopped");
    }

    /// Shared handle to the vitals alarm manager
    pub fn alarms(&self) -> Arc<Mutex<AlarmManager>> {
        Arc::clone(&self.alarms)
    }

    /// Shared handle to the chart history window
    pub fn history(&self) -> Arc<Mutex<HistoryWindow>> {
        Arc::clone(&self.history)
    }

    /// Shared handle to the reminder store, for CRUD collaborators
    pub fn reminder_store(&self) -> Arc<Mutex<ReminderStore>> {
        Arc::clone(&self.store)
    }

    /// Shared handle to the reminder scheduler
    pub fn scheduler(&self) -> Arc<Mutex<ReminderScheduler>> {
        Arc::clone(&self.scheduler)
    }

    /// True while any unacknowledged vitals alarm exists
    pub async fn is_critical(&self) -> bool {
        self.alarms.lock().await.is_critical()
    }

    /// Acknowledge and clear all active vitals alarms
    pub async fn acknowledge_all(&self) -> Vec<AlarmEvent> {
        self.alarms.lock().await.acknowledge_all()
    }

    /// Complete a reminder and drop any outstanding alarm for it in one
    /// operation.
    pub async fn complete_reminder(&self, reminder_id: &str) -> Result<(), MonitorError> {
        let mut scheduler = self.scheduler.lock().await;
        let mut store = self.store.lock().await;
        scheduler.complete(&mut store, reminder_id)
    }

    /// Dismiss an outstanding reminder alarm, leaving the reminder active
    pub async fn dismiss_reminder_alarm(&self, alarm_id: &str) -> bool {
        self.scheduler.lock().await.dismiss(alarm_id)
    }
}

impl Drop for MonitorEngine {
    fn drop(&mut self) {
        self.poll_task.abort();
        self.reminder_task.abort();
    }
}

/// One vitals poll: fetch, then apply the result atomically to history and
/// alarm state. Fetch failures retain prior state and are retried next tick.
async fn poll_once(
    source: &dyn SampleSource,
    history: &Mutex<HistoryWindow>,
    alarms: &Mutex<AlarmManager>,
    bridge: &dyn NotificationBridge,
) {
    match source.latest().await {
        Ok(Some(sample)) => {
            history.lock().await.append(&sample);
            let appended = alarms.lock().await.on_new_sample(&sample);
            if appended > 0 {
                alarms::escalate(bridge).await;
            }
        }
        Ok(None) => {
            tracing::debug!("no vitals available yet");
        }
        Err(e) => {
            tracing::warn!(error = %e, "vitals fetch failed, retaining prior state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingBridge;
    use crate::types::{
        ReminderFrequency, ReminderKind, ReminderPriority, ReminderStatus, VitalSample,
    };
    use crate::reminders::NewReminder;
    use async_trait::async_trait;
    use chrono::{NaiveTime, Utc};
    use std::collections::BTreeMap;

    /// Source that always returns a critically low heart rate
    struct CriticalSource;

    #[async_trait]
    impl SampleSource for CriticalSource {
        async fn latest(&self) -> Result<Option<VitalSample>, MonitorError> {
            let mut values = BTreeMap::new();
            values.insert("heart_rate".to_string(), 30.0);
            Ok(Some(VitalSample::new(Utc::now(), values)))
        }
    }

    /// Source with no data yet
    struct EmptySource;

    #[async_trait]
    impl SampleSource for EmptySource {
        async fn latest(&self) -> Result<Option<VitalSample>, MonitorError> {
            Ok(None)
        }
    }

    /// Source whose fetches always fail
    struct FailingSource;

    #[async_trait]
    impl SampleSource for FailingSource {
        async fn latest(&self) -> Result<Option<VitalSample>, MonitorError> {
            Err(MonitorError::Fetch("connection refused".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_applies_sample_to_history_and_alarms() {
        let bridge = Arc::new(RecordingBridge::default());
        let engine = MonitorEngine::start(
            MonitorConfig::default(),
            Arc::new(CriticalSource),
            bridge.clone(),
        );

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        engine.stop();

        let alarm_count = engine.alarms().lock().await.active().len();
        let history_count = engine.history().lock().await.len();

        // Every poll appends one history point and one alarm
        assert!(alarm_count >= 1);
        assert_eq!(history_count, alarm_count);
        assert!(engine.is_critical().await);
        // Each armed poll escalates with a full tone burst
        assert_eq!(bridge.tones().len(), alarm_count * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_retains_prior_state() {
        let engine = MonitorEngine::start(
            MonitorConfig::default(),
            Arc::new(FailingSource),
            Arc::new(RecordingBridge::default()),
        );

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        engine.stop();

        assert!(engine.history().lock().await.is_empty());
        assert!(!engine.is_critical().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_data_is_not_an_error() {
        let bridge = Arc::new(RecordingBridge::default());
        let engine = MonitorEngine::start(
            MonitorConfig::default(),
            Arc::new(EmptySource),
            bridge.clone(),
        );

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        engine.stop();

        assert!(engine.history().lock().await.is_empty());
        assert!(bridge.tones().is_empty());
        assert_eq!(engine.config().history_capacity, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_both_tasks() {
        let engine = MonitorEngine::start(
            MonitorConfig::default(),
            Arc::new(CriticalSource),
            Arc::new(RecordingBridge::default()),
        );

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        engine.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let alarms_at_stop = engine.alarms().lock().await.active().len();
        let history_at_stop = engine.history().lock().await.len();

        // No tick may fire after teardown
        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(engine.alarms().lock().await.active().len(), alarms_at_stop);
        assert_eq!(engine.history().lock().await.len(), history_at_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_acknowledge_then_rearm() {
        let engine = MonitorEngine::start(
            MonitorConfig::default(),
            Arc::new(CriticalSource),
            Arc::new(RecordingBridge::default()),
        );

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        let cleared = engine.acknowledge_all().await;
        assert!(!cleared.is_empty());
        assert!(!engine.is_critical().await);

        // The source is still critical: the next polls re-arm
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        engine.stop();
        assert!(engine.is_critical().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_reminder_through_engine() {
        let engine = MonitorEngine::start(
            MonitorConfig::default(),
            Arc::new(EmptySource),
            Arc::new(RecordingBridge::default()),
        );

        let id = {
            let store = engine.reminder_store();
            let mut store = store.lock().await;
            store
                .create(
                    NewReminder {
                        kind: ReminderKind::Medication,
                        title: "Evening dose".to_string(),
                        description: String::new(),
                        due_time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
                        frequency: ReminderFrequency::Daily,
                        priority: ReminderPriority::High,
                    },
                    Local::now().naive_local(),
                )
                .id
        };

        engine.complete_reminder(&id).await.unwrap();
        engine.stop();

        let store = engine.reminder_store();
        let store = store.lock().await;
        assert_eq!(store.get(&id).unwrap().status, ReminderStatus::Completed);
    }
}
