//! Reminder definitions and lifecycle
//!
//! The store is the CRUD surface mutated by authoring collaborators (manual
//! or AI-suggested creation, deletion, completion). The scheduler only reads
//! `status` and `due_time`, and writes `status` through [`ReminderStore::complete`].

use crate::error::MonitorError;
use crate::types::{
    time_of_day, Reminder, ReminderFrequency, ReminderKind, ReminderPriority, ReminderStatus,
};
use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields supplied when authoring a reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminder {
    #[serde(rename = "type")]
    pub kind: ReminderKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "time", with = "time_of_day")]
    pub due_time: NaiveTime,
    pub frequency: ReminderFrequency,
    pub priority: ReminderPriority,
}

/// Collection of reminder definitions
#[derive(Debug, Clone, Default)]
pub struct ReminderStore {
    items: Vec<Reminder>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reminder: generated id, status `active`, and a `next_due`
    /// of today at the due time, rolled to tomorrow when already past.
    pub fn create(&mut self, new: NewReminder, now: NaiveDateTime) -> Reminder {
        let id = format!("rem_{}", &Uuid::new_v4().simple().to_string()[..6]);

        let mut next_due = now.date().and_time(new.due_time);
        if next_due <= now {
            next_due += Duration::days(1);
        }

        let reminder = Reminder {
            id,
            kind: new.kind,
            title: new.title,
            description: new.description,
            due_time: new.due_time,
            frequency: new.frequency,
            priority: new.priority,
            status: ReminderStatus::Active,
            created_at: now.date(),
            next_due,
        };
        tracing::info!(id = %reminder.id, title = %reminder.title, "reminder created");
        self.items.insert(0, reminder.clone());
        reminder
    }

    /// Seed the store from a JSON array of [`NewReminder`] definitions
    pub fn seed_from_json(&mut self, json: &str, now: NaiveDateTime) -> Result<usize, MonitorError> {
        let defs: Vec<NewReminder> = serde_json::from_str(json)?;
        let count = defs.len();
        for def in defs {
            self.create(def, now);
        }
        Ok(count)
    }

    /// All reminders sorted by priority (high first), then next due time
    pub fn list(&self) -> Vec<&Reminder> {
        let mut out: Vec<&Reminder> = self.items.iter().collect();
        out.sort_by_key(|r| (r.priority.rank(), r.next_due));
        out
    }

    pub fn get(&self, id: &str) -> Option<&Reminder> {
        self.items.iter().find(|r| r.id == id)
    }

    /// Remove a reminder. Returns false when the id is unknown.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|r| r.id != id);
        let removed = self.items.len() < before;
        if removed {
            tracing::info!(id, "reminder deleted");
        }
        removed
    }

    /// Flip a reminder to `completed` (terminal, user-triggered).
    ///
    /// Callers that also hold outstanding reminder alarms should go through
    /// `ReminderScheduler::complete`, which removes them in the same operation.
    pub fn complete(&mut self, id: &str) -> Result<&Reminder, MonitorError> {
        let reminder = self
            .items
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MonitorError::UnknownReminder(id.to_string()))?;
        reminder.status = ReminderStatus::Completed;
        tracing::info!(id, "reminder completed");
        Ok(reminder)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reminder> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn new_reminder(title: &str, due: NaiveTime, priority: ReminderPriority) -> NewReminder {
        NewReminder {
            kind: ReminderKind::Medication,
            title: title.to_string(),
            description: String::new(),
            due_time: due,
            frequency: ReminderFrequency::Daily,
            priority,
        }
    }

    #[test]
    fn test_create_assigns_id_and_active_status() {
        let mut store = ReminderStore::new();
        let due = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let created = store.create(new_reminder("Insulin", due, ReminderPriority::High), at(8, 0, 0));

        assert!(created.id.starts_with("rem_"));
        assert_eq!(created.id.len(), "rem_".len() + 6);
        assert_eq!(created.status, ReminderStatus::Active);
        assert_eq!(created.next_due, at(10, 0, 0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_past_due_time_rolls_to_tomorrow() {
        let mut store = ReminderStore::new();
        let due = NaiveTime::from_hms_opt(7, 30, 0).unwrap();
        let created = store.create(new_reminder("Walk", due, ReminderPriority::Low), at(9, 0, 0));

        assert_eq!(
            created.next_due,
            NaiveDate::from_ymd_opt(2024, 3, 2)
                .unwrap()
                .and_hms_opt(7, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_list_orders_by_priority_then_due() {
        let mut store = ReminderStore::new();
        let now = at(6, 0, 0);
        store.create(
            new_reminder("Low early", NaiveTime::from_hms_opt(8, 0, 0).unwrap(), ReminderPriority::Low),
            now,
        );
        store.create(
            new_reminder("High late", NaiveTime::from_hms_opt(20, 0, 0).unwrap(), ReminderPriority::High),
            now,
        );
        store.create(
            new_reminder("High early", NaiveTime::from_hms_opt(9, 0, 0).unwrap(), ReminderPriority::High),
            now,
        );

        let titles: Vec<&str> = store.list().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["High early", "High late", "Low early"]);
    }

    #[test]
    fn test_delete() {
        let mut store = ReminderStore::new();
        let due = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let created = store.create(new_reminder("Insulin", due, ReminderPriority::High), at(8, 0, 0));

        assert!(store.delete(&created.id));
        assert!(store.is_empty());
        assert!(!store.delete(&created.id));
    }

    #[test]
    fn test_complete_flips_status() {
        let mut store = ReminderStore::new();
        let due = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let created = store.create(new_reminder("Insulin", due, ReminderPriority::High), at(8, 0, 0));

        let completed = store.complete(&created.id).unwrap();
        assert_eq!(completed.status, ReminderStatus::Completed);
    }

    #[test]
    fn test_complete_unknown_id_errors() {
        let mut store = ReminderStore::new();
        assert!(matches!(
            store.complete("rem_ffffff"),
            Err(MonitorError::UnknownReminder(_))
        ));
    }

    #[test]
    fn test_seed_from_json() {
        let mut store = ReminderStore::new();
        let json = r#"[
            {"type": "medication", "title": "Metformin", "description": "500 mg",
             "time": "08:00", "frequency": "daily", "priority": "high"},
            {"type": "exercise", "title": "Evening walk",
             "time": "18:30", "frequency": "daily", "priority": "low"}
        ]"#;

        let count = store.seed_from_json(json, at(6, 0, 0)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.len(), 2);
        assert!(store.iter().all(|r| r.status == ReminderStatus::Active));
    }
}
