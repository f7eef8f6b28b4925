use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{
    habit::{Habit, WeekDay},
    reminders::ReminderRecord,
};

pub const REMINDER_TITLE: &str = "Habit Reminder";

/// Recurring local alert handed to the host notification service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationRequest {
    pub identifier: String,
    pub weekday: WeekDay,
    pub calendar_weekday: u8,
    pub hour: u32,
    pub minute: u32,
    pub repeats: bool,
    pub title: String,
    pub body: String,
}

impl NotificationRequest {
    pub fn for_reminder(habit: &Habit, record: &ReminderRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            weekday: record.weekday,
            calendar_weekday: record.weekday.calendar_index(),
            hour: record.hour,
            minute: record.minute,
            repeats: record.repeats_weekly,
            title: REMINDER_TITLE.to_string(),
            body: habit.title.clone(),
        }
    }
}

/// Platform-specific notification adapters implement this. Registration is fire and forget.
pub trait NotificationSink: Send + Sync {
    fn schedule(&self, notification: NotificationRequest);
}

impl<T: NotificationSink + ?Sized> NotificationSink for Arc<T> {
    fn schedule(&self, notification: NotificationRequest) {
        (**self).schedule(notification)
    }
}

/// Keeps every request in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    requests: Mutex<Vec<NotificationRequest>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<NotificationRequest> {
        self.requests.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }
}

impl NotificationSink for RecordingSink {
    fn schedule(&self, notification: NotificationRequest) {
        self.requests.lock().push(notification);
    }
}
