use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::habit::{Habit, HabitId, WeekDay};

/// One weekly calendar trigger derived from a habit's timing fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub identifier: String,
    pub weekday: WeekDay,
    pub repetition: u32,
    pub hour: u32,
    pub minute: u32,
    pub repeats_weekly: bool,
}

/// Stable per-slot identifier, so re-planning the same habit yields the same ids.
pub fn reminder_identifier(habit_id: HabitId, weekday: WeekDay, repetition: u32) -> String {
    format!("{}_{}_{}", habit_id, weekday.as_str(), repetition)
}

/// Reminders for a stored habit. Habits without a start time get none.
pub fn plan_for_habit(habit: &Habit) -> Vec<ReminderRecord> {
    let Some(start_time) = habit.start_time else {
        return Vec::new();
    };
    plan_reminders(
        habit.id,
        &habit.active_days,
        start_time,
        habit.daily_target,
        habit.effective_repeat_interval(),
    )
}

/// Emits `daily_target` reminders per active weekday. Repetition `r > 0` is shifted by
/// `r * interval` hours, wrapping within the same day; without an interval every
/// repetition lands on the start time.
pub fn plan_reminders(
    habit_id: HabitId,
    active_days: &[WeekDay],
    start_time: NaiveTime,
    daily_target: u32,
    repeat_interval_hours: Option<u32>,
) -> Vec<ReminderRecord> {
    let records: Vec<ReminderRecord> = reminder_slots(
        habit_id,
        active_days,
        start_time,
        daily_target,
        repeat_interval_hours,
    )
    .collect();
    tracing::debug!(%habit_id, count = records.len(), "planned reminders");
    records
}

/// Lazy form of [`plan_reminders`], yielding slots weekday by weekday.
pub fn reminder_slots(
    habit_id: HabitId,
    active_days: &[WeekDay],
    start_time: NaiveTime,
    daily_target: u32,
    repeat_interval_hours: Option<u32>,
) -> impl Iterator<Item = ReminderRecord> + '_ {
    let base_hour = start_time.hour();
    let minute = start_time.minute();
    active_days.iter().flat_map(move |&weekday| {
        (0..daily_target).map(move |repetition| {
            let hour = match repeat_interval_hours {
                Some(interval) if repetition > 0 => {
                    let shifted =
                        u64::from(base_hour) + u64::from(repetition) * u64::from(interval);
                    (shifted % 24) as u32
                }
                _ => base_hour,
            };
            ReminderRecord {
                identifier: reminder_identifier(habit_id, weekday, repetition),
                weekday,
                repetition,
                hour,
                minute,
                repeats_weekly: true,
            }
        })
    })
}
