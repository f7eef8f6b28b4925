//! Derived views over the habit collection.

use chrono::NaiveDate;

use crate::habit::{Habit, WeekDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionStats {
    pub total: usize,
    pub completed: usize,
}

impl CompletionStats {
    pub fn ratio(&self) -> f64 {
        self.completed as f64 / self.total.max(1) as f64
    }

    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }
}

pub fn pending(habits: &[Habit]) -> Vec<&Habit> {
    habits.iter().filter(|habit| !habit.is_completed).collect()
}

pub fn completed(habits: &[Habit]) -> Vec<&Habit> {
    habits.iter().filter(|habit| habit.is_completed).collect()
}

pub fn active_on(habits: &[Habit], day: WeekDay) -> Vec<&Habit> {
    habits.iter().filter(|habit| habit.is_active_on(day)).collect()
}

pub fn active_on_date(habits: &[Habit], date: NaiveDate) -> Vec<&Habit> {
    active_on(habits, WeekDay::from_date(date))
}

pub fn completion_stats(habits: &[Habit]) -> CompletionStats {
    CompletionStats {
        total: habits.len(),
        completed: habits.iter().filter(|habit| habit.is_completed).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::HabitDraft;

    fn sample() -> Vec<Habit> {
        let mut run = HabitDraft::new("Run")
            .with_active_days([WeekDay::Monday, WeekDay::Thursday])
            .into_habit()
            .unwrap();
        run.advance();
        let read = HabitDraft::new("Read")
            .with_daily_target(2)
            .with_active_days([WeekDay::Thursday])
            .into_habit()
            .unwrap();
        let rest = HabitDraft::new("Rest")
            .with_active_days([WeekDay::Sunday])
            .into_habit()
            .unwrap();
        vec![run, read, rest]
    }

    fn titles(habits: Vec<&Habit>) -> Vec<&str> {
        habits.into_iter().map(|habit| habit.title.as_str()).collect()
    }

    #[test]
    fn splits_by_completion() {
        let habits = sample();
        assert_eq!(titles(pending(&habits)), vec!["Read", "Rest"]);
        assert_eq!(titles(completed(&habits)), vec!["Run"]);
    }

    #[test]
    fn filters_by_weekday_and_date() {
        let habits = sample();
        assert_eq!(titles(active_on(&habits, WeekDay::Thursday)), vec!["Run", "Read"]);
        let sunday = NaiveDate::from_ymd_opt(2025, 9, 28).unwrap();
        assert_eq!(titles(active_on_date(&habits, sunday)), vec!["Rest"]);
        assert!(active_on(&habits, WeekDay::Tuesday).is_empty());
    }

    #[test]
    fn stats_handle_empty_collection() {
        let stats = completion_stats(&[]);
        assert_eq!(stats.ratio(), 0.0);
        let stats = completion_stats(&sample());
        assert_eq!(stats, CompletionStats { total: 3, completed: 1 });
        assert_eq!(stats.remaining(), 2);
        assert!((stats.ratio() - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}
