use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    error::HabitError,
    habit::{Habit, HabitColor, HabitDraft, HabitId, ProgressOutcome},
    notifications::{NotificationRequest, NotificationSink},
    reminders,
    storage::{KeyValueStore, MemoryKeyValueStore, HABITS_KEY},
};

/// Owns the habit collection. Every mutation rewrites the whole collection to storage.
pub struct HabitStore {
    habits: Vec<Habit>,
    storage: Box<dyn KeyValueStore>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

pub struct HabitStoreBuilder {
    storage: Option<Box<dyn KeyValueStore>>,
    notification_sink: Option<Box<dyn NotificationSink>>,
}

impl HabitStoreBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            notification_sink: None,
        }
    }

    pub fn with_storage(mut self, storage: Box<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    /// Builds the store and loads whatever the storage currently holds.
    pub fn build(self) -> HabitStore {
        let mut store = HabitStore {
            habits: Vec::new(),
            storage: self
                .storage
                .unwrap_or_else(|| Box::new(MemoryKeyValueStore::new())),
            notification_sink: self.notification_sink,
        };
        store.load();
        store
    }
}

impl Default for HabitStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitStore {
    pub fn builder() -> HabitStoreBuilder {
        HabitStoreBuilder::new()
    }

    /// Replaces the in-memory collection with the stored one. Missing or corrupt data
    /// yields an empty collection.
    pub fn load(&mut self) {
        self.habits = match self.read_habits() {
            Ok(habits) => {
                info!(count = habits.len(), "loaded habits");
                habits
            }
            Err(err) => {
                warn!(%err, "discarding unreadable habit data");
                Vec::new()
            }
        };
    }

    /// Writes the whole collection. Failures are logged and otherwise ignored.
    pub fn persist(&self) {
        if let Err(err) = self.write_habits() {
            warn!(%err, "failed to persist habits");
        }
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    pub fn add(&mut self, draft: HabitDraft) -> Result<HabitId, HabitError> {
        let habit = draft.into_habit()?;
        let id = habit.id;
        info!(%id, title = %habit.title, "adding habit");
        self.habits.push(habit);
        self.persist();
        if let Some(habit) = self.habits.last() {
            self.schedule_reminders(habit);
        }
        Ok(id)
    }

    /// Decrements today's counter, or flips completion once the counter is exhausted.
    /// See [`Habit::advance`] for the transition table.
    pub fn advance_progress(&mut self, id: HabitId) -> Result<ProgressOutcome, HabitError> {
        let outcome = self.habit_mut(id)?.advance();
        debug!(%id, ?outcome, "advanced habit");
        self.persist();
        Ok(outcome)
    }

    /// Manual completion override. Returns the new completion flag.
    pub fn toggle_complete(&mut self, id: HabitId) -> Result<bool, HabitError> {
        let completed = self.habit_mut(id)?.toggle_completion();
        debug!(%id, completed, "toggled habit");
        self.persist();
        Ok(completed)
    }

    /// Overwrites the editable fields and resets today's counter to the new target.
    pub fn edit(
        &mut self,
        id: HabitId,
        title: impl Into<String>,
        description: impl Into<String>,
        daily_target: u32,
        color: HabitColor,
    ) -> Result<(), HabitError> {
        self.habit_mut(id)?
            .apply_edit(title.into(), description.into(), daily_target, color);
        info!(%id, daily_target, "edited habit");
        self.persist();
        Ok(())
    }
}

impl HabitStore {
    fn habit_mut(&mut self, id: HabitId) -> Result<&mut Habit, HabitError> {
        self.habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or(HabitError::NotFound(id))
    }

    fn read_habits(&self) -> Result<Vec<Habit>> {
        match self.storage.get(HABITS_KEY)? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_habits(&self) -> Result<()> {
        let payload = serde_json::to_vec(&self.habits)?;
        self.storage.set(HABITS_KEY, &payload)
    }

    fn schedule_reminders(&self, habit: &Habit) {
        let Some(sink) = &self.notification_sink else {
            return;
        };
        for record in reminders::plan_for_habit(habit) {
            sink.schedule(NotificationRequest::for_reminder(habit, &record));
        }
    }
}
