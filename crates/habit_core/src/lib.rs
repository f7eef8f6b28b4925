pub mod error;
pub mod form;
pub mod habit;
pub mod notifications;
pub mod query;
pub mod reminders;
pub mod storage;
pub mod store;

pub use crate::error::HabitError;
pub use crate::habit::{Habit, HabitColor, HabitDraft, HabitId, ProgressOutcome, WeekDay};
pub use crate::form::NewHabitForm;
pub use crate::store::{HabitStore, HabitStoreBuilder};
