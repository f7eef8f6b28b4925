use thiserror::Error;

use crate::habit::HabitId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HabitError {
    #[error("habit title must not be empty")]
    EmptyTitle,

    #[error("habit not found: {0}")]
    NotFound(HabitId),

    #[error("unknown weekday `{0}`")]
    UnknownWeekday(String),

    #[error("invalid habit id `{0}`")]
    InvalidId(String),
}
