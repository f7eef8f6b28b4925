use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HabitError;

/// Opaque identifier assigned once when a habit is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HabitId {
    type Err = HabitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| HabitError::InvalidId(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WeekDay {
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
        WeekDay::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
            WeekDay::Saturday => "saturday",
            WeekDay::Sunday => "sunday",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
        }
    }

    /// Calendar trigger numbering used by notification hosts: 1 = Sunday ... 7 = Saturday.
    pub fn calendar_index(self) -> u8 {
        match self {
            WeekDay::Sunday => 1,
            WeekDay::Monday => 2,
            WeekDay::Tuesday => 3,
            WeekDay::Wednesday => 4,
            WeekDay::Thursday => 5,
            WeekDay::Friday => 6,
            WeekDay::Saturday => 7,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl fmt::Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekDay {
    type Err = HabitError;

    /// Accepts full names or three-letter abbreviations, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        WeekDay::ALL
            .into_iter()
            .find(|day| {
                day.as_str() == needle || (needle.len() == 3 && day.as_str().starts_with(&needle))
            })
            .ok_or_else(|| HabitError::UnknownWeekday(s.to_string()))
    }
}

impl From<Weekday> for WeekDay {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => WeekDay::Monday,
            Weekday::Tue => WeekDay::Tuesday,
            Weekday::Wed => WeekDay::Wednesday,
            Weekday::Thu => WeekDay::Thursday,
            Weekday::Fri => WeekDay::Friday,
            Weekday::Sat => WeekDay::Saturday,
            Weekday::Sun => WeekDay::Sunday,
        }
    }
}

impl From<WeekDay> for Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Monday => Weekday::Mon,
            WeekDay::Tuesday => Weekday::Tue,
            WeekDay::Wednesday => Weekday::Wed,
            WeekDay::Thursday => Weekday::Thu,
            WeekDay::Friday => Weekday::Fri,
            WeekDay::Saturday => Weekday::Sat,
            WeekDay::Sunday => Weekday::Sun,
        }
    }
}

/// Normalized RGBA, every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HabitColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl HabitColor {
    pub const RED: HabitColor = HabitColor {
        red: 1.0,
        green: 0.0,
        blue: 0.0,
        alpha: 1.0,
    };

    pub fn new(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red: normalize_channel(red),
            green: normalize_channel(green),
            blue: normalize_channel(blue),
            alpha: normalize_channel(alpha),
        }
    }

    /// Parses `#RRGGBB` or `#RRGGBBAA`.
    pub fn from_hex(input: &str) -> Option<Self> {
        let digits = input.trim().trim_start_matches('#');
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |idx: usize| -> Option<f64> {
            u8::from_str_radix(&digits[idx..idx + 2], 16)
                .ok()
                .map(|value| f64::from(value) / 255.0)
        };
        let alpha = if digits.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?, alpha))
    }
}

impl Default for HabitColor {
    fn default() -> Self {
        Self::RED
    }
}

fn normalize_channel(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Transition taken by [`Habit::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    Decremented { remaining: u32 },
    Completed,
    Reopened { remaining: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub title: String,
    pub is_completed: bool,
    #[serde(rename = "habitDescription")]
    pub description: String,
    pub daily_target: u32,
    // Stored key keeps the historical spelling so existing data still decodes.
    #[serde(rename = "remaininToday")]
    pub remaining_today: u32,
    #[serde(rename = "habitColor")]
    pub color: HabitColor,
    pub active_days: Vec<WeekDay>,
    #[serde(
        default,
        with = "start_time_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval_hours: Option<u32>,
}

impl Habit {
    /// Fraction of today's target already done.
    pub fn progress(&self) -> f64 {
        if self.daily_target == 0 {
            return if self.is_completed { 1.0 } else { 0.0 };
        }
        let remaining = self.remaining_today.min(self.daily_target);
        1.0 - f64::from(remaining) / f64::from(self.daily_target)
    }

    pub fn is_active_on(&self, day: WeekDay) -> bool {
        self.active_days.contains(&day)
    }

    /// The repeat interval only applies when more than one completion is required.
    pub fn effective_repeat_interval(&self) -> Option<u32> {
        if self.daily_target > 1 {
            self.repeat_interval_hours
        } else {
            None
        }
    }

    /// Single progress intent. The branch depends on the current counter:
    ///
    /// | remaining | completed | result                                   |
    /// |-----------|-----------|------------------------------------------|
    /// | n > 1     | any       | remaining = n - 1                        |
    /// | 1         | any       | remaining = 0, completed                 |
    /// | 0         | true      | completed = false, remaining = target    |
    /// | 0         | false     | completed = true                         |
    pub fn advance(&mut self) -> ProgressOutcome {
        if self.remaining_today > 0 {
            self.remaining_today -= 1;
            if self.remaining_today == 0 {
                self.is_completed = true;
                ProgressOutcome::Completed
            } else {
                ProgressOutcome::Decremented {
                    remaining: self.remaining_today,
                }
            }
        } else if self.is_completed {
            self.reopen();
            ProgressOutcome::Reopened {
                remaining: self.remaining_today,
            }
        } else {
            self.is_completed = true;
            ProgressOutcome::Completed
        }
    }

    /// Manual override of the completion flag. Returns the new flag.
    pub fn toggle_completion(&mut self) -> bool {
        if self.is_completed {
            self.reopen();
        } else {
            self.remaining_today = 0;
            self.is_completed = true;
        }
        self.is_completed
    }

    /// Overwrites the editable fields and discards today's progress.
    pub fn apply_edit(
        &mut self,
        title: String,
        description: String,
        daily_target: u32,
        color: HabitColor,
    ) {
        self.title = title;
        self.description = description;
        self.daily_target = daily_target;
        self.remaining_today = daily_target;
        self.color = color;
        self.is_completed = daily_target == 0;
    }

    fn reopen(&mut self) {
        self.is_completed = false;
        self.remaining_today = self.daily_target;
    }
}

/// Caller-supplied fields for a habit that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct HabitDraft {
    pub title: String,
    pub description: String,
    pub daily_target: u32,
    pub color: HabitColor,
    pub active_days: Vec<WeekDay>,
    pub start_time: Option<NaiveTime>,
    pub repeat_interval_hours: Option<u32>,
}

impl Default for HabitDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            daily_target: 1,
            color: HabitColor::default(),
            active_days: Vec::new(),
            start_time: None,
            repeat_interval_hours: None,
        }
    }
}

impl HabitDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_daily_target(mut self, daily_target: u32) -> Self {
        self.daily_target = daily_target;
        self
    }

    pub fn with_color(mut self, color: HabitColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_active_days(mut self, days: impl IntoIterator<Item = WeekDay>) -> Self {
        self.active_days = days.into_iter().collect();
        self
    }

    pub fn with_start_time(mut self, start_time: NaiveTime) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_repeat_interval_hours(mut self, hours: u32) -> Self {
        self.repeat_interval_hours = Some(hours);
        self
    }

    pub fn validate(&self) -> Result<(), HabitError> {
        if self.title.is_empty() {
            return Err(HabitError::EmptyTitle);
        }
        Ok(())
    }

    pub fn into_habit(self) -> Result<Habit, HabitError> {
        self.validate()?;
        let mut active_days: Vec<WeekDay> = Vec::with_capacity(self.active_days.len());
        for day in self.active_days {
            if !active_days.contains(&day) {
                active_days.push(day);
            }
        }
        let repeat_interval_hours = if self.daily_target > 1 {
            self.repeat_interval_hours
        } else {
            None
        };
        Ok(Habit {
            id: HabitId::new(),
            title: self.title,
            is_completed: false,
            description: self.description,
            daily_target: self.daily_target,
            remaining_today: self.daily_target,
            color: self.color,
            active_days,
            start_time: self.start_time,
            repeat_interval_hours,
        })
    }
}

/// Parses a wall-clock time from `HH:MM[:SS[.fff]]` or an RFC 3339 timestamp.
pub fn parse_start_time(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|dt| dt.time())
        })
}

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z, the reference date of
/// numerically encoded timestamps written by older builds.
const REFERENCE_DATE_UNIX: i64 = 978_307_200;

/// Local wall-clock time of a reference-date timestamp.
pub fn start_time_from_reference_seconds(seconds: f64) -> Option<NaiveTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    let unix = REFERENCE_DATE_UNIX.checked_add(whole as i64)?;
    chrono::DateTime::from_timestamp(unix, nanos).map(|dt| dt.with_timezone(&Local).time())
}

mod start_time_format {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_str(&time.format("%H:%M:%S%.f").to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Unreadable values decode as no start time so one bad field never drops the collection.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let parsed = match &raw {
            Value::Null => return Ok(None),
            Value::String(text) => super::parse_start_time(text),
            Value::Number(number) => number
                .as_f64()
                .and_then(super::start_time_from_reference_seconds),
            _ => None,
        };
        if parsed.is_none() {
            tracing::warn!(value = %raw, "ignoring unreadable start time");
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit_with_target(target: u32) -> Habit {
        HabitDraft::new("Read")
            .with_daily_target(target)
            .into_habit()
            .unwrap()
    }

    #[test]
    fn draft_initializes_counter_to_target() {
        let habit = habit_with_target(3);
        assert_eq!(habit.remaining_today, 3);
        assert!(!habit.is_completed);
        assert_eq!(habit.progress(), 0.0);
    }

    #[test]
    fn draft_rejects_empty_title() {
        let err = HabitDraft::new("").into_habit().unwrap_err();
        assert_eq!(err, HabitError::EmptyTitle);
    }

    #[test]
    fn draft_drops_interval_for_single_completion() {
        let habit = HabitDraft::new("Stretch")
            .with_daily_target(1)
            .with_repeat_interval_hours(2)
            .into_habit()
            .unwrap();
        assert_eq!(habit.repeat_interval_hours, None);
    }

    #[test]
    fn draft_deduplicates_days_in_order() {
        let habit = HabitDraft::new("Walk")
            .with_active_days([WeekDay::Friday, WeekDay::Monday, WeekDay::Friday])
            .into_habit()
            .unwrap();
        assert_eq!(habit.active_days, vec![WeekDay::Friday, WeekDay::Monday]);
    }

    #[test]
    fn advance_decrements_until_completed() {
        let mut habit = habit_with_target(2);
        assert_eq!(
            habit.advance(),
            ProgressOutcome::Decremented { remaining: 1 }
        );
        assert!(!habit.is_completed);
        assert_eq!(habit.advance(), ProgressOutcome::Completed);
        assert!(habit.is_completed);
        assert_eq!(habit.remaining_today, 0);
        assert_eq!(habit.progress(), 1.0);
    }

    #[test]
    fn advance_on_completed_habit_reopens_it() {
        let mut habit = habit_with_target(2);
        habit.advance();
        habit.advance();
        assert_eq!(habit.advance(), ProgressOutcome::Reopened { remaining: 2 });
        assert!(!habit.is_completed);
        assert_eq!(habit.remaining_today, 2);
    }

    #[test]
    fn advance_with_zero_counter_and_open_flag_completes() {
        let mut habit = habit_with_target(0);
        assert_eq!(habit.advance(), ProgressOutcome::Completed);
        assert!(habit.is_completed);
    }

    #[test]
    fn toggle_keeps_counter_consistent() {
        let mut habit = habit_with_target(4);
        habit.advance();
        assert!(habit.toggle_completion());
        assert_eq!(habit.remaining_today, 0);
        assert!(!habit.toggle_completion());
        assert_eq!(habit.remaining_today, 4);
    }

    #[test]
    fn edit_discards_progress() {
        let mut habit = habit_with_target(3);
        habit.advance();
        habit.advance();
        habit.advance();
        habit.apply_edit(
            "Run".into(),
            "5k".into(),
            5,
            HabitColor::new(0.0, 0.5, 1.0, 1.0),
        );
        assert_eq!(habit.remaining_today, 5);
        assert!(!habit.is_completed);
        assert_eq!(habit.title, "Run");
    }

    #[test]
    fn color_channels_are_clamped() {
        let color = HabitColor::new(1.5, -0.2, f64::NAN, 0.5);
        assert_eq!(color, HabitColor::new(1.0, 0.0, 0.0, 0.5));
        let parsed = HabitColor::from_hex("#00ff00").unwrap();
        assert_eq!(parsed, HabitColor::new(0.0, 1.0, 0.0, 1.0));
        assert!(HabitColor::from_hex("#abc").is_none());
    }

    #[test]
    fn weekday_parsing_and_calendar_numbering() {
        assert_eq!("Mon".parse::<WeekDay>().unwrap(), WeekDay::Monday);
        assert_eq!("sunday".parse::<WeekDay>().unwrap(), WeekDay::Sunday);
        assert!("funday".parse::<WeekDay>().is_err());
        assert_eq!(WeekDay::Sunday.calendar_index(), 1);
        assert_eq!(WeekDay::Saturday.calendar_index(), 7);
        let date = NaiveDate::from_ymd_opt(2025, 9, 24).unwrap();
        assert_eq!(WeekDay::from_date(date), WeekDay::Wednesday);
    }

    #[test]
    fn serializes_with_stored_field_names() {
        let habit = HabitDraft::new("Drink water")
            .with_daily_target(3)
            .with_active_days([WeekDay::Monday])
            .with_start_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap())
            .with_repeat_interval_hours(2)
            .into_habit()
            .unwrap();
        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(value["remaininToday"], 3);
        assert_eq!(value["habitDescription"], "");
        assert_eq!(value["activeDays"][0], "monday");
        assert_eq!(value["startTime"], "09:00:00");
        assert_eq!(value["repeatIntervalHours"], 2);
        assert_eq!(value["habitColor"]["red"], 1.0);
    }

    #[test]
    fn start_time_accepts_timestamps() {
        assert_eq!(
            parse_start_time("2025-09-24T08:30:00Z"),
            NaiveTime::from_hms_opt(8, 30, 0)
        );
        assert_eq!(parse_start_time("07:15"), NaiveTime::from_hms_opt(7, 15, 0));
        assert_eq!(parse_start_time("later"), None);
        assert_eq!(
            parse_start_time("09:00:00.500"),
            NaiveTime::from_hms_milli_opt(9, 0, 0, 500)
        );
    }

    #[test]
    fn fractional_start_time_survives_encoding() {
        let mut habit = habit_with_target(1);
        habit.start_time = NaiveTime::from_hms_milli_opt(9, 0, 0, 500);
        let json = serde_json::to_string(&habit).unwrap();
        let decoded: Habit = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, habit);

        habit.start_time = NaiveTime::from_hms_opt(9, 0, 0);
        let value = serde_json::to_value(&habit).unwrap();
        assert_eq!(value["startTime"], "09:00:00");
    }

    #[test]
    fn numeric_start_time_uses_reference_date() {
        let seconds = 780_393_600.0;
        let expected = chrono::DateTime::from_timestamp(978_307_200 + 780_393_600, 0)
            .unwrap()
            .with_timezone(&Local)
            .time();
        assert_eq!(start_time_from_reference_seconds(seconds), Some(expected));
        assert_eq!(start_time_from_reference_seconds(f64::NAN), None);
    }

    #[test]
    fn unreadable_start_time_decodes_as_none() {
        let mut value = serde_json::to_value(habit_with_target(2)).unwrap();
        value["startTime"] = serde_json::json!(true);
        let decoded: Habit = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(decoded.start_time, None);

        value["startTime"] = serde_json::json!("soon");
        let decoded: Habit = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.start_time, None);
        assert_eq!(decoded.remaining_today, 2);
    }

    #[test]
    fn hex_colors_survive_encoding() {
        for value in 0..=255u8 {
            let hex = format!("#{value:02x}{value:02x}{value:02x}{value:02x}");
            let color = HabitColor::from_hex(&hex).unwrap();
            let json = serde_json::to_string(&color).unwrap();
            let decoded: HabitColor = serde_json::from_str(&json).unwrap();
            assert_eq!(decoded, color, "channel {value}");
        }
    }
}
