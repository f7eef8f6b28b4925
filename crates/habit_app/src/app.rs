use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use habit_core::{
    notifications::{NotificationRequest, NotificationSink},
    query, reminders,
    storage::FileKeyValueStore,
    Habit, HabitDraft, HabitId, HabitStore, NewHabitForm, ProgressOutcome, WeekDay,
};
use tracing::{debug, info};

use crate::cli::Command;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) data_dir: PathBuf,
    pub(crate) notifications: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("HABITFORGE_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(flag) = std::env::var("HABITFORGE_NOTIFICATIONS") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => config.notifications = false,
                "1" | "true" | "on" | "yes" => config.notifications = true,
                other => debug!(value = other, "ignoring unrecognized HABITFORGE_NOTIFICATIONS"),
            }
        }
        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications = enabled;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = home::home_dir()
            .map(|home| home.join(".habitforge"))
            .unwrap_or_else(|| PathBuf::from(".habitforge"));
        Self {
            data_dir,
            notifications: true,
        }
    }
}

/// Stands in for the host notification center: every registration is logged.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn schedule(&self, notification: NotificationRequest) {
        info!(
            identifier = %notification.identifier,
            weekday = %notification.weekday,
            hour = notification.hour,
            minute = notification.minute,
            repeats = notification.repeats,
            "registered reminder"
        );
    }
}

pub fn open_store(config: &AppConfig) -> HabitStore {
    info!(path = %config.data_dir.display(), "opening habit store");
    let mut builder =
        HabitStore::builder().with_storage(Box::new(FileKeyValueStore::new(&config.data_dir)));
    if config.notifications {
        builder = builder.with_notification_sink(Box::new(LogSink));
    }
    builder.build()
}

pub fn run(config: &AppConfig, command: Command) -> Result<()> {
    let mut store = open_store(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(&mut store, command, &mut out)
}

/// Applies one intent to the store and renders the result.
pub fn execute(store: &mut HabitStore, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::List => render_list(store.habits(), out)?,
        Command::Add {
            title,
            description,
            target,
            color,
            days,
            start,
            interval,
        } => {
            let mut draft = HabitDraft::new(title)
                .with_description(description)
                .with_daily_target(target)
                .with_active_days(days);
            if let Some(color) = color {
                draft = draft.with_color(color);
            }
            draft.start_time = start;
            draft.repeat_interval_hours = interval;

            let mut form = NewHabitForm::new(draft);
            let Some(id) = form.submit(store) else {
                if form.title_warning {
                    bail!("you need to give your habit a name");
                }
                bail!("habit could not be added");
            };
            writeln!(out, "added {id}")?;
        }
        Command::Advance { id } => {
            let outcome = store.advance_progress(id)?;
            let habit = find(store, id)?;
            match outcome {
                ProgressOutcome::Decremented { remaining } => {
                    writeln!(out, "{}: {remaining} left today", habit.title)?
                }
                ProgressOutcome::Completed => writeln!(out, "{}: done for today", habit.title)?,
                ProgressOutcome::Reopened { remaining } => {
                    writeln!(out, "{}: reopened, {remaining} to go", habit.title)?
                }
            }
        }
        Command::Toggle { id } => {
            let completed = store.toggle_complete(id)?;
            let state = if completed { "completed" } else { "open" };
            writeln!(out, "{}: {state}", find(store, id)?.title)?;
        }
        Command::Edit {
            id,
            title,
            description,
            target,
            color,
        } => {
            let current = find(store, id)?.clone();
            store.edit(
                id,
                title.unwrap_or(current.title),
                description.unwrap_or(current.description),
                target.unwrap_or(current.daily_target),
                color.unwrap_or(current.color),
            )?;
            writeln!(out, "updated {id}")?;
        }
        Command::Week { day, date } => {
            let day = day
                .or_else(|| date.map(WeekDay::from_date))
                .unwrap_or_else(|| WeekDay::from_date(Local::now().date_naive()));
            writeln!(out, "{}", day.label())?;
            for habit in query::active_on(store.habits(), day) {
                match habit.start_time {
                    Some(time) => writeln!(out, "  {}  {}", habit.title, time.format("%H:%M"))?,
                    None => writeln!(out, "  {}", habit.title)?,
                }
            }
        }
        Command::Stats => {
            let stats = query::completion_stats(store.habits());
            writeln!(
                out,
                "Completed: {}/{} ({:.0}%)",
                stats.completed,
                stats.total,
                stats.ratio() * 100.0
            )?;
        }
        Command::Reminders { id } => {
            let habit = find(store, id)?;
            for record in reminders::plan_for_habit(habit) {
                writeln!(
                    out,
                    "{}  {} {:02}:{:02}",
                    record.identifier,
                    record.weekday.label(),
                    record.hour,
                    record.minute
                )?;
            }
        }
    }
    Ok(())
}

fn find(store: &HabitStore, id: HabitId) -> Result<&Habit> {
    store
        .get(id)
        .with_context(|| format!("habit {id} not found"))
}

fn render_list(habits: &[Habit], out: &mut impl Write) -> Result<()> {
    let stats = query::completion_stats(habits);
    writeln!(out, "Completed: {}/{}", stats.completed, stats.total)?;
    writeln!(out, "Habits")?;
    for habit in query::pending(habits) {
        render_row(habit, out)?;
    }
    writeln!(out, "Completed")?;
    for habit in query::completed(habits) {
        render_row(habit, out)?;
    }
    Ok(())
}

fn render_row(habit: &Habit, out: &mut impl Write) -> Result<()> {
    let done = habit.daily_target.saturating_sub(habit.remaining_today);
    writeln!(
        out,
        "  {}  {}  {}/{}  {:.0}%",
        habit.id,
        habit.title,
        done,
        habit.daily_target,
        habit.progress() * 100.0
    )?;
    Ok(())
}
