use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use habit_core::{habit::parse_start_time, HabitColor, HabitId, WeekDay};

#[derive(Debug, Parser)]
#[command(name = "habitforge", version, about = "Track daily habits and their reminders")]
pub struct Cli {
    /// Directory holding the habit data (overrides HABITFORGE_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show open and completed habits
    List,
    /// Create a habit and register its reminders
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Completions required per day
        #[arg(short, long, default_value_t = 1)]
        target: u32,
        /// `#RRGGBB` or `#RRGGBBAA`
        #[arg(long, value_parser = parse_color)]
        color: Option<HabitColor>,
        /// Active weekday, repeat for several days
        #[arg(long = "day")]
        days: Vec<WeekDay>,
        /// Time of the first daily reminder
        #[arg(long, value_parser = parse_time)]
        start: Option<NaiveTime>,
        /// Hours between reminders when the target is above one
        #[arg(long)]
        interval: Option<u32>,
    },
    /// Count one completion, or flip a finished habit back open
    Advance { id: HabitId },
    /// Mark a habit done or not done
    Toggle { id: HabitId },
    /// Change a habit; today's progress restarts from the target
    Edit {
        id: HabitId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        target: Option<u32>,
        #[arg(long, value_parser = parse_color)]
        color: Option<HabitColor>,
    },
    /// Habits active on a weekday (defaults to today)
    Week {
        #[arg(long, conflicts_with = "date")]
        day: Option<WeekDay>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Completed versus total habits
    Stats,
    /// Reminder slots planned for a habit
    Reminders { id: HabitId },
}

fn parse_color(raw: &str) -> Result<HabitColor, String> {
    HabitColor::from_hex(raw).ok_or_else(|| format!("`{raw}` is not a #RRGGBB[AA] color"))
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    parse_start_time(raw).ok_or_else(|| format!("`{raw}` is not a time of day"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_repeated_days() {
        let cli = Cli::try_parse_from([
            "habitforge",
            "add",
            "Drink water",
            "--target",
            "3",
            "--day",
            "mon",
            "--day",
            "wednesday",
            "--start",
            "09:00",
            "--interval",
            "2",
            "--color",
            "#3366ff",
        ])
        .expect("parse");
        let Command::Add {
            title,
            target,
            days,
            start,
            interval,
            color,
            ..
        } = cli.command
        else {
            panic!("expected add");
        };
        assert_eq!(title, "Drink water");
        assert_eq!(target, 3);
        assert_eq!(days, vec![WeekDay::Monday, WeekDay::Wednesday]);
        assert_eq!(start, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(interval, Some(2));
        assert!(color.is_some());
    }

    #[test]
    fn rejects_malformed_id() {
        assert!(Cli::try_parse_from(["habitforge", "advance", "nope"]).is_err());
    }
}
