use crate::args::validation::{parse_date_or_datetime, parse_time};
use crate::notify::NotificationMethod;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find open tee times across golf booking sites", long_about = None)]
pub struct Cli {
    /// TOML file supplying defaults for database, smtp and polling settings.
    #[arg(long, global = true, value_name = "CONFIG_TOML")]
    pub config_toml: Option<PathBuf>,
    /// SQLite file holding saved searches.
    #[arg(long, global = true, value_name = "DATABASE_PATH")]
    pub db_path: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search now and print the results, or save the search with --create-search.
    FindTeeTimes(SearchArgs),
    /// Re-check every saved search on a loop and notify about new tee times.
    PollForTeeTimes,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SearchArgs {
    /// Start date or datetime, YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS. Defaults to the
    /// coming Saturday, or today on a Saturday or a Sunday before 5pm.
    #[arg(long, value_parser = parse_date_or_datetime)]
    pub start: Option<DateOrDateTime>,
    /// End date or datetime, same formats as --start. Defaults to the coming
    /// Sunday, or today on a Sunday before 5pm.
    #[arg(long, value_parser = parse_date_or_datetime)]
    pub end: Option<DateOrDateTime>,
    /// Courses to search, by name. All courses when omitted.
    #[arg(long, num_args = 1..)]
    pub courses: Vec<String>,
    #[arg(long, default_value_t = crate::model::DEFAULT_MIN_PLAYERS)]
    pub min_players: u32,
    /// Only tee times after this time of day, HH:MM:SS.
    #[arg(long, value_parser = parse_time)]
    pub earliest_time: Option<NaiveTime>,
    /// Only tee times before this time of day, HH:MM:SS.
    #[arg(long, value_parser = parse_time)]
    pub latest_time: Option<NaiveTime>,
    /// Only par 70+ courses.
    #[arg(long)]
    pub par_70_plus: bool,
    /// Only 18 hole courses.
    #[arg(long)]
    pub eighteen_holes: bool,
    /// Only 9 hole courses.
    #[arg(long)]
    pub nine_holes: bool,
    /// Max price per player, whole dollars.
    #[arg(long, allow_negative_numbers = true)]
    pub max_price: Option<i64>,
    #[arg(long, value_enum, default_value_t = NotificationMethod::Email)]
    pub notification_method: NotificationMethod,
    /// Where to send notifications. Falls back to the configured default.
    #[arg(long, num_args = 1..)]
    pub notification_destination: Vec<String>,
    /// Save the search and get notified as matching tee times open up.
    #[arg(long)]
    pub create_search: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrDateTime {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl DateOrDateTime {
    #[must_use]
    pub fn date(self) -> NaiveDate {
        match self {
            DateOrDateTime::Date(d) => d,
            DateOrDateTime::DateTime(dt) => dt.date(),
        }
    }

    #[must_use]
    pub fn time(self) -> Option<NaiveTime> {
        match self {
            DateOrDateTime::Date(_) => None,
            DateOrDateTime::DateTime(dt) => Some(dt.time()),
        }
    }
}
