use crate::notify::NotificationMethod;
use crate::search::intervals::{Interval, build_intervals};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

pub const DEFAULT_MIN_PLAYERS: u32 = 4;

fn default_min_players() -> u32 {
    DEFAULT_MIN_PLAYERS
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeeTimeSearchParams {
    pub start_date: NaiveDate,
    /// Lower bound on the first day only.
    pub start_time: Option<NaiveTime>,
    pub end_date: NaiveDate,
    /// Upper bound on the last day only.
    pub end_time: Option<NaiveTime>,
    /// Course names; `None` searches every known course.
    pub courses: Option<Vec<String>>,
    pub par_70_plus: bool,
    pub eighteen_holes: bool,
    pub nine_holes: bool,
    #[serde(default = "default_min_players")]
    pub min_players: u32,
    #[serde(default)]
    pub earliest_time: Option<NaiveTime>,
    #[serde(default)]
    pub latest_time: Option<NaiveTime>,
    /// Per player, whole dollars.
    #[serde(default)]
    pub max_price: Option<u32>,
}

impl TeeTimeSearchParams {
    /// A search over `start_date..=end_date` with every filter left open.
    #[must_use]
    pub fn between(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            start_time: None,
            end_date,
            end_time: None,
            courses: None,
            par_70_plus: false,
            eighteen_holes: false,
            nine_holes: false,
            min_players: DEFAULT_MIN_PLAYERS,
            earliest_time: None,
            latest_time: None,
            max_price: None,
        }
    }

    #[must_use]
    pub fn intervals(&self) -> Vec<Interval> {
        build_intervals(
            self.start_date,
            self.start_time,
            self.end_date,
            self.end_time,
            self.earliest_time,
            self.latest_time,
        )
    }

    #[must_use]
    pub fn summary_message(&self) -> String {
        let mut msg = String::from("Search Parameters:");
        let _ = write!(msg, "\n\tStart Date: {}", format_day(self.start_date));
        if let Some(t) = self.start_time {
            let _ = write!(msg, "\n\tStart Time: {}", format_clock(t));
        }
        let _ = write!(msg, "\n\tEnd Date: {}", format_day(self.end_date));
        if let Some(t) = self.end_time {
            let _ = write!(msg, "\n\tEnd Time: {}", format_clock(t));
        }
        if let Some(courses) = self.courses.as_ref().filter(|c| !c.is_empty()) {
            let _ = write!(msg, "\n\tCourses: {}", courses.join(", "));
        }
        if self.par_70_plus {
            msg.push_str("\n\tPar 70+: true");
        }
        if self.eighteen_holes {
            msg.push_str("\n\t18 Holes: true");
        }
        if self.nine_holes {
            msg.push_str("\n\t9 Holes: true");
        }
        if self.min_players > 0 {
            let _ = write!(msg, "\n\tMin Players: {}", self.min_players);
        }
        if let Some(t) = self.earliest_time {
            let _ = write!(msg, "\n\tEarliest Time: {}", format_clock(t));
        }
        if let Some(t) = self.latest_time {
            let _ = write!(msg, "\n\tLatest Time: {}", format_clock(t));
        }
        if let Some(price) = self.max_price {
            let _ = write!(msg, "\n\tMax Price: ${price}");
        }
        msg
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SavedSearch {
    pub id: Uuid,
    pub notification_method: NotificationMethod,
    pub notification_destination: Vec<String>,
    pub search_params: TeeTimeSearchParams,
}

impl SavedSearch {
    #[must_use]
    pub fn new(
        notification_method: NotificationMethod,
        notification_destination: Vec<String>,
        search_params: TeeTimeSearchParams,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_method,
            notification_destination,
            search_params,
        }
    }

    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.search_params.end_date < today
    }
}

/// `6:05 AM`
#[must_use]
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// `Sat Oct 18th`
#[must_use]
pub fn format_day(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{} {day}{suffix}", date.format("%a %b"))
}
