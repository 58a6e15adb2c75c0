use crate::args::types::{DateOrDateTime, SearchArgs};
use crate::error::CoreError;
use crate::model::TeeTimeSearchParams;
use crate::notify::NotificationMethod;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Weekend searches roll over to next weekend once Sunday passes this hour.
const WEEKEND_CUTOFF_HOUR: u32 = 17;

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$",
    )
    .ok()
});

/// # Errors
///
/// Will return `Err` if the value is neither `YYYY-MM-DD` nor `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_date_or_datetime(value: &str) -> Result<DateOrDateTime, String> {
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(DateOrDateTime::Date(date));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Ok(DateOrDateTime::DateTime(dt));
    }
    Err(format!(
        "'{value}' does not match form YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
    ))
}

/// # Errors
///
/// Will return `Err` if the value is not `HH:MM:SS`.
pub fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|_| format!("'{value}' does not match form HH:MM:SS"))
}

fn before_cutoff(now: NaiveDateTime) -> bool {
    now.time().hour() < WEEKEND_CUTOFF_HOUR
}

/// The coming Saturday, or today on a Saturday or on a Sunday before 5pm.
#[must_use]
pub fn default_start(now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    let dow = today.weekday().num_days_from_sunday();
    if dow == 6 || (dow == 0 && before_cutoff(now)) {
        today
    } else {
        today + Days::new(u64::from(6 - dow))
    }
}

/// The coming Sunday, or today on a Sunday before 5pm.
#[must_use]
pub fn default_end(now: NaiveDateTime) -> NaiveDate {
    let today = now.date();
    let dow = today.weekday().num_days_from_sunday();
    if dow == 0 && before_cutoff(now) {
        today
    } else {
        today + Days::new(u64::from(7 - dow))
    }
}

#[must_use]
pub fn is_valid_email(address: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(address))
}

/// # Errors
///
/// Will return `Err` if any destination is malformed for the method.
pub fn check_destinations(
    method: NotificationMethod,
    destinations: &[String],
) -> Result<(), CoreError> {
    match method {
        NotificationMethod::Email => {
            if destinations.is_empty() {
                return Err(CoreError::Validation(
                    "at least one notification destination is required".to_string(),
                ));
            }
            if let Some(bad) = destinations.iter().find(|d| !is_valid_email(d)) {
                return Err(CoreError::Validation(format!(
                    "{bad} is not a valid email address"
                )));
            }
            Ok(())
        }
    }
}

impl SearchArgs {
    /// Resolves date defaults against `now` (course-local wall clock) and checks
    /// the flags against each other and against `known_courses`.
    ///
    /// # Errors
    ///
    /// Will return `Err` with `CoreError::Validation` describing the first bad flag.
    pub fn to_params(
        &self,
        known_courses: &[String],
        now: NaiveDateTime,
    ) -> Result<TeeTimeSearchParams, CoreError> {
        let start_date = self.start.map_or_else(|| default_start(now), DateOrDateTime::date);
        let start_time = self.start.and_then(DateOrDateTime::time);
        let end_date = self.end.map_or_else(|| default_end(now), DateOrDateTime::date);
        let end_time = self.end.and_then(DateOrDateTime::time);

        let inverted_times = matches!((start_time, end_time), (Some(s), Some(e)) if s > e);
        if start_date > end_date || (start_date == end_date && inverted_times) {
            return Err(CoreError::Validation("`start` must be before `end`".to_string()));
        }

        if let (Some(earliest), Some(latest)) = (self.earliest_time, self.latest_time)
            && earliest > latest
        {
            return Err(CoreError::Validation(
                "`earliest_time` must be before `latest_time`".to_string(),
            ));
        }

        if self.nine_holes && self.eighteen_holes {
            return Err(CoreError::Validation(
                "`nine-holes` and `eighteen-holes` cannot both be specified, use neither if you want both returned"
                    .to_string(),
            ));
        }

        let max_price = match self.max_price {
            None => None,
            Some(p) if p < 0 => {
                return Err(CoreError::Validation("max_price cannot be negative".to_string()));
            }
            Some(p) => Some(
                u32::try_from(p)
                    .map_err(|_| CoreError::Validation(format!("max_price {p} is too large")))?,
            ),
        };

        if let Some(unknown) = self.courses.iter().find(|c| !known_courses.contains(c)) {
            return Err(CoreError::Validation(format!("unknown course '{unknown}'")));
        }

        Ok(TeeTimeSearchParams {
            start_date,
            start_time,
            end_date,
            end_time,
            courses: (!self.courses.is_empty()).then(|| self.courses.clone()),
            par_70_plus: self.par_70_plus,
            eighteen_holes: self.eighteen_holes,
            nine_holes: self.nine_holes,
            min_players: self.min_players,
            earliest_time: self.earliest_time,
            latest_time: self.latest_time,
            max_price,
        })
    }

    /// Explicit destinations, else the configured default.
    #[must_use]
    pub fn destinations(&self, fallback: Option<&str>) -> Vec<String> {
        if self.notification_destination.is_empty() {
            fallback.map(|d| vec![d.to_string()]).unwrap_or_default()
        } else {
            self.notification_destination.clone()
        }
    }
}
