pub mod ezlinks;
pub mod foreup;
pub mod letsgogolf;
pub mod teeitup;

use crate::error::CoreError;
use crate::model::{Course, TeeTime, local_tee_time};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:109.0) Gecko/20100101 Firefox/110.0";

/// 5am
pub const DEFAULT_EARLIEST_TIME: NaiveTime = match NaiveTime::from_hms_opt(5, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// 7pm
pub const DEFAULT_LATEST_TIME: NaiveTime = match NaiveTime::from_hms_opt(19, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// One day's worth of criteria handed to a source.
#[derive(Debug, Clone, PartialEq)]
pub struct TeeTimeQuery {
    pub date: NaiveDate,
    pub earliest_time: Option<NaiveTime>,
    pub latest_time: Option<NaiveTime>,
    pub min_players: u32,
    pub max_price: Option<u32>,
}

impl TeeTimeQuery {
    #[must_use]
    pub fn earliest(&self) -> NaiveTime {
        self.earliest_time.unwrap_or(DEFAULT_EARLIEST_TIME)
    }

    #[must_use]
    pub fn latest(&self) -> NaiveTime {
        self.latest_time.unwrap_or(DEFAULT_LATEST_TIME)
    }

    #[must_use]
    pub fn within_window(&self, time: NaiveTime) -> bool {
        time > self.earliest() && time < self.latest()
    }

    #[must_use]
    pub fn within_price(&self, price: f64) -> bool {
        self.max_price.is_none_or(|max| price <= f64::from(max))
    }

    /// Client-side filter shared by vendors whose API can't filter for us.
    #[must_use]
    pub fn accepts(&self, tee_time: &TeeTime) -> bool {
        self.within_window(tee_time.time())
            && tee_time.num_golfers >= self.min_players
            && self.within_price(tee_time.price)
    }
}

/// A booking vendor integration owning a fixed set of courses.
#[async_trait]
pub trait TeeTimeSource: Send + Sync {
    fn name(&self) -> &str;

    fn courses(&self) -> &[Course];

    /// Opens the connection used for one search. The session belongs to a
    /// single task for the whole sweep over that search's intervals.
    async fn open_session(&self) -> Result<Box<dyn SourceSession>, CoreError>;
}

#[async_trait]
pub trait SourceSession: Send {
    /// # Errors
    ///
    /// Will return `Err` on transport or response-shape failures. Returns an
    /// empty list, without any I/O, when none of this source's courses is in
    /// `courses`.
    async fn get_tee_times(
        &mut self,
        courses: &[Course],
        query: &TeeTimeQuery,
    ) -> Result<Vec<TeeTime>, CoreError>;
}

/// Every vendor source this build knows about.
#[must_use]
pub fn default_sources() -> Vec<Arc<dyn TeeTimeSource>> {
    let mut sources: Vec<Arc<dyn TeeTimeSource>> = Vec::new();
    sources.extend(ezlinks::sources());
    sources.extend(foreup::sources());
    sources.extend(letsgogolf::sources());
    sources.extend(teeitup::sources());
    sources
}

/// # Errors
///
/// Will return `Err` if the client can't be built (TLS backend init).
pub fn http_client() -> Result<reqwest::Client, CoreError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CoreError::Network(e.to_string()))
}

/// Parses a vendor timestamp. Strings with an offset are converted; bare
/// wall-clock strings are read as course-local time.
///
/// # Errors
///
/// Will return `Err` if no known format matches or the local time doesn't exist.
pub fn parse_vendor_time(raw: &str) -> Result<DateTime<Tz>, CoreError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&crate::model::COURSE_TIMEZONE));
    }
    const LOCAL_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return local_tee_time(naive)
                .ok_or_else(|| CoreError::Parse(format!("'{raw}' is not a valid local time")));
        }
    }
    Err(CoreError::Parse(format!("unrecognized tee time '{raw}'")))
}

/// Vendors are inconsistent about quoting prices.
pub(crate) fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

/// The single course of a one-course source, if the caller asked for it.
pub(crate) fn requested<'a>(own: &'a Course, courses: &[Course]) -> Option<&'a Course> {
    courses.contains(own).then_some(own)
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
