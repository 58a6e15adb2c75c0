//! ForeUp schedules. The API answers for one schedule (course) per call, so each
//! source owns exactly one course.

use super::{
    SourceSession, TeeTimeQuery, TeeTimeSource, http_client, join_url, number_or_string,
    parse_vendor_time, requested,
};
use crate::error::CoreError;
use crate::model::{Course, TeeTime};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const BASE_URL: &str = "https://foreupsoftware.com/index.php/api";

pub struct ForeUpSource {
    name: String,
    base_url: String,
    course: Course,
}

impl ForeUpSource {
    #[must_use]
    pub fn new(name: impl Into<String>, course: Course) -> Self {
        Self {
            name: name.into(),
            base_url: BASE_URL.to_string(),
            course,
        }
    }
}

#[async_trait]
impl TeeTimeSource for ForeUpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn courses(&self) -> &[Course] {
        std::slice::from_ref(&self.course)
    }

    async fn open_session(&self) -> Result<Box<dyn SourceSession>, CoreError> {
        Ok(Box::new(ForeUpSession {
            client: http_client()?,
            times_url: join_url(&self.base_url, "booking/times"),
            course: self.course.clone(),
        }))
    }
}

struct ForeUpSession {
    client: reqwest::Client,
    times_url: String,
    course: Course,
}

#[async_trait]
impl SourceSession for ForeUpSession {
    async fn get_tee_times(
        &mut self,
        courses: &[Course],
        query: &TeeTimeQuery,
    ) -> Result<Vec<TeeTime>, CoreError> {
        let Some(course) = requested(&self.course, courses) else {
            return Ok(Vec::new());
        };

        let schedule_id = course.id.to_string();
        let date = query.date.format("%m-%d-%Y").to_string();
        let rows: Vec<TimeRow> = self
            .client
            .get(&self.times_url)
            .query(&[
                ("time", "all"),
                ("date", date.as_str()),
                ("holes", "all"),
                ("players", "0"),
                ("api_key", "no_limits"),
                ("schedule_id", schedule_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_times(rows, course, query)
    }
}

#[derive(Deserialize, Debug)]
pub struct TimeRow {
    /// `YYYY-MM-DD HH:mm`, course local
    pub time: String,
    pub available_spots: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub green_fee: f64,
}

/// # Errors
///
/// Will return `Err` if a row's time can't be parsed.
pub fn parse_times(
    rows: Vec<TimeRow>,
    course: &Course,
    query: &TeeTimeQuery,
) -> Result<Vec<TeeTime>, CoreError> {
    let mut tee_times = Vec::new();
    for row in rows {
        let start = parse_vendor_time(&row.time)?;
        let tee_time = TeeTime::new(course.clone(), &start, row.available_spots, row.green_fee);
        if query.accepts(&tee_time) {
            tee_times.push(tee_time);
        }
    }
    Ok(tee_times)
}

#[must_use]
pub fn sources() -> Vec<Arc<dyn TeeTimeSource>> {
    let bethpage = |color: &str, id: i64, booking: &str| -> Arc<dyn TeeTimeSource> {
        Arc::new(ForeUpSource::new(
            format!("Bethpage {color}"),
            Course::new(format!("Bethpage - {color}"), id)
                .par_70_plus()
                .booking_info(format!("https://foreupsoftware.com/index.php/booking/19765/{booking}#teetimes")),
        ))
    };

    vec![
        Arc::new(ForeUpSource::new(
            "Westchester",
            Course::new("Westchester", 3786)
                .booking_info("https://foreupsoftware.com/index.php/booking/20137/3786#/teetimes"),
        )),
        Arc::new(ForeUpSource::new(
            "Rustic Canyon",
            Course::new("Rustic Canyon", 9285)
                .par_70_plus()
                .booking_info("https://foreupsoftware.com/index.php/booking/21903/9285#teetimes"),
        )),
        bethpage("Black", 2431, "2431"),
        bethpage("Red", 2432, "2432"),
        bethpage("Blue", 2433, "2433"),
        bethpage("Green", 2434, "2434"),
        bethpage("Yellow", 2435, "0"),
    ]
}
