//! TeeItUp (Kenna) facilities. One facility per source; the API also wants the
//! facility's alias in a header.

use super::{
    SourceSession, TeeTimeQuery, TeeTimeSource, http_client, join_url, parse_vendor_time,
    requested,
};
use crate::error::CoreError;
use crate::model::{Course, TeeTime};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

const BASE_URL: &str = "https://phx-api-be-east-1b.kenna.io/v2";

pub struct TeeItUpSource {
    name: String,
    base_url: String,
    course: Course,
    alias: String,
}

impl TeeItUpSource {
    #[must_use]
    pub fn new(name: impl Into<String>, course: Course, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: BASE_URL.to_string(),
            course,
            alias: alias.into(),
        }
    }
}

#[async_trait]
impl TeeTimeSource for TeeItUpSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn courses(&self) -> &[Course] {
        std::slice::from_ref(&self.course)
    }

    async fn open_session(&self) -> Result<Box<dyn SourceSession>, CoreError> {
        Ok(Box::new(TeeItUpSession {
            client: http_client()?,
            tee_times_url: join_url(&self.base_url, "tee-times"),
            course: self.course.clone(),
            alias: self.alias.clone(),
        }))
    }
}

struct TeeItUpSession {
    client: reqwest::Client,
    tee_times_url: String,
    course: Course,
    alias: String,
}

#[async_trait]
impl SourceSession for TeeItUpSession {
    async fn get_tee_times(
        &mut self,
        courses: &[Course],
        query: &TeeTimeQuery,
    ) -> Result<Vec<TeeTime>, CoreError> {
        let Some(course) = requested(&self.course, courses) else {
            return Ok(Vec::new());
        };

        let date = query.date.format("%Y-%m-%d").to_string();
        let facility = course.id.to_string();
        let facilities: Vec<Facility> = self
            .client
            .get(&self.tee_times_url)
            .query(&[("date", date.as_str()), ("facilityIds", facility.as_str())])
            .header("x-be-alias", &self.alias)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_facilities(facilities, course, query)
    }
}

#[derive(Deserialize, Debug)]
pub struct Facility {
    #[serde(default)]
    pub teetimes: Vec<Slot>,
}

#[derive(Deserialize, Debug)]
pub struct Slot {
    /// UTC, RFC 3339
    pub teetime: String,
    #[serde(default)]
    pub rates: Vec<Rate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Rate {
    #[serde(default)]
    pub allowed_players: Vec<u32>,
    /// cents
    pub green_fee_cart: i64,
    pub holes: u32,
}

/// Only the first facility and each slot's first rate are considered, and only
/// 18 hole rates are kept.
///
/// # Errors
///
/// Will return `Err` if a slot's time can't be parsed.
pub fn parse_facilities(
    facilities: Vec<Facility>,
    course: &Course,
    query: &TeeTimeQuery,
) -> Result<Vec<TeeTime>, CoreError> {
    let Some(facility) = facilities.into_iter().next() else {
        return Ok(Vec::new());
    };

    let mut tee_times = Vec::new();
    for slot in facility.teetimes {
        let Some(rate) = slot.rates.first() else {
            continue;
        };
        if rate.holes != 18 {
            continue;
        }
        let start = parse_vendor_time(&slot.teetime)?;
        let num_golfers = rate.allowed_players.iter().copied().max().unwrap_or(0);
        #[allow(clippy::cast_precision_loss)]
        let price = rate.green_fee_cart as f64 / 100.0;
        let tee_time = TeeTime::new(course.clone(), &start, num_golfers, price);
        if query.accepts(&tee_time) {
            tee_times.push(tee_time);
        }
    }
    Ok(tee_times)
}

#[must_use]
pub fn sources() -> Vec<Arc<dyn TeeTimeSource>> {
    vec![
        Arc::new(TeeItUpSource::new(
            "Industry Hills Ike",
            Course::new("Industry Hills - Ike", 6430)
                .par_70_plus()
                .booking_info("(626) 810-4653"),
            "industry-hills-golf-club-ike-course",
        )),
        Arc::new(TeeItUpSource::new(
            "Industry Hills Babe",
            Course::new("Industry Hills - Babe", 4735)
                .par_70_plus()
                .booking_info("(626) 810-4653"),
            "industry-hills-golf-club-babe-course",
        )),
    ]
}
