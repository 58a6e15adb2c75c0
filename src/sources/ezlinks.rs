//! EZLinks booking sites. One site can host several courses and a single search
//! call covers all of them.

use super::{SourceSession, TeeTimeQuery, TeeTimeSource, http_client, join_url, number_or_string};
use crate::error::CoreError;
use crate::model::{Course, CourseId, TeeTime, format_clock, insert_keep_higher_price};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub struct EzLinksSource {
    name: String,
    base_url: String,
    courses: Arc<[Course]>,
}

impl EzLinksSource {
    #[must_use]
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, courses: Vec<Course>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            courses: courses.into(),
        }
    }
}

#[async_trait]
impl TeeTimeSource for EzLinksSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn courses(&self) -> &[Course] {
        &self.courses
    }

    async fn open_session(&self) -> Result<Box<dyn SourceSession>, CoreError> {
        Ok(Box::new(EzLinksSession {
            client: http_client()?,
            search_url: join_url(&self.base_url, "search/search"),
            courses: Arc::clone(&self.courses),
        }))
    }
}

struct EzLinksSession {
    client: reqwest::Client,
    search_url: String,
    courses: Arc<[Course]>,
}

#[async_trait]
impl SourceSession for EzLinksSession {
    async fn get_tee_times(
        &mut self,
        courses: &[Course],
        query: &TeeTimeQuery,
    ) -> Result<Vec<TeeTime>, CoreError> {
        let matching: Vec<Course> = courses
            .iter()
            .filter(|c| self.courses.contains(c))
            .cloned()
            .collect();
        if matching.is_empty() {
            return Ok(Vec::new());
        }

        let response: SearchResponse = self
            .client
            .post(&self.search_url)
            .json(&SearchRequest::new(&matching, query))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_search_response(response, &matching, query)
    }
}

#[derive(Serialize, Debug)]
pub struct SearchRequest {
    p01: Vec<CourseId>,
    p02: String,
    p03: String,
    p04: String,
    p05: u32,
    p06: u32,
    p07: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(courses: &[Course], query: &TeeTimeQuery) -> Self {
        Self {
            p01: courses.iter().map(|c| c.id.clone()).collect(),
            p02: query.date.format("%m/%d/%Y").to_string(),
            p03: format_clock(query.earliest()),
            p04: format_clock(query.latest()),
            p05: 0,
            p06: query.min_players,
            p07: false,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    #[serde(rename = "r06", default)]
    pub rows: Vec<SearchRow>,
}

#[derive(Deserialize, Debug)]
pub struct SearchRow {
    #[serde(rename = "r07")]
    pub course_id: CourseId,
    #[serde(rename = "r11")]
    pub players: u32,
    #[serde(rename = "r15")]
    pub start: String,
    #[serde(rename = "r25", deserialize_with = "number_or_string")]
    pub price: f64,
}

/// The same slot can come back once per rate; the most expensive rate wins.
///
/// # Errors
///
/// Will return `Err` if a row names a course outside `matching` or has an
/// unparseable start time.
pub fn parse_search_response(
    response: SearchResponse,
    matching: &[Course],
    query: &TeeTimeQuery,
) -> Result<Vec<TeeTime>, CoreError> {
    let mut tee_times = Vec::new();
    for row in response.rows {
        if row.players < query.min_players || !query.within_price(row.price) {
            continue;
        }
        let course = matching
            .iter()
            .find(|c| c.id == row.course_id)
            .ok_or_else(|| CoreError::Parse(format!("unexpected course id {}", row.course_id)))?;
        let start = super::parse_vendor_time(&row.start)?;
        insert_keep_higher_price(
            &mut tee_times,
            TeeTime::new(course.clone(), &start, row.players, row.price),
        );
    }
    Ok(tee_times)
}

#[must_use]
pub fn sources() -> Vec<Arc<dyn TeeTimeSource>> {
    const LA_CITY_BOOKING: &str = "https://cityofla.ezlinksgolf.com/index.html#/preSearch";
    let la_city = |name: &str, id: i64| Course::new(name, id).booking_info(LA_CITY_BOOKING);

    vec![
        Arc::new(EzLinksSource::new(
            "LA City",
            "https://cityofla.ezlinksgolf.com/api",
            vec![
                la_city("Harding", 5997).par_70_plus(),
                la_city("Wilson", 5998).par_70_plus(),
                la_city("Hansen Dam", 5995).par_70_plus(),
                la_city("Hansen Dam - Back 9", 23128).nine_hole(),
                la_city("Harbor Park", 5996).nine_hole(),
                la_city("Los Feliz", 17679).par_3().nine_hole(),
                la_city("Penmar", 6171).nine_hole(),
                la_city("Rancho Park", 6204).par_70_plus(),
                la_city("Rancho Park - Back 9", 23129).nine_hole(),
                la_city("Rancho Park Par-3", 6205).par_3().nine_hole(),
                la_city("Roosevelt", 6226).nine_hole(),
                la_city("Balboa", 6264).par_70_plus(),
                la_city("Balboa - Back 9", 23131).nine_hole(),
                la_city("Encino", 6263).par_70_plus(),
                la_city("Encino - Back 9", 23130).nine_hole(),
                la_city("Woodley Lakes", 6380).par_70_plus(),
                la_city("Woodley Lakes - Back 9", 23132).nine_hole(),
            ],
        )),
        Arc::new(EzLinksSource::new(
            "Los Robles",
            "https://losrobles.ezlinksgolf.com/api",
            vec![
                Course::new("Los Robles", 6070)
                    .par_70_plus()
                    .booking_info("https://losrobles.ezlinksgolf.com/index.html#/search"),
            ],
        )),
        Arc::new(EzLinksSource::new(
            "Tierra Rejada",
            "https://tierrarejadapubpp.ezlinksgolf.com/api",
            vec![
                Course::new("Tierra Rejada - Back 9", 23231)
                    .nine_hole()
                    .booking_info("https://tierrarejadapubpp.ezlinksgolf.com/index.html#/search"),
                Course::new("Tierra Rejada", 19894)
                    .par_70_plus()
                    .booking_info("https://tierrarejadapubpp.ezlinksgolf.com/index.html#/search"),
            ],
        )),
    ]
}
