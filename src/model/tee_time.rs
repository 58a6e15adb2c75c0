use crate::model::course::Course;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Every tee time is reported in this zone, whatever the vendor sends.
pub const COURSE_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TeeTime {
    pub course: Course,
    #[serde(with = "course_time")]
    pub tee_time: DateTime<Tz>,
    pub num_golfers: u32,
    pub price: f64,
}

impl TeeTime {
    #[must_use]
    pub fn new<T: TimeZone>(
        course: Course,
        tee_time: &DateTime<T>,
        num_golfers: u32,
        price: f64,
    ) -> Self {
        Self {
            course,
            tee_time: tee_time.with_timezone(&COURSE_TIMEZONE),
            num_golfers,
            price,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.tee_time.date_naive()
    }

    #[must_use]
    pub fn time(&self) -> NaiveTime {
        self.tee_time.time()
    }

    /// Stable text key for the slot instant, used by persistence. Keeps any
    /// sub-second part so two keys match exactly when the instants do.
    #[must_use]
    pub fn instant_key(&self) -> String {
        self.tee_time
            .with_timezone(&Utc)
            .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
    }
}

// price and capacity change between polls; the slot itself does not
impl PartialEq for TeeTime {
    fn eq(&self, other: &Self) -> bool {
        self.course == other.course && self.tee_time == other.tee_time
    }
}

impl Eq for TeeTime {}

impl Hash for TeeTime {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.course.hash(state);
        self.tee_time.hash(state);
    }
}

/// Interprets a wall-clock reading at the course. Ambiguous readings (DST fall
/// back) take the earlier instant; readings inside the spring-forward gap are `None`.
#[must_use]
pub fn local_tee_time(naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    COURSE_TIMEZONE.from_local_datetime(&naive).earliest()
}

/// Today's date at the courses.
#[must_use]
pub fn course_today() -> NaiveDate {
    Utc::now().with_timezone(&COURSE_TIMEZONE).date_naive()
}

/// Adds `tee_time` to `tee_times`, or when the same slot is already present keeps
/// whichever of the two has the higher price.
pub fn insert_keep_higher_price(tee_times: &mut Vec<TeeTime>, tee_time: TeeTime) {
    match tee_times.iter_mut().find(|t| **t == tee_time) {
        Some(existing) => {
            if tee_time.price > existing.price {
                *existing = tee_time;
            }
        }
        None => tee_times.push(tee_time),
    }
}

mod course_time {
    use super::COURSE_TIMEZONE;
    use chrono::DateTime;
    use chrono_tz::Tz;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Tz>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&COURSE_TIMEZONE))
            .map_err(serde::de::Error::custom)
    }
}
