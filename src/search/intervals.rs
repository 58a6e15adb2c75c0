use chrono::{NaiveDate, NaiveTime};

/// One day's query window. A missing bound means "use the source's default".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub date: NaiveDate,
    pub earliest_time: Option<NaiveTime>,
    pub latest_time: Option<NaiveTime>,
}

/// Splits a date range into one [`Interval`] per calendar day, inclusive.
///
/// `start_time` bounds only the first day and `end_time` only the last; both fall
/// back to the every-day `earliest_time` / `latest_time`. When `start_date ==
/// end_date` the single interval gets both day-specific bounds.
/// An inverted range yields no intervals.
#[must_use]
pub fn build_intervals(
    start_date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_date: NaiveDate,
    end_time: Option<NaiveTime>,
    earliest_time: Option<NaiveTime>,
    latest_time: Option<NaiveTime>,
) -> Vec<Interval> {
    start_date
        .iter_days()
        .take_while(|date| *date <= end_date)
        .map(|date| Interval {
            date,
            earliest_time: if date == start_date {
                start_time.or(earliest_time)
            } else {
                earliest_time
            },
            latest_time: if date == end_date {
                end_time.or(latest_time)
            } else {
                latest_time
            },
        })
        .collect()
}
