use crate::model::search::format_clock;
use crate::model::tee_time::TeeTime;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Tee times bucketed by date, then course name. Presentation only.
#[derive(Clone, Debug, Default)]
pub struct TeeTimes {
    pub tee_times: BTreeMap<NaiveDate, BTreeMap<String, Vec<TeeTime>>>,
}

impl TeeTimes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tee_time(&mut self, tee_time: TeeTime) {
        self.tee_times
            .entry(tee_time.date())
            .or_default()
            .entry(tee_time.course.name.clone())
            .or_default()
            .push(tee_time);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tee_times.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tee_times
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    #[must_use]
    pub fn message(&self) -> String {
        let mut msg = String::from("Tee times:");
        for (date, courses) in &self.tee_times {
            let _ = writeln!(msg, "\n{date}:");
            for (course, tee_times) in courses {
                let _ = writeln!(msg, "\t{course}:");
                let mut sorted: Vec<&TeeTime> = tee_times.iter().collect();
                sorted.sort_by_key(|t| t.time());
                for t in sorted {
                    let _ = writeln!(
                        msg,
                        "\t\t{}, ${}, {} players",
                        format_clock(t.time()),
                        t.price.trunc(),
                        t.num_golfers
                    );
                }
            }
        }
        msg
    }
}

impl FromIterator<TeeTime> for TeeTimes {
    fn from_iter<I: IntoIterator<Item = TeeTime>>(iter: I) -> Self {
        let mut tee_times = Self::new();
        for t in iter {
            tee_times.add_tee_time(t);
        }
        tee_times
    }
}
