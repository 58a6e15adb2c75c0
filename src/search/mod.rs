pub mod intervals;
pub mod reconcile;

use crate::model::{Course, TeeTime, TeeTimeSearchParams, insert_keep_higher_price};
use crate::sources::{TeeTimeQuery, TeeTimeSource};
use intervals::Interval;
use log::{debug, error, warn};
use std::sync::Arc;
use std::time::Duration;

/// Fans one logical search out over every registered source.
pub struct FederatedSearch {
    sources: Vec<Arc<dyn TeeTimeSource>>,
    call_timeout: Option<Duration>,
}

impl FederatedSearch {
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn TeeTimeSource>>) -> Self {
        Self {
            sources,
            call_timeout: None,
        }
    }

    /// Bounds each individual source call; a call that runs over counts as failed.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[Arc<dyn TeeTimeSource>] {
        &self.sources
    }

    #[must_use]
    pub fn course_names(&self) -> Vec<&str> {
        self.sources
            .iter()
            .flat_map(|s| s.courses())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Every known course the search could touch, after name and layout filters.
    #[must_use]
    pub fn course_universe(&self, params: &TeeTimeSearchParams) -> Vec<Course> {
        let named: Vec<Course> = self
            .sources
            .iter()
            .flat_map(|s| s.courses())
            .filter(|c| {
                params
                    .courses
                    .as_ref()
                    .is_none_or(|names| names.contains(&c.name))
            })
            .cloned()
            .collect();
        filter_courses(
            named,
            params.par_70_plus,
            params.eighteen_holes,
            params.nine_holes,
        )
    }

    /// Runs `params` against every source concurrently. Sources sweep their
    /// intervals one at a time over their own session. Failures are logged and
    /// only cost that source's contribution, so this never fails; an empty
    /// result just means nothing matched.
    pub async fn search(&self, params: &TeeTimeSearchParams) -> Vec<TeeTime> {
        let courses: Arc<[Course]> = self.course_universe(params).into();
        let intervals: Arc<[Interval]> = params.intervals().into();

        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let sweep = sweep_source(
                Arc::clone(source),
                Arc::clone(&courses),
                Arc::clone(&intervals),
                params.min_players,
                params.max_price,
                self.call_timeout,
            );
            handles.push((source.name().to_string(), tokio::task::spawn(sweep)));
        }

        let (names, tasks): (Vec<_>, Vec<_>) = handles.into_iter().unzip();
        let results = futures::future::join_all(tasks).await;

        let mut tee_times = Vec::new();
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(found) => tee_times.extend(found),
                Err(err) => error!("{name} search task failed: {err}"),
            }
        }
        tee_times
    }
}

/// Drops courses that don't match the layout flags. The hole-count flags are
/// mutually exclusive; that is checked before a search is built.
#[must_use]
pub fn filter_courses(
    courses: Vec<Course>,
    par_70_plus: bool,
    eighteen_holes: bool,
    nine_holes: bool,
) -> Vec<Course> {
    courses
        .into_iter()
        .filter(|c| !par_70_plus || c.is_par_70_plus)
        .filter(|c| !eighteen_holes || !c.is_9_hole)
        .filter(|c| !nine_holes || c.is_9_hole)
        .collect()
}

async fn sweep_source(
    source: Arc<dyn TeeTimeSource>,
    courses: Arc<[Course]>,
    intervals: Arc<[Interval]>,
    min_players: u32,
    max_price: Option<u32>,
    call_timeout: Option<Duration>,
) -> Vec<TeeTime> {
    let mut session = match source.open_session().await {
        Ok(session) => session,
        Err(err) => {
            warn!("Could not open a session with {}: {err}", source.name());
            return Vec::new();
        }
    };

    let mut tee_times = Vec::new();
    for interval in intervals.iter() {
        let query = TeeTimeQuery {
            date: interval.date,
            earliest_time: interval.earliest_time,
            latest_time: interval.latest_time,
            min_players,
            max_price,
        };
        let call = session.get_tee_times(&courses, &query);
        let result = match call_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "{} timed out after {:?} for {}",
                        source.name(),
                        limit,
                        interval.date
                    );
                    continue;
                }
            },
            None => call.await,
        };
        match result {
            Ok(found) => {
                debug!("{} returned {} tee times for {}", source.name(), found.len(), interval.date);
                for tee_time in found {
                    insert_keep_higher_price(&mut tee_times, tee_time);
                }
            }
            Err(err) => warn!(
                "Error encountered while running {} for {}: {err}",
                source.name(),
                interval.date
            ),
        }
    }
    tee_times
}
