//! Saved-search polling: re-run a stored search, diff it against the last
//! recorded results, write the difference back and notify on new tee times.

use crate::error::CoreError;
use crate::model::{SavedSearch, TeeTime, TeeTimes, course_today};
use crate::notify::Notifier;
use crate::search::FederatedSearch;
use crate::storage::SearchStore;
use ahash::AHashSet;
use chrono::NaiveDate;
use log::{error, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const DEFAULT_NOTIFY_ATTEMPTS: u32 = 3;
const NOTIFY_RETRY_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// End date passed; the search was deleted and not run.
    Expired,
    Checked {
        added: Vec<TeeTime>,
        removed: Vec<TeeTime>,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub checked: usize,
    pub expired: usize,
    pub failed: usize,
}

/// `(fresh \ persisted, persisted \ fresh)` by slot identity. Each side keeps the
/// order of its input and holds no repeats.
#[must_use]
pub fn diff_tee_times(persisted: &[TeeTime], fresh: &[TeeTime]) -> (Vec<TeeTime>, Vec<TeeTime>) {
    let persisted_set: AHashSet<&TeeTime> = persisted.iter().collect();
    let fresh_set: AHashSet<&TeeTime> = fresh.iter().collect();

    let mut seen = AHashSet::new();
    let added = fresh
        .iter()
        .filter(|t| !persisted_set.contains(t) && seen.insert(*t))
        .cloned()
        .collect();

    let mut seen = AHashSet::new();
    let removed = persisted
        .iter()
        .filter(|t| !fresh_set.contains(t) && seen.insert(*t))
        .cloned()
        .collect();

    (added, removed)
}

pub struct Reconciler {
    search: Arc<FederatedSearch>,
    store: Arc<dyn SearchStore>,
    notifier: Arc<dyn Notifier>,
    notify_attempts: u32,
    notify_retry_delay: Duration,
    in_flight: Mutex<AHashSet<Uuid>>,
}

impl Reconciler {
    #[must_use]
    pub fn new(
        search: Arc<FederatedSearch>,
        store: Arc<dyn SearchStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            search,
            store,
            notifier,
            notify_attempts: DEFAULT_NOTIFY_ATTEMPTS,
            notify_retry_delay: NOTIFY_RETRY_DELAY,
            in_flight: Mutex::new(AHashSet::new()),
        }
    }

    /// At least one attempt is always made.
    #[must_use]
    pub fn with_notify_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.notify_attempts = attempts.max(1);
        self.notify_retry_delay = delay;
        self
    }

    /// One poll tick over every saved search, in turn.
    ///
    /// # Errors
    ///
    /// Will return `Err` only if the saved searches can't be listed. A failure
    /// for an individual search is logged and counted, and the tick moves on.
    pub async fn check_for_times(&self) -> Result<PollSummary, CoreError> {
        self.check_for_times_as_of(course_today()).await
    }

    /// # Errors
    ///
    /// See [`Reconciler::check_for_times`].
    pub async fn check_for_times_as_of(&self, today: NaiveDate) -> Result<PollSummary, CoreError> {
        let searches = self.store.list_searches().await?;
        info!("Found {} current searches", searches.len());

        let mut summary = PollSummary::default();
        for search in &searches {
            match self.reconcile_as_of(search, today).await {
                Ok(ReconcileOutcome::Expired) => summary.expired += 1,
                Ok(ReconcileOutcome::Checked { .. }) => summary.checked += 1,
                Err(err) => {
                    error!("Checking search {} failed: {err}", search.id);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    /// # Errors
    ///
    /// See [`Reconciler::reconcile_as_of`].
    pub async fn reconcile(&self, search: &SavedSearch) -> Result<ReconcileOutcome, CoreError> {
        self.reconcile_as_of(search, course_today()).await
    }

    /// Brings the stored results for `search` in line with a fresh search.
    ///
    /// Only new tee times are announced; vanished ones are dropped quietly. When
    /// nothing changed nothing is written. New results are stored even if the
    /// notification could not be delivered.
    ///
    /// # Errors
    ///
    /// Will return `Err` on any persistence failure, or `CoreError::Busy` if the
    /// same search is already being reconciled.
    pub async fn reconcile_as_of(
        &self,
        search: &SavedSearch,
        today: NaiveDate,
    ) -> Result<ReconcileOutcome, CoreError> {
        let _guard = InFlight::claim(&self.in_flight, search.id)?;

        if search.is_expired(today) {
            info!(
                "Deleting search {} as {} has passed",
                search.id, search.search_params.end_date
            );
            self.store.delete_search(search.id).await?;
            return Ok(ReconcileOutcome::Expired);
        }

        info!("Checking for new tee times for {}", search.id);
        let persisted = self.store.get_results(search.id).await?;
        let fresh = self.search.search(&search.search_params).await;
        let (added, removed) = diff_tee_times(&persisted, &fresh);

        if added.is_empty() {
            info!("Found no new tee times for {}", search.id);
        } else {
            info!("Found {} new tee times for {}", added.len(), search.id);
            self.send_notification(search, &added).await;
            self.store.put_results(search.id, &added).await?;
        }

        if !removed.is_empty() {
            info!("Deleting {} tee times for {}", removed.len(), search.id);
            self.store.drop_results(search.id, &removed).await?;
        }

        Ok(ReconcileOutcome::Checked { added, removed })
    }

    async fn send_notification(&self, search: &SavedSearch, added: &[TeeTime]) {
        let tee_times: TeeTimes = added.iter().cloned().collect();
        let subject = format!("Tee Times found for {}", search.id);
        let body = format!(
            "{}\n\n{}",
            tee_times.message(),
            search.search_params.summary_message()
        );

        info!(
            "Sending {} for {} to {:?}",
            search.notification_method, search.id, search.notification_destination
        );
        for attempt in 1..=self.notify_attempts {
            match self
                .notifier
                .notify(
                    search.notification_method,
                    &search.notification_destination,
                    &subject,
                    &body,
                )
                .await
            {
                Ok(()) => return,
                Err(err) => {
                    warn!(
                        "Notifying for {} failed (attempt {attempt}/{}): {err}",
                        search.id, self.notify_attempts
                    );
                    if attempt < self.notify_attempts {
                        tokio::time::sleep(self.notify_retry_delay).await;
                    }
                }
            }
        }
        warn!("Giving up on notifying for {}; new tee times are still recorded", search.id);
    }
}

/// Marks a search id as being reconciled until dropped.
struct InFlight<'a> {
    ids: &'a Mutex<AHashSet<Uuid>>,
    id: Uuid,
}

impl<'a> InFlight<'a> {
    fn claim(ids: &'a Mutex<AHashSet<Uuid>>, id: Uuid) -> Result<Self, CoreError> {
        let mut guard = ids
            .lock()
            .map_err(|_| CoreError::Other("in-flight set poisoned".to_string()))?;
        if !guard.insert(id) {
            return Err(CoreError::Busy(format!("search {id} is already being reconciled")));
        }
        Ok(Self { ids, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.ids.lock() {
            guard.remove(&self.id);
        }
    }
}
