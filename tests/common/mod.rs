#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusty_tee_times::error::CoreError;
use rusty_tee_times::model::{Course, SavedSearch, TeeTime, local_tee_time};
use rusty_tee_times::notify::{NotificationMethod, Notifier};
use rusty_tee_times::sources::{SourceSession, TeeTimeQuery, TeeTimeSource};
use rusty_tee_times::storage::{MemoryStore, SearchStore, StorageError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
}

/// A tee time at `course` on `day` at `h:m` course-local.
pub fn slot(course: &Course, day: NaiveDate, h: u32, m: u32, players: u32, price: f64) -> TeeTime {
    let local = local_tee_time(NaiveDateTime::new(day, time(h, m))).expect("unambiguous local time");
    TeeTime::new(course.clone(), &local, players, price)
}

/// Scripted source. Results are looked up by query date and can be swapped
/// between searches; every call and query is recorded.
pub struct FakeSource {
    name: String,
    courses: Vec<Course>,
    state: Arc<FakeState>,
}

#[derive(Default)]
pub struct FakeState {
    results: Mutex<HashMap<NaiveDate, Vec<TeeTime>>>,
    fail_calls: AtomicBool,
    fail_open: AtomicBool,
    delay: Mutex<Option<Duration>>,
    opens: AtomicUsize,
    calls: AtomicUsize,
    queries: Mutex<Vec<TeeTimeQuery>>,
}

impl FakeSource {
    pub fn new(name: &str, courses: Vec<Course>) -> Self {
        Self {
            name: name.to_string(),
            courses,
            state: Arc::new(FakeState::default()),
        }
    }

    pub fn state(&self) -> Arc<FakeState> {
        Arc::clone(&self.state)
    }
}

impl FakeState {
    pub fn set_results(&self, day: NaiveDate, tee_times: Vec<TeeTime>) {
        self.results.lock().unwrap().insert(day, tee_times);
    }

    pub fn clear_results(&self) {
        self.results.lock().unwrap().clear();
    }

    pub fn fail_every_call(&self) {
        self.fail_calls.store(true, Ordering::SeqCst);
    }

    pub fn fail_open(&self) {
        self.fail_open.store(true, Ordering::SeqCst);
    }

    pub fn delay_calls(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<TeeTimeQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl TeeTimeSource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn courses(&self) -> &[Course] {
        &self.courses
    }

    async fn open_session(&self) -> Result<Box<dyn SourceSession>, CoreError> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_open.load(Ordering::SeqCst) {
            return Err(CoreError::Network(format!("{} refused the session", self.name)));
        }
        Ok(Box::new(FakeSession {
            own: self.courses.clone(),
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeSession {
    own: Vec<Course>,
    state: Arc<FakeState>,
}

#[async_trait]
impl SourceSession for FakeSession {
    async fn get_tee_times(
        &mut self,
        courses: &[Course],
        query: &TeeTimeQuery,
    ) -> Result<Vec<TeeTime>, CoreError> {
        let matching: Vec<&Course> = self.own.iter().filter(|c| courses.contains(c)).collect();
        if matching.is_empty() {
            return Ok(Vec::new());
        }

        self.state.calls.fetch_add(1, Ordering::SeqCst);
        self.state.queries.lock().unwrap().push(query.clone());

        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.state.fail_calls.load(Ordering::SeqCst) {
            return Err(CoreError::Network(format!("boom on {}", query.date)));
        }

        Ok(self
            .state
            .results
            .lock()
            .unwrap()
            .get(&query.date)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|t| matching.contains(&&t.course))
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub method: NotificationMethod,
    pub destination: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Records deliveries. Fails the first `failures` attempts.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    attempts: AtomicUsize,
    failures: AtomicUsize,
}

impl RecordingNotifier {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        method: NotificationMethod,
        destination: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), CoreError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures.load(Ordering::SeqCst) {
            return Err(CoreError::Notify("smtp unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            method,
            destination: destination.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Wraps a `MemoryStore`, counting writes and optionally failing for chosen searches.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    puts: AtomicUsize,
    drops: AtomicUsize,
    deletes: AtomicUsize,
    broken: Mutex<HashSet<Uuid>>,
    fail_listing: AtomicBool,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.puts() + self.drops() + self.deletes()
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Every read or write for `search_id` fails from now on.
    pub fn break_search(&self, search_id: Uuid) {
        self.broken.lock().unwrap().insert(search_id);
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    fn check(&self, search_id: Uuid) -> Result<(), StorageError> {
        if self.broken.lock().unwrap().contains(&search_id) {
            return Err(StorageError::new(format!("disk error for {search_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchStore for CountingStore {
    async fn list_searches(&self) -> Result<Vec<SavedSearch>, StorageError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StorageError::new("database is locked"));
        }
        self.inner.list_searches().await
    }

    async fn insert_search(&self, search: &SavedSearch) -> Result<(), StorageError> {
        self.inner.insert_search(search).await
    }

    async fn delete_search(&self, search_id: Uuid) -> Result<(), StorageError> {
        self.check(search_id)?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_search(search_id).await
    }

    async fn get_results(&self, search_id: Uuid) -> Result<Vec<TeeTime>, StorageError> {
        self.check(search_id)?;
        self.inner.get_results(search_id).await
    }

    async fn put_results(&self, search_id: Uuid, tee_times: &[TeeTime]) -> Result<(), StorageError> {
        self.check(search_id)?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put_results(search_id, tee_times).await
    }

    async fn drop_results(
        &self,
        search_id: Uuid,
        tee_times: &[TeeTime],
    ) -> Result<(), StorageError> {
        self.check(search_id)?;
        self.drops.fetch_add(1, Ordering::SeqCst);
        self.inner.drop_results(search_id, tee_times).await
    }
}

pub fn registry(sources: Vec<FakeSource>) -> Vec<Arc<dyn TeeTimeSource>> {
    sources
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn TeeTimeSource>)
        .collect()
}
