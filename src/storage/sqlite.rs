use super::{SearchStore, StorageError};
use crate::model::{SavedSearch, TeeTime};
use crate::notify::NotificationMethod;
use async_trait::async_trait;
use log::info;
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const MIGRATIONS_TABLE: &str = include_str!("../sql/schema/sqlite/00_migrations.sql");

/// Applied once each, in order.
const MIGRATIONS: [(&str, &str); 2] = [
    (
        "01_tee_time_search",
        include_str!("../sql/schema/sqlite/01_tee_time_search.sql"),
    ),
    (
        "02_tee_time_search_result",
        include_str!("../sql/schema/sqlite/02_tee_time_search_result.sql"),
    ),
];

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and brings its schema up to date.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file can't be opened or a migration fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::init(Connection::open(path)?)
    }

    /// # Errors
    ///
    /// Will return `Err` if a migration fails.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Result<Self, StorageError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StorageError::new("sqlite connection poisoned"))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::new(format!("sqlite task failed: {e}")))?
    }
}

/// # Errors
///
/// Will return `Err` if the bookkeeping table can't be created or a migration
/// script fails. A failed migration is rolled back and not recorded.
pub fn migrate(conn: &mut Connection) -> Result<(), StorageError> {
    conn.execute_batch(MIGRATIONS_TABLE)?;
    for (name, sql) in MIGRATIONS {
        let tx = conn.transaction()?;
        let applied: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM __migrations__ WHERE name = ?1)",
            [name],
            |row| row.get(0),
        )?;
        if !applied {
            info!("Applying {name}...");
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO __migrations__ (name, applied_at) VALUES (?1, ?2)",
                params![name, chrono::Utc::now().to_rfc3339()],
            )?;
        }
        tx.commit()?;
    }
    Ok(())
}

/// Columns identifying a slot: course name, json course id, utc instant.
fn identity(tee_time: &TeeTime) -> Result<(String, String, String), StorageError> {
    Ok((
        tee_time.course.name.clone(),
        serde_json::to_string(&tee_time.course.id)?,
        tee_time.instant_key(),
    ))
}

#[async_trait]
impl SearchStore for SqliteStore {
    async fn list_searches(&self) -> Result<Vec<SavedSearch>, StorageError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, notification_method, notification_destination, search_params
                 FROM tee_time_search
                 ORDER BY ins_ts, id",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, method, destination, params)| {
                    Ok(SavedSearch {
                        id: Uuid::parse_str(&id)
                            .map_err(|e| StorageError::new(format!("bad search id {id}: {e}")))?,
                        notification_method: method
                            .parse::<NotificationMethod>()
                            .map_err(StorageError::new)?,
                        notification_destination: serde_json::from_str(&destination)?,
                        search_params: serde_json::from_str(&params)?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn insert_search(&self, search: &SavedSearch) -> Result<(), StorageError> {
        let id = search.id.to_string();
        let method = search.notification_method.as_str();
        let destination = serde_json::to_string(&search.notification_destination)?;
        let params = serde_json::to_string(&search.search_params)?;
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tee_time_search
                 (id, notification_method, notification_destination, search_params)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, method, destination, params],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_search(&self, search_id: Uuid) -> Result<(), StorageError> {
        let id = search_id.to_string();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM tee_time_search_result WHERE search_id = ?1", [&id])?;
            tx.execute("DELETE FROM tee_time_search WHERE id = ?1", [&id])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_results(&self, search_id: Uuid) -> Result<Vec<TeeTime>, StorageError> {
        let id = search_id.to_string();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT payload FROM tee_time_search_result
                 WHERE search_id = ?1
                 ORDER BY tee_time, course_name",
            )?;
            let payloads = stmt
                .query_map([&id], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            payloads
                .iter()
                .map(|p| serde_json::from_str(p).map_err(StorageError::from))
                .collect()
        })
        .await
    }

    async fn put_results(&self, search_id: Uuid, tee_times: &[TeeTime]) -> Result<(), StorageError> {
        let id = search_id.to_string();
        let rows = tee_times
            .iter()
            .map(|t| Ok((identity(t)?, serde_json::to_string(t)?)))
            .collect::<Result<Vec<_>, StorageError>>()?;
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO tee_time_search_result
                     (search_id, course_name, course_id, tee_time, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (search_id, course_name, course_id, tee_time)
                     DO UPDATE SET payload = excluded.payload",
                )?;
                for ((course_name, course_id, instant), payload) in &rows {
                    stmt.execute(params![id, course_name, course_id, instant, payload])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn drop_results(
        &self,
        search_id: Uuid,
        tee_times: &[TeeTime],
    ) -> Result<(), StorageError> {
        let id = search_id.to_string();
        let keys = tee_times
            .iter()
            .map(identity)
            .collect::<Result<Vec<_>, _>>()?;
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "DELETE FROM tee_time_search_result
                     WHERE search_id = ?1 AND course_name = ?2 AND course_id = ?3 AND tee_time = ?4",
                )?;
                for (course_name, course_id, instant) in &keys {
                    stmt.execute(params![id, course_name, course_id, instant])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}
