mod common;
use crate::common::{date, slot, time};

use rusqlite::Connection;
use rusty_tee_times::model::{Course, SavedSearch, TeeTimeSearchParams};
use rusty_tee_times::notify::NotificationMethod;
use rusty_tee_times::storage::sqlite::migrate;
use rusty_tee_times::storage::{SearchStore, SqliteStore};

fn saved_search() -> SavedSearch {
    let mut params = TeeTimeSearchParams::between(date(2025, 10, 18), date(2025, 10, 19));
    params.courses = Some(vec!["Rancho Park".to_string()]);
    params.earliest_time = Some(time(6, 30));
    params.max_price = Some(80);
    SavedSearch::new(
        NotificationMethod::Email,
        vec!["a@example.com".to_string(), "b@example.com".to_string()],
        params,
    )
}

#[tokio::test]
async fn test5_searches_survive_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("tee-times.db");
    let search = saved_search();

    {
        let store = SqliteStore::open(&path)?;
        store.insert_search(&search).await?;
    }

    let store = SqliteStore::open(&path)?;
    let searches = store.list_searches().await?;
    assert_eq!(searches, vec![search]);
    Ok(())
}

#[tokio::test]
async fn test5_duplicate_search_id_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open_in_memory()?;
    let search = saved_search();
    store.insert_search(&search).await?;
    assert!(store.insert_search(&search).await.is_err());
    Ok(())
}

#[test]
fn test5_migrations_apply_once() -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = Connection::open_in_memory()?;
    migrate(&mut conn)?;
    migrate(&mut conn)?;

    let applied: i64 = conn.query_row("SELECT COUNT(*) FROM __migrations__", [], |row| row.get(0))?;
    assert_eq!(applied, 2);
    Ok(())
}

#[tokio::test]
async fn test5_put_replaces_same_slot() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open_in_memory()?;
    let search = saved_search();
    store.insert_search(&search).await?;
    let course = Course::new("Rancho Park", 5);
    let day = date(2025, 10, 18);

    store
        .put_results(search.id, &[slot(&course, day, 7, 0, 4, 45.0), slot(&course, day, 7, 10, 4, 45.0)])
        .await?;
    store.put_results(search.id, &[slot(&course, day, 7, 0, 2, 60.0)]).await?;

    let results = store.get_results(search.id).await?;
    assert_eq!(results.len(), 2);
    let repriced = results
        .iter()
        .find(|t| t.time() == time(7, 0))
        .ok_or("slot missing")?;
    assert_eq!(repriced.num_golfers, 2);
    assert!((repriced.price - 60.0).abs() < f64::EPSILON);
    Ok(())
}

#[tokio::test]
async fn test5_drop_matches_identity_not_price() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open_in_memory()?;
    let search = saved_search();
    store.insert_search(&search).await?;
    let numeric = Course::new("Los Verdes", 49);
    let text = Course::new("Los Verdes", "49");
    let day = date(2025, 10, 18);

    store
        .put_results(search.id, &[slot(&numeric, day, 8, 0, 4, 30.0), slot(&text, day, 8, 0, 4, 30.0)])
        .await?;
    store.drop_results(search.id, &[slot(&numeric, day, 8, 0, 1, 99.0)]).await?;

    let results = store.get_results(search.id).await?;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].course, text);
    Ok(())
}

#[tokio::test]
async fn test5_results_are_scoped_and_deleted_with_search() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open_in_memory()?;
    let first = saved_search();
    let second = saved_search();
    store.insert_search(&first).await?;
    store.insert_search(&second).await?;
    let course = Course::new("Rancho Park", 5);
    let day = date(2025, 10, 18);
    store.put_results(first.id, &[slot(&course, day, 7, 0, 4, 45.0)]).await?;
    store.put_results(second.id, &[slot(&course, day, 7, 0, 4, 45.0)]).await?;

    store.delete_search(first.id).await?;

    assert!(store.get_results(first.id).await?.is_empty());
    assert_eq!(store.get_results(second.id).await?.len(), 1);
    let remaining: Vec<_> = store.list_searches().await?.into_iter().map(|s| s.id).collect();
    assert_eq!(remaining, vec![second.id]);
    Ok(())
}

#[tokio::test]
async fn test5_round_trips_local_tee_time() -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteStore::open_in_memory()?;
    let search = saved_search();
    store.insert_search(&search).await?;
    let stored = slot(&Course::new("Bethpage Black", 2431).par_70_plus(), date(2025, 11, 2), 1, 30, 4, 65.0);
    store.put_results(search.id, std::slice::from_ref(&stored)).await?;

    let back = store.get_results(search.id).await?;
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].tee_time, stored.tee_time);
    assert!(back[0].course.is_par_70_plus);
    Ok(())
}
