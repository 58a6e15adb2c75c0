mod common;
use crate::common::{date, slot};

use chrono::{DateTime, Utc};
use rusty_tee_times::model::{
    Course, CourseId, SavedSearch, TeeTime, TeeTimeSearchParams, TeeTimes, insert_keep_higher_price,
};
use rusty_tee_times::notify::NotificationMethod;
use std::collections::HashSet;

#[test]
fn test2_price_and_players_do_not_affect_identity() {
    let course = Course::new("Rancho Park", 5);
    let day = date(2025, 10, 18);
    let cheap = slot(&course, day, 7, 30, 4, 45.0);
    let dear = slot(&course, day, 7, 30, 2, 60.5);
    assert_eq!(cheap, dear);

    let set: HashSet<TeeTime> = [cheap, dear].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn test2_one_minute_apart_is_a_different_slot() {
    let course = Course::new("Rancho Park", 5);
    let day = date(2025, 10, 18);
    assert_ne!(slot(&course, day, 7, 30, 4, 45.0), slot(&course, day, 7, 31, 4, 45.0));
}

#[test]
fn test2_numeric_and_text_ids_never_match() {
    let numeric = Course::new("Los Verdes", 49);
    let text = Course::new("Los Verdes", "49");
    assert_ne!(numeric, text);
    assert_ne!(CourseId::from(49), CourseId::from("49"));

    let day = date(2025, 10, 18);
    assert_ne!(slot(&numeric, day, 8, 0, 4, 30.0), slot(&text, day, 8, 0, 4, 30.0));
}

#[test]
fn test2_course_flags_do_not_affect_identity() {
    let plain = Course::new("Harding", 24);
    let flagged = Course::new("Harding", 24).par_70_plus().booking_info("(323) 663-2555");
    assert_eq!(plain, flagged);
}

#[test]
fn test2_normalizes_to_course_timezone() -> Result<(), Box<dyn std::error::Error>> {
    let course = Course::new("Industry Hills - Ike", 6430);
    let utc: DateTime<Utc> = "2025-10-18T14:10:00Z".parse()?;
    let tee_time = TeeTime::new(course.clone(), &utc, 4, 89.0);

    assert_eq!(tee_time.date(), date(2025, 10, 18));
    assert_eq!(tee_time.time().to_string(), "07:10:00");
    assert_eq!(tee_time.instant_key(), "2025-10-18T14:10:00Z");
    assert_eq!(tee_time, slot(&course, date(2025, 10, 18), 7, 10, 2, 70.0));
    Ok(())
}

#[test]
fn test2_keep_higher_price_on_duplicate() {
    let course = Course::new("Woodley Lakes", 23);
    let day = date(2025, 10, 18);
    let mut tee_times = Vec::new();
    insert_keep_higher_price(&mut tee_times, slot(&course, day, 9, 0, 4, 40.0));
    insert_keep_higher_price(&mut tee_times, slot(&course, day, 9, 0, 4, 55.0));
    insert_keep_higher_price(&mut tee_times, slot(&course, day, 9, 0, 4, 50.0));
    insert_keep_higher_price(&mut tee_times, slot(&course, day, 9, 10, 4, 40.0));

    assert_eq!(tee_times.len(), 2);
    assert!((tee_times[0].price - 55.0).abs() < f64::EPSILON);
}

#[test]
fn test2_serde_keeps_id_type_and_instant() -> Result<(), Box<dyn std::error::Error>> {
    let tee_time = slot(&Course::new("Brookside - Koiner", "brookside-golf-club"), date(2025, 11, 2), 6, 40, 4, 62.5);
    let json = serde_json::to_string(&tee_time)?;
    let back: TeeTime = serde_json::from_str(&json)?;

    assert_eq!(back, tee_time);
    assert_eq!(back.course.id, CourseId::Text("brookside-golf-club".to_string()));
    assert_eq!(back.tee_time, tee_time.tee_time);
    Ok(())
}

#[test]
fn test2_message_groups_by_date_then_course() {
    let rancho = Course::new("Rancho Park", 5);
    let harding = Course::new("Harding", 24);
    let sat = date(2025, 10, 18);
    let sun = date(2025, 10, 19);

    let tee_times: TeeTimes = vec![
        slot(&rancho, sun, 8, 0, 4, 45.0),
        slot(&rancho, sat, 9, 20, 4, 45.99),
        slot(&harding, sat, 13, 5, 3, 38.0),
        slot(&rancho, sat, 6, 50, 4, 45.0),
    ]
    .into_iter()
    .collect();

    assert_eq!(tee_times.len(), 4);
    assert_eq!(
        tee_times.message(),
        "Tee times:\n\
         2025-10-18:\n\
         \tHarding:\n\
         \t\t1:05 PM, $38, 3 players\n\
         \tRancho Park:\n\
         \t\t6:50 AM, $45, 4 players\n\
         \t\t9:20 AM, $45, 4 players\n\
         \n\
         2025-10-19:\n\
         \tRancho Park:\n\
         \t\t8:00 AM, $45, 4 players\n"
    );
}

#[test]
fn test2_summary_lists_set_fields() {
    let mut params = TeeTimeSearchParams::between(date(2025, 10, 18), date(2025, 10, 19));
    params.courses = Some(vec!["Rancho Park".to_string(), "Harding".to_string()]);
    params.eighteen_holes = true;
    params.latest_time = Some(common::time(11, 0));
    params.max_price = Some(60);

    assert_eq!(
        params.summary_message(),
        "Search Parameters:\
         \n\tStart Date: Sat Oct 18th\
         \n\tEnd Date: Sun Oct 19th\
         \n\tCourses: Rancho Park, Harding\
         \n\t18 Holes: true\
         \n\tMin Players: 4\
         \n\tLatest Time: 11:00 AM\
         \n\tMax Price: $60"
    );
}

#[test]
fn test2_search_expires_after_end_date() {
    let search = SavedSearch::new(
        NotificationMethod::Email,
        vec!["golfer@example.com".to_string()],
        TeeTimeSearchParams::between(date(2025, 10, 18), date(2025, 10, 19)),
    );
    assert!(!search.is_expired(date(2025, 10, 19)));
    assert!(search.is_expired(date(2025, 10, 20)));
}
