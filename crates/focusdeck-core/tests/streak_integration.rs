//! Integration tests for streak continuity across calendar periods.

use chrono::NaiveDate;
use focusdeck_core::{Database, StreakCalculator, StreakType};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn consecutive_days_build_a_streak() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    calc.apply_completion("u1", "s1", d(2026, 3, 1)).unwrap();
    calc.apply_completion("u1", "s2", d(2026, 3, 2)).unwrap();
    calc.apply_completion("u1", "s3", d(2026, 3, 3)).unwrap();

    let streak = db
        .fetch_streak("u1", StreakType::DailySessions)
        .unwrap()
        .unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.streak_start_date, Some(d(2026, 3, 1)));
    assert_eq!(streak.last_session_date, Some(d(2026, 3, 3)));
}

#[test]
fn a_gap_resets_current_but_keeps_longest() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    calc.apply_completion("u1", "s1", d(2026, 3, 1)).unwrap();
    calc.apply_completion("u1", "s2", d(2026, 3, 2)).unwrap();
    // Two days skipped: D+2 -> D+4.
    calc.apply_completion("u1", "s3", d(2026, 3, 5)).unwrap();

    let streak = db
        .fetch_streak("u1", StreakType::DailySessions)
        .unwrap()
        .unwrap();
    assert_eq!(streak.current_streak, 1);
    assert_eq!(streak.longest_streak, 2);
    assert_eq!(streak.streak_start_date, Some(d(2026, 3, 5)));
}

#[test]
fn same_day_completions_count_once() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    calc.apply_completion("u1", "s1", d(2026, 3, 1)).unwrap();
    calc.apply_completion("u1", "s2", d(2026, 3, 1)).unwrap();

    let streak = db
        .fetch_streak("u1", StreakType::DailySessions)
        .unwrap()
        .unwrap();
    assert_eq!(streak.current_streak, 1);
}

#[test]
fn retried_completion_event_is_idempotent() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    calc.apply_completion("u1", "s1", d(2026, 3, 1)).unwrap();
    calc.apply_completion("u1", "s2", d(2026, 3, 2)).unwrap();
    // The completion event for s2 is delivered again.
    let updated = calc.apply_completion("u1", "s2", d(2026, 3, 2)).unwrap();
    assert!(updated.is_empty());

    let streak = db
        .fetch_streak("u1", StreakType::DailySessions)
        .unwrap()
        .unwrap();
    assert_eq!(streak.current_streak, 2);
}

#[test]
fn failed_record_update_does_not_burn_the_claim() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    // Make the record update fail after the claim would land.
    db.conn()
        .execute_batch("ALTER TABLE streaks RENAME TO streaks_unavailable")
        .unwrap();
    assert!(calc.apply_completion("u1", "s1", d(2026, 3, 1)).is_err());

    // Storage recovers; redelivering the same completion event must
    // still count the session.
    db.conn()
        .execute_batch("ALTER TABLE streaks_unavailable RENAME TO streaks")
        .unwrap();
    let updated = calc.apply_completion("u1", "s1", d(2026, 3, 1)).unwrap();
    assert_eq!(updated.len(), StreakType::ALL.len());
    assert_eq!(
        db.fetch_streak("u1", StreakType::DailySessions)
            .unwrap()
            .unwrap()
            .current_streak,
        1
    );
}

#[test]
fn weekly_streak_ignores_day_gaps_within_a_week() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    // Tue week 1, Fri week 1, Mon week 2.
    calc.apply_completion("u1", "s1", d(2026, 3, 3)).unwrap();
    calc.apply_completion("u1", "s2", d(2026, 3, 6)).unwrap();
    calc.apply_completion("u1", "s3", d(2026, 3, 9)).unwrap();

    let weekly = db
        .fetch_streak("u1", StreakType::WeeklyHours)
        .unwrap()
        .unwrap();
    assert_eq!(weekly.current_streak, 2);

    // The daily streak saw the same days and broke on the gaps.
    let daily = db
        .fetch_streak("u1", StreakType::DailySessions)
        .unwrap()
        .unwrap();
    assert_eq!(daily.current_streak, 1);
}

#[test]
fn monthly_streak_spans_the_year_boundary() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    calc.apply_completion("u1", "s1", d(2025, 11, 20)).unwrap();
    calc.apply_completion("u1", "s2", d(2025, 12, 5)).unwrap();
    calc.apply_completion("u1", "s3", d(2026, 1, 28)).unwrap();

    let monthly = db
        .fetch_streak("u1", StreakType::MonthlyConsistency)
        .unwrap()
        .unwrap();
    assert_eq!(monthly.current_streak, 3);
}

#[test]
fn streaks_are_tracked_per_user() {
    let db = Database::open_memory().unwrap();
    let calc = StreakCalculator::new(&db);

    calc.apply_completion("u1", "s1", d(2026, 3, 1)).unwrap();
    calc.apply_completion("u2", "s2", d(2026, 3, 1)).unwrap();
    calc.apply_completion("u2", "s3", d(2026, 3, 2)).unwrap();

    assert_eq!(
        db.fetch_streak("u1", StreakType::DailySessions)
            .unwrap()
            .unwrap()
            .current_streak,
        1
    );
    assert_eq!(
        db.fetch_streak("u2", StreakType::DailySessions)
            .unwrap()
            .unwrap()
            .current_streak,
        2
    );
}
