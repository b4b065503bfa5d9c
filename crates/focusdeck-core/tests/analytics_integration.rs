//! Integration tests for dashboard aggregation and metric trends over
//! real session history driven through the lifecycle engine.

use chrono::{DateTime, Duration, Utc};
use focusdeck_core::{
    AnalyticsAggregator, AnalyticsPeriod, CompletionOutcome, Database, DistractionDraft,
    DistractionType, MetricType, SessionEngine, SessionPlan, SessionType, StreakType,
};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-02-16T12:00:00+00:00")
        .unwrap()
        .with_timezone(&Utc)
}

fn plan(minutes: u32) -> SessionPlan {
    SessionPlan {
        session_type: SessionType::Pomodoro,
        planned_duration_minutes: Some(minutes),
        task_id: None,
        planned_task_count: None,
        tags: Vec::new(),
        environment: None,
        mood_before: Some(4),
        energy_before: Some(5),
    }
}

fn distraction() -> DistractionDraft {
    DistractionDraft {
        kind: DistractionType::Notification,
        impact_level: 2,
        occurred_at: None,
        duration_seconds: None,
        user_response: None,
    }
}

#[test]
fn dashboard_aggregates_terminal_history() {
    let e = SessionEngine::new(Database::open_memory().unwrap());

    // One successful 25-minute session with two distractions and ratings.
    let a = e.start("u1", plan(25), t0()).unwrap().session.id;
    e.record_distraction(&a, "u1", distraction(), t0() + Duration::minutes(2))
        .unwrap();
    e.record_distraction(&a, "u1", distraction(), t0() + Duration::minutes(9))
        .unwrap();
    e.complete(
        &a,
        "u1",
        CompletionOutcome {
            focus_quality: Some(8),
            productivity_rating: Some(8),
            mood_after: Some(7),
            ..Default::default()
        },
        t0() + Duration::minutes(25),
    )
    .unwrap();

    // One cancelled attempt ten minutes in.
    let b = e.start("u1", plan(25), t0() + Duration::hours(1)).unwrap().session.id;
    e.cancel(
        &b,
        "u1",
        Some("interrupted".into()),
        t0() + Duration::hours(1) + Duration::minutes(10),
    )
    .unwrap();

    let dash = AnalyticsAggregator::new(e.db())
        .dashboard("u1", t0() + Duration::hours(2))
        .unwrap();

    assert_eq!(dash.total_sessions, 2);
    assert_eq!(dash.successful_sessions, 1);
    // Only completed sessions count as focus time; cancellations do not.
    assert_eq!(dash.total_focus_minutes, 25);
    assert_eq!(dash.total_distractions, 2);
    assert_eq!(dash.avg_distractions, 1.0);
    assert_eq!(dash.avg_session_minutes, 17.5);
    assert_eq!(dash.avg_productivity_rating, 8.0);
    assert_eq!(dash.today_sessions, 2);
    assert_eq!(dash.today_focus_minutes, 35);
    assert_eq!(dash.last_session_at, Some(t0() + Duration::hours(1)));

    // The completion advanced the daily streak.
    let daily = dash
        .streaks
        .iter()
        .find(|s| s.streak_type == StreakType::DailySessions)
        .expect("daily streak present");
    assert_eq!(daily.current_streak, 1);

    // The trend carries today's focus-duration bucket: (25 + 10) / 2.
    let focus_point = dash
        .trend
        .iter()
        .find(|p| p.metric_type == MetricType::FocusDuration)
        .expect("focus duration trend point");
    assert_eq!(focus_point.day, t0().date_naive());
    assert_eq!(focus_point.average, 17.5);
}

#[test]
fn open_sessions_count_toward_today_but_not_totals() {
    let e = SessionEngine::new(Database::open_memory().unwrap());
    e.start("u1", plan(25), t0()).unwrap();

    let dash = AnalyticsAggregator::new(e.db())
        .dashboard("u1", t0() + Duration::minutes(5))
        .unwrap();
    assert_eq!(dash.total_sessions, 0);
    assert_eq!(dash.today_sessions, 1);
    assert!(dash.trend.is_empty());
}

#[test]
fn dashboard_is_scoped_to_the_requesting_user() {
    let e = SessionEngine::new(Database::open_memory().unwrap());
    let a = e.start("u1", plan(25), t0()).unwrap().session.id;
    e.complete(&a, "u1", CompletionOutcome::default(), t0() + Duration::minutes(25))
        .unwrap();

    let dash = AnalyticsAggregator::new(e.db())
        .dashboard("someone-else", t0() + Duration::hours(1))
        .unwrap();
    assert_eq!(dash.total_sessions, 0);
    assert!(dash.streaks.is_empty());
}

#[test]
fn metric_trend_buckets_by_day_in_order() {
    let e = SessionEngine::new(Database::open_memory().unwrap());

    let a = e.start("u1", plan(25), t0()).unwrap().session.id;
    e.complete(&a, "u1", CompletionOutcome::default(), t0() + Duration::minutes(25))
        .unwrap();

    let next_day = t0() + Duration::days(1);
    let b = e.start("u1", plan(25), next_day).unwrap().session.id;
    e.complete(&b, "u1", CompletionOutcome::default(), next_day + Duration::minutes(50))
        .unwrap();

    let trend = AnalyticsAggregator::new(e.db())
        .metrics_over(
            "u1",
            AnalyticsPeriod::Week,
            Some(MetricType::FocusDuration),
            next_day + Duration::hours(2),
        )
        .unwrap();

    assert_eq!(trend.len(), 2);
    assert!(trend.iter().all(|p| p.metric_type == MetricType::FocusDuration));
    assert_eq!(trend[0].day, t0().date_naive());
    assert_eq!(trend[0].average, 25.0);
    assert_eq!(trend[1].day, next_day.date_naive());
    assert_eq!(trend[1].average, 50.0);
}

#[test]
fn period_window_excludes_older_metrics() {
    let e = SessionEngine::new(Database::open_memory().unwrap());

    let old_start = t0() - Duration::days(40);
    let a = e.start("u1", plan(25), old_start).unwrap().session.id;
    e.complete(&a, "u1", CompletionOutcome::default(), old_start + Duration::minutes(25))
        .unwrap();

    let b = e.start("u1", plan(25), t0()).unwrap().session.id;
    e.complete(&b, "u1", CompletionOutcome::default(), t0() + Duration::minutes(25))
        .unwrap();

    let agg = AnalyticsAggregator::new(e.db());
    let recent = agg
        .metrics_over(
            "u1",
            AnalyticsPeriod::Week,
            Some(MetricType::FocusDuration),
            t0() + Duration::hours(1),
        )
        .unwrap();
    assert_eq!(recent.len(), 1);

    let quarter = agg
        .metrics_over(
            "u1",
            AnalyticsPeriod::Quarter,
            Some(MetricType::FocusDuration),
            t0() + Duration::hours(1),
        )
        .unwrap();
    assert_eq!(quarter.len(), 2);
}

#[test]
fn unfiltered_trend_carries_every_metric_type() {
    let e = SessionEngine::new(Database::open_memory().unwrap());
    let a = e.start("u1", plan(25), t0()).unwrap().session.id;
    e.record_distraction(&a, "u1", distraction(), t0() + Duration::minutes(5))
        .unwrap();
    e.complete(
        &a,
        "u1",
        CompletionOutcome {
            focus_quality: Some(9),
            productivity_rating: Some(7),
            mood_after: Some(8),
            energy_after: Some(6),
            ..Default::default()
        },
        t0() + Duration::minutes(25),
    )
    .unwrap();

    let trend = AnalyticsAggregator::new(e.db())
        .metrics_over("u1", AnalyticsPeriod::Week, None, t0() + Duration::hours(1))
        .unwrap();
    let types: Vec<MetricType> = trend.iter().map(|p| p.metric_type).collect();
    for expected in [
        MetricType::FocusDuration,
        MetricType::DistractionRate,
        MetricType::CompletionRate,
        MetricType::ProductivityScore,
        MetricType::MoodImprovement,
        MetricType::EnergyChange,
    ] {
        assert!(types.contains(&expected), "missing {expected:?}");
    }
}
