//! Derived productivity analytics.
//!
//! Metrics are immutable observations emitted when a session reaches a
//! terminal state; the dashboard and trend series are point-in-time
//! queries over them (plus the session table), never a second source of
//! truth. Missing or malformed rows are skipped, and a user with no
//! history gets all-zero defaults instead of an error.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::session::{FocusSession, SessionState};
use crate::storage::Database;
use crate::streak::StreakRecord;

/// Kinds of emitted metric observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    ProductivityScore,
    FocusDuration,
    DistractionRate,
    CompletionRate,
    MoodImprovement,
    EnergyChange,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::ProductivityScore => "productivity_score",
            MetricType::FocusDuration => "focus_duration",
            MetricType::DistractionRate => "distraction_rate",
            MetricType::CompletionRate => "completion_rate",
            MetricType::MoodImprovement => "mood_improvement",
            MetricType::EnergyChange => "energy_change",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "productivity_score" => Some(MetricType::ProductivityScore),
            "focus_duration" => Some(MetricType::FocusDuration),
            "distraction_rate" => Some(MetricType::DistractionRate),
            "completion_rate" => Some(MetricType::CompletionRate),
            "mood_improvement" => Some(MetricType::MoodImprovement),
            "energy_change" => Some(MetricType::EnergyChange),
            _ => None,
        }
    }
}

/// One immutable metric observation tied to its originating session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsMetric {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    pub metric_type: MetricType,
    pub value: f64,
    pub unit: String,
    pub measured_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsMetric {
    fn observe(
        session: &FocusSession,
        metric_type: MetricType,
        value: f64,
        unit: &str,
        measured_on: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: session.user_id.clone(),
            session_id: session.id.clone(),
            metric_type,
            value,
            unit: unit.to_string(),
            measured_on,
            created_at: now,
        }
    }
}

/// Query window for the trend endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsPeriod {
    Week,
    Month,
    Quarter,
}

impl AnalyticsPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "7d" => Some(AnalyticsPeriod::Week),
            "30d" => Some(AnalyticsPeriod::Month),
            "90d" => Some(AnalyticsPeriod::Quarter),
            _ => None,
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            AnalyticsPeriod::Week => 7,
            AnalyticsPeriod::Month => 30,
            AnalyticsPeriod::Quarter => 90,
        }
    }
}

/// One day-bucket of averaged metric values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub metric_type: MetricType,
    pub average: f64,
}

/// Point-in-time aggregate view over a user's session history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Dashboard {
    pub total_sessions: u64,
    pub successful_sessions: u64,
    pub total_focus_minutes: u64,
    pub avg_productivity_rating: f64,
    pub avg_session_minutes: f64,
    pub total_distractions: u64,
    pub avg_distractions: f64,
    pub today_sessions: u64,
    pub today_focus_minutes: u64,
    pub last_session_at: Option<DateTime<Utc>>,
    /// Active streaks, largest current count first.
    pub streaks: Vec<StreakRecord>,
    /// Trailing-30-day per-day metric averages. Days without data are
    /// absent, not interpolated.
    pub trend: Vec<TrendPoint>,
}

/// Derives metrics and dashboard views from session history.
pub struct AnalyticsAggregator<'a> {
    db: &'a Database,
}

impl<'a> AnalyticsAggregator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Emit the metric observations for a session that just reached a
    /// terminal state. Cancelled sessions still contribute attempted-
    /// session metrics (duration, distraction rate, completion 0.0).
    pub fn emit_for_terminal(
        &self,
        session: &FocusSession,
        now: DateTime<Utc>,
    ) -> Result<Vec<AnalyticsMetric>, EngineError> {
        let day = session.completed_at.unwrap_or(now).date_naive();
        let minutes = session.actual_duration_minutes.unwrap_or(0);
        let mut metrics = Vec::new();

        metrics.push(AnalyticsMetric::observe(
            session,
            MetricType::FocusDuration,
            f64::from(minutes),
            "minutes",
            day,
            now,
        ));

        if minutes > 0 {
            metrics.push(AnalyticsMetric::observe(
                session,
                MetricType::DistractionRate,
                f64::from(session.distraction_count) / f64::from(minutes),
                "per_minute",
                day,
                now,
            ));
        }

        let completed_ok =
            session.state == SessionState::Completed && session.is_successful == Some(true);
        metrics.push(AnalyticsMetric::observe(
            session,
            MetricType::CompletionRate,
            if completed_ok { 1.0 } else { 0.0 },
            "ratio",
            day,
            now,
        ));

        if session.state == SessionState::Completed {
            if let Some(score) = productivity_score(session) {
                metrics.push(AnalyticsMetric::observe(
                    session,
                    MetricType::ProductivityScore,
                    score,
                    "score",
                    day,
                    now,
                ));
            }
        }

        if let (Some(before), Some(after)) = (session.mood_before, session.mood_after) {
            metrics.push(AnalyticsMetric::observe(
                session,
                MetricType::MoodImprovement,
                f64::from(after) - f64::from(before),
                "delta",
                day,
                now,
            ));
        }
        if let (Some(before), Some(after)) = (session.energy_before, session.energy_after) {
            metrics.push(AnalyticsMetric::observe(
                session,
                MetricType::EnergyChange,
                f64::from(after) - f64::from(before),
                "delta",
                day,
                now,
            ));
        }

        for metric in &metrics {
            self.db.insert_metric(metric)?;
        }
        Ok(metrics)
    }

    /// Assemble the dashboard as of `now`. Never fails on missing data;
    /// an empty history yields the all-zero default.
    pub fn dashboard(&self, user_id: &str, now: DateTime<Utc>) -> Result<Dashboard, EngineError> {
        let totals = self.db.session_totals(user_id)?;

        let today = now.date_naive();
        let day_start = Utc
            .with_ymd_and_hms(today.year(), today.month(), today.day(), 0, 0, 0)
            .single()
            .unwrap_or(now);
        let (today_sessions, today_focus_minutes) =
            self.db.today_totals(user_id, day_start, day_start + Duration::days(1))?;

        let trend =
            self.day_averages(user_id, today - Duration::days(30), today, None)?;

        Ok(Dashboard {
            total_sessions: totals.total_sessions,
            successful_sessions: totals.successful_sessions,
            total_focus_minutes: totals.total_focus_minutes,
            avg_productivity_rating: totals.avg_productivity_rating.unwrap_or(0.0),
            avg_session_minutes: if totals.sessions_with_duration > 0 {
                totals.sum_duration_minutes as f64 / totals.sessions_with_duration as f64
            } else {
                0.0
            },
            total_distractions: totals.total_distractions,
            avg_distractions: if totals.total_sessions > 0 {
                totals.total_distractions as f64 / totals.total_sessions as f64
            } else {
                0.0
            },
            today_sessions,
            today_focus_minutes,
            last_session_at: self.db.last_session_at(user_id)?,
            streaks: self.db.fetch_active_streaks(user_id)?,
            trend,
        })
    }

    /// Day-bucketed metric averages for the analytics endpoint.
    pub fn metrics_over(
        &self,
        user_id: &str,
        period: AnalyticsPeriod,
        metric_type: Option<MetricType>,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendPoint>, EngineError> {
        let today = now.date_naive();
        self.day_averages(user_id, today - Duration::days(period.days()), today, metric_type)
    }

    fn day_averages(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        metric_type: Option<MetricType>,
    ) -> Result<Vec<TrendPoint>, EngineError> {
        let rows = self.db.metric_day_averages(user_id, from, to, metric_type)?;
        Ok(rows
            .into_iter()
            .map(|(day, metric_type, average)| TrendPoint {
                day,
                metric_type,
                average,
            })
            .collect())
    }
}

/// Weighted productivity score on a 0-100 scale.
///
/// 40% focus quality, 40% productivity rating (each mapped from the 1-10
/// scale to 0-100), 20% inverse distraction density (distractions per 25
/// focused minutes). Weights renormalize over the components present;
/// returns `None` when neither rating was given.
fn productivity_score(session: &FocusSession) -> Option<f64> {
    let mut weighted = 0.0;
    let mut weight = 0.0;

    if let Some(q) = session.focus_quality {
        weighted += 0.4 * rating_to_score(q);
        weight += 0.4;
    }
    if let Some(r) = session.productivity_rating {
        weighted += 0.4 * rating_to_score(r);
        weight += 0.4;
    }
    if weight == 0.0 {
        return None;
    }

    let minutes = f64::from(session.actual_duration_minutes.unwrap_or(0));
    if minutes > 0.0 {
        let density = f64::from(session.distraction_count) * 25.0 / minutes;
        weighted += 0.2 * (100.0 / (1.0 + density));
        weight += 0.2;
    }

    Some(weighted / weight)
}

/// Map a 1-10 rating onto 0-100.
fn rating_to_score(rating: u8) -> f64 {
    (f64::from(rating.clamp(1, 10)) - 1.0) / 9.0 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionPlan, SessionType};

    fn terminal_session(state: SessionState) -> FocusSession {
        let plan = SessionPlan {
            session_type: SessionType::Pomodoro,
            planned_duration_minutes: Some(25),
            task_id: None,
            planned_task_count: None,
            tags: Vec::new(),
            environment: None,
            mood_before: Some(4),
            energy_before: Some(5),
        };
        let mut s = FocusSession::from_plan("u1", plan, 25, Utc::now());
        s.state = state;
        s.actual_duration_minutes = Some(25);
        s.completed_at = Some(Utc::now());
        s.is_successful = Some(state == SessionState::Completed);
        s
    }

    #[test]
    fn empty_dashboard_is_all_zero_defaults() {
        let db = Database::open_memory().unwrap();
        let dash = AnalyticsAggregator::new(&db)
            .dashboard("nobody", Utc::now())
            .unwrap();
        assert_eq!(dash.total_sessions, 0);
        assert_eq!(dash.total_focus_minutes, 0);
        assert_eq!(dash.avg_productivity_rating, 0.0);
        assert_eq!(dash.today_sessions, 0);
        assert!(dash.last_session_at.is_none());
        assert!(dash.streaks.is_empty());
        assert!(dash.trend.is_empty());
    }

    #[test]
    fn completion_emits_core_metrics() {
        let db = Database::open_memory().unwrap();
        let mut s = terminal_session(SessionState::Completed);
        s.focus_quality = Some(8);
        s.productivity_rating = Some(7);
        s.mood_after = Some(7);
        s.distraction_count = 2;

        let metrics = AnalyticsAggregator::new(&db)
            .emit_for_terminal(&s, Utc::now())
            .unwrap();
        let types: Vec<MetricType> = metrics.iter().map(|m| m.metric_type).collect();
        assert!(types.contains(&MetricType::FocusDuration));
        assert!(types.contains(&MetricType::DistractionRate));
        assert!(types.contains(&MetricType::CompletionRate));
        assert!(types.contains(&MetricType::ProductivityScore));
        assert!(types.contains(&MetricType::MoodImprovement));
        // Energy after was never recorded.
        assert!(!types.contains(&MetricType::EnergyChange));

        let completion = metrics
            .iter()
            .find(|m| m.metric_type == MetricType::CompletionRate)
            .unwrap();
        assert_eq!(completion.value, 1.0);
    }

    #[test]
    fn cancellation_contributes_attempted_metrics_only() {
        let db = Database::open_memory().unwrap();
        let s = terminal_session(SessionState::Cancelled);
        let metrics = AnalyticsAggregator::new(&db)
            .emit_for_terminal(&s, Utc::now())
            .unwrap();
        let completion = metrics
            .iter()
            .find(|m| m.metric_type == MetricType::CompletionRate)
            .unwrap();
        assert_eq!(completion.value, 0.0);
        assert!(!metrics
            .iter()
            .any(|m| m.metric_type == MetricType::ProductivityScore));
    }

    #[test]
    fn score_blends_ratings_and_distraction_density() {
        let mut s = terminal_session(SessionState::Completed);
        s.focus_quality = Some(10);
        s.productivity_rating = Some(10);
        s.distraction_count = 0;
        // Perfect ratings, zero distractions: full marks.
        assert_eq!(productivity_score(&s), Some(100.0));

        s.distraction_count = 25;
        let with_noise = productivity_score(&s).unwrap();
        assert!(with_noise < 100.0);

        s.focus_quality = None;
        s.productivity_rating = None;
        assert_eq!(productivity_score(&s), None);
    }
}
