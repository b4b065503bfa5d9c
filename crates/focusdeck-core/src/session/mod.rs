//! Focus session model and lifecycle engine.
//!
//! A session is one bounded attempt at focused work. Its state machine is
//! wall-clock based: elapsed time is recomputed from timestamps on every
//! read, never advanced by a background thread.

pub mod machine;
pub mod time;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;

/// Kind of focus session being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Pomodoro,
    DeepWork,
    Custom,
    Sprint,
    Flow,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Pomodoro => "pomodoro",
            SessionType::DeepWork => "deep_work",
            SessionType::Custom => "custom",
            SessionType::Sprint => "sprint",
            SessionType::Flow => "flow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pomodoro" => Some(SessionType::Pomodoro),
            "deep_work" => Some(SessionType::DeepWork),
            "custom" => Some(SessionType::Custom),
            "sprint" => Some(SessionType::Sprint),
            "flow" => Some(SessionType::Flow),
            _ => None,
        }
    }
}

/// Lifecycle state. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionState::Active),
            "paused" => Some(SessionState::Paused),
            "completed" => Some(SessionState::Completed),
            "cancelled" => Some(SessionState::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pause span. `resumed_at` is `None` while the pause is still open.
///
/// Stored as an ordered JSON array on the session row; always typed inside
/// the engine, serialized only at the storage boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauseInterval {
    pub paused_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed_at: Option<DateTime<Utc>>,
}

/// Ambient conditions the user recorded when starting the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_level: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<String>,
}

/// Caller-supplied plan for a new session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPlan {
    pub session_type: SessionType,
    /// Omitted: the configured default for the session type applies.
    #[serde(default)]
    pub planned_duration_minutes: Option<u32>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub planned_task_count: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub mood_before: Option<u8>,
    #[serde(default)]
    pub energy_before: Option<u8>,
}

/// Caller-supplied outcome when completing a session.
///
/// The server computes the actual duration itself; clients cannot supply
/// one (the server clock is the authority).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionOutcome {
    /// Explicit success override; defaults to `true` when absent.
    #[serde(default)]
    pub is_successful: Option<bool>,
    #[serde(default)]
    pub completed_task_count: Option<u32>,
    #[serde(default)]
    pub mood_after: Option<u8>,
    #[serde(default)]
    pub energy_after: Option<u8>,
    #[serde(default)]
    pub focus_quality: Option<u8>,
    #[serde(default)]
    pub productivity_rating: Option<u8>,
}

/// Late-arriving subjective ratings for an already-terminal session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatingsUpdate {
    #[serde(default)]
    pub mood_after: Option<u8>,
    #[serde(default)]
    pub energy_after: Option<u8>,
    #[serde(default)]
    pub focus_quality: Option<u8>,
    #[serde(default)]
    pub productivity_rating: Option<u8>,
}

/// One attempted period of focused work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub user_id: String,

    // Plan
    pub session_type: SessionType,
    pub planned_duration_minutes: u32,
    pub task_id: Option<String>,
    pub planned_task_count: Option<u32>,
    pub tags: Vec<String>,
    pub environment: Option<Environment>,

    // Progress
    pub state: SessionState,
    pub pause_intervals: Vec<PauseInterval>,
    pub completed_task_count: u32,
    pub distraction_count: u32,

    // Outcome
    pub actual_duration_minutes: Option<u32>,
    pub is_successful: Option<bool>,
    pub cancellation_reason: Option<String>,
    pub mood_before: Option<u8>,
    pub mood_after: Option<u8>,
    pub energy_before: Option<u8>,
    pub energy_after: Option<u8>,
    pub focus_quality: Option<u8>,
    pub productivity_rating: Option<u8>,

    // Timestamps
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FocusSession {
    /// Build a fresh `Active` session from a validated plan.
    ///
    /// `planned_minutes` is the already-resolved duration: the plan's own
    /// value or, when it was omitted, the configured per-type default.
    pub fn from_plan(
        user_id: &str,
        plan: SessionPlan,
        planned_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            session_type: plan.session_type,
            planned_duration_minutes: planned_minutes,
            task_id: plan.task_id,
            planned_task_count: plan.planned_task_count,
            tags: plan.tags,
            environment: plan.environment,
            state: SessionState::Active,
            pause_intervals: Vec::new(),
            completed_task_count: 0,
            distraction_count: 0,
            actual_duration_minutes: None,
            is_successful: None,
            cancellation_reason: None,
            mood_before: plan.mood_before,
            mood_after: None,
            energy_before: plan.energy_before,
            energy_after: None,
            focus_quality: None,
            productivity_rating: None,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Server-computed elapsed focus seconds as of `now`.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        let upper = self.completed_at.unwrap_or(now);
        time::elapsed_seconds(self.started_at, &self.pause_intervals, upper)
    }
}

/// Session plus the recomputed elapsed figure, as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub session: FocusSession,
    pub elapsed_seconds: i64,
}

impl SessionView {
    pub fn at(session: FocusSession, now: DateTime<Utc>) -> Self {
        let elapsed_seconds = session.elapsed_seconds(now);
        Self {
            session,
            elapsed_seconds,
        }
    }
}

/// Subjective scales are 1..=10; reject anything else at the boundary.
pub(crate) fn validate_rating(
    field: &'static str,
    value: Option<u8>,
) -> Result<(), EngineError> {
    match value {
        Some(v) if !(1..=10).contains(&v) => Err(EngineError::Validation {
            field,
            message: format!("must be between 1 and 10, got {v}"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_type_round_trips_through_str() {
        for t in [
            SessionType::Pomodoro,
            SessionType::DeepWork,
            SessionType::Custom,
            SessionType::Sprint,
            SessionType::Flow,
        ] {
            assert_eq!(SessionType::parse(t.as_str()), Some(t));
        }
        assert_eq!(SessionType::parse("nap"), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!SessionState::Active.is_terminal());
        assert!(!SessionState::Paused.is_terminal());
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
    }

    #[test]
    fn rating_bounds() {
        assert!(validate_rating("mood_before", None).is_ok());
        assert!(validate_rating("mood_before", Some(1)).is_ok());
        assert!(validate_rating("mood_before", Some(10)).is_ok());
        assert!(validate_rating("mood_before", Some(0)).is_err());
        assert!(validate_rating("mood_before", Some(11)).is_err());
    }
}
