use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionType;
use crate::streak::StreakType;

/// Every lifecycle change in the engine produces an Event.
///
/// The break-reminder scheduler consumes these; side-effect consumers
/// (streaks, analytics) are driven off the terminal events after the
/// primary transition has been committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: String,
        user_id: String,
        session_type: SessionType,
        planned_duration_minutes: u32,
        at: DateTime<Utc>,
    },
    SessionPaused {
        session_id: String,
        elapsed_seconds: i64,
        at: DateTime<Utc>,
    },
    SessionResumed {
        session_id: String,
        elapsed_seconds: i64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: String,
        user_id: String,
        actual_duration_minutes: u32,
        is_successful: bool,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        session_id: String,
        user_id: String,
        actual_duration_minutes: u32,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
    DistractionRecorded {
        session_id: String,
        distraction_id: String,
        impact_level: u8,
        at: DateTime<Utc>,
    },
    StreakAdvanced {
        user_id: String,
        streak_type: StreakType,
        current_streak: u32,
        at: DateTime<Utc>,
    },
    ReminderScheduled {
        session_id: String,
        due_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    ReminderCancelled {
        session_id: String,
        at: DateTime<Utc>,
    },
}
