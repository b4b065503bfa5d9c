//! Break reminders tied to a session's planned duration.
//!
//! The scheduler computes when a reminder is due and hands it to a
//! [`ReminderSink`] (the external notification collaborator). Delivery is
//! best-effort by contract: every sink failure is logged and swallowed so
//! a reminder can never block or fail a session transition.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::session::{time, FocusSession, SessionType};

/// A pending break reminder for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakReminder {
    pub session_id: String,
    pub user_id: String,
    pub due_at: DateTime<Utc>,
}

/// Sink failure. Carries no taxonomy of its own; the scheduler only ever
/// logs it.
#[derive(Debug, Error)]
#[error("reminder delivery unavailable: {0}")]
pub struct ReminderError(pub String);

/// Where scheduled reminders go. Implemented by the notification
/// transport; the engine ships a no-op sink for setups without one.
pub trait ReminderSink: Send + Sync {
    fn schedule(&self, reminder: &BreakReminder) -> Result<(), ReminderError>;
    fn cancel(&self, session_id: &str) -> Result<(), ReminderError>;
}

/// Sink that drops reminders. Used when no notification transport is
/// configured and in tests that don't care about reminders.
#[derive(Debug, Default)]
pub struct NullSink;

impl ReminderSink for NullSink {
    fn schedule(&self, _reminder: &BreakReminder) -> Result<(), ReminderError> {
        Ok(())
    }

    fn cancel(&self, _session_id: &str) -> Result<(), ReminderError> {
        Ok(())
    }
}

/// Reacts to session lifecycle changes by (re)scheduling or cancelling
/// the session's break reminder.
pub struct ReminderScheduler {
    sink: Box<dyn ReminderSink>,
}

impl ReminderScheduler {
    pub fn new(sink: Box<dyn ReminderSink>) -> Self {
        Self { sink }
    }

    pub fn disabled() -> Self {
        Self::new(Box::new(NullSink))
    }

    /// On start: one reminder at `planned_duration_minutes` from
    /// `started_at`, pomodoro sessions only.
    ///
    /// Returns the reminder when the sink accepted it.
    pub fn session_started(&self, session: &FocusSession) -> Option<BreakReminder> {
        if session.session_type != SessionType::Pomodoro {
            return None;
        }
        let due_at =
            session.started_at + Duration::minutes(i64::from(session.planned_duration_minutes));
        self.try_schedule(session, due_at)
    }

    /// On pause: drop the pending reminder; resume re-anchors it.
    pub fn session_paused(&self, session: &FocusSession) -> bool {
        self.try_cancel(&session.id)
    }

    /// On resume: reschedule for the remaining planned focus time.
    pub fn session_resumed(&self, session: &FocusSession, now: DateTime<Utc>) -> Option<BreakReminder> {
        if session.session_type != SessionType::Pomodoro {
            return None;
        }
        let remaining = time::remaining_planned_seconds(
            session.started_at,
            &session.pause_intervals,
            session.planned_duration_minutes,
            now,
        );
        self.try_schedule(session, now + Duration::seconds(remaining))
    }

    /// On complete/cancel: nothing left to remind about.
    pub fn session_closed(&self, session: &FocusSession) -> bool {
        self.try_cancel(&session.id)
    }

    fn try_schedule(&self, session: &FocusSession, due_at: DateTime<Utc>) -> Option<BreakReminder> {
        let reminder = BreakReminder {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
            due_at,
        };
        match self.sink.schedule(&reminder) {
            Ok(()) => Some(reminder),
            Err(e) => {
                tracing::warn!(session_id = %session.id, error = %e, "failed to schedule break reminder");
                None
            }
        }
    }

    fn try_cancel(&self, session_id: &str) -> bool {
        match self.sink.cancel(session_id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(session_id = %session_id, error = %e, "failed to cancel break reminder");
                false
            }
        }
    }
}
