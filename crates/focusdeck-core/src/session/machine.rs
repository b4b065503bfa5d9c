//! Session lifecycle state machine.
//!
//! ## State Transitions
//!
//! ```text
//! start -> Active <-> Paused -> (Completed | Cancelled)
//! ```
//!
//! All transitions are conditional writes keyed by the state the session
//! was read in; losing a write race surfaces as `Conflict` and the caller
//! re-fetches. Side effects of terminal transitions (streaks, analytics,
//! reminder cancellation) run after the primary write commits and are
//! absorbed on failure -- the lifecycle operation itself never rolls back
//! because a derived view could not be updated.

use chrono::{DateTime, Utc};

use super::time;
use super::{
    validate_rating, CompletionOutcome, FocusSession, RatingsUpdate, SessionPlan,
    SessionState, SessionType, SessionView,
};
use crate::analytics::AnalyticsAggregator;
use crate::distraction::{Distraction, DistractionDraft, DistractionLedger};
use crate::error::EngineError;
use crate::events::Event;
use crate::reminder::ReminderScheduler;
use crate::storage::{Config, Database, DurationsConfig};
use crate::streak::StreakCalculator;

/// Maximum plannable focus block: one day.
const MAX_PLANNED_MINUTES: u32 = 24 * 60;

/// Owns session creation and every lifecycle transition.
pub struct SessionEngine {
    db: Database,
    reminders: ReminderScheduler,
    durations: DurationsConfig,
}

impl SessionEngine {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            reminders: ReminderScheduler::disabled(),
            durations: DurationsConfig::default(),
        }
    }

    pub fn with_config(db: Database, reminders: ReminderScheduler, config: &Config) -> Self {
        Self {
            db,
            reminders,
            durations: config.durations.clone(),
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create and activate a new session. A plan without an explicit
    /// duration gets the configured default for its session type.
    ///
    /// # Errors
    /// `Conflict` when the user already has a non-terminal session; the
    /// check-and-create is a single conditional insert, so concurrent
    /// starts cannot both win.
    pub fn start(
        &self,
        user_id: &str,
        plan: SessionPlan,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        let planned_minutes = plan
            .planned_duration_minutes
            .unwrap_or_else(|| self.durations.for_type(plan.session_type));
        if planned_minutes == 0 || planned_minutes > MAX_PLANNED_MINUTES {
            return Err(EngineError::Validation {
                field: "planned_duration_minutes",
                message: format!(
                    "must be between 1 and {MAX_PLANNED_MINUTES}, got {planned_minutes}"
                ),
            });
        }
        validate_rating("mood_before", plan.mood_before)?;
        validate_rating("energy_before", plan.energy_before)?;

        let session = FocusSession::from_plan(user_id, plan, planned_minutes, now);
        if !self.db.insert_session(&session)? {
            return Err(EngineError::Conflict(
                "an active session already exists for this user".into(),
            ));
        }

        self.emit(Event::SessionStarted {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
            session_type: session.session_type,
            planned_duration_minutes: session.planned_duration_minutes,
            at: now,
        });
        if let Some(reminder) = self.reminders.session_started(&session) {
            self.emit(Event::ReminderScheduled {
                session_id: session.id.clone(),
                due_at: reminder.due_at,
                at: now,
            });
        }
        Ok(SessionView::at(session, now))
    }

    /// Pause a running session. Pausing an already-paused session is a
    /// successful no-op.
    pub fn pause(
        &self,
        session_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        let mut session = self.owned_session(session_id, user_id)?;
        match session.state {
            SessionState::Paused => Ok(SessionView::at(session, now)),
            state if state.is_terminal() => Err(EngineError::InvalidState {
                session_id: session_id.to_string(),
                state,
            }),
            _ => {
                time::record_pause(&mut session.pause_intervals, now);
                session.state = SessionState::Paused;
                session.updated_at = now;
                self.commit_transition(&session, SessionState::Active)?;

                self.emit(Event::SessionPaused {
                    session_id: session.id.clone(),
                    elapsed_seconds: session.elapsed_seconds(now),
                    at: now,
                });
                if session.session_type == SessionType::Pomodoro
                    && self.reminders.session_paused(&session)
                {
                    self.emit(Event::ReminderCancelled {
                        session_id: session.id.clone(),
                        at: now,
                    });
                }
                Ok(SessionView::at(session, now))
            }
        }
    }

    /// Resume a paused session. Resuming an already-active session is a
    /// successful no-op.
    pub fn resume(
        &self,
        session_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        let mut session = self.owned_session(session_id, user_id)?;
        match session.state {
            SessionState::Active => Ok(SessionView::at(session, now)),
            state if state.is_terminal() => Err(EngineError::InvalidState {
                session_id: session_id.to_string(),
                state,
            }),
            _ => {
                if !time::close_pause(&mut session.pause_intervals, now) {
                    // Paused state without an open interval means a
                    // client/server desync; elapsed time is unaffected.
                    tracing::warn!(
                        session_id = %session.id,
                        "resume without an open pause interval"
                    );
                }
                session.state = SessionState::Active;
                session.updated_at = now;
                self.commit_transition(&session, SessionState::Paused)?;

                self.emit(Event::SessionResumed {
                    session_id: session.id.clone(),
                    elapsed_seconds: session.elapsed_seconds(now),
                    at: now,
                });
                if let Some(reminder) = self.reminders.session_resumed(&session, now) {
                    self.emit(Event::ReminderScheduled {
                        session_id: session.id.clone(),
                        due_at: reminder.due_at,
                        at: now,
                    });
                }
                Ok(SessionView::at(session, now))
            }
        }
    }

    /// Complete a session from Active or Paused.
    ///
    /// The actual duration is always computed server-side from the
    /// session's own timestamps; success defaults to true unless the
    /// caller overrides it.
    pub fn complete(
        &self,
        session_id: &str,
        user_id: &str,
        outcome: CompletionOutcome,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        validate_rating("mood_after", outcome.mood_after)?;
        validate_rating("energy_after", outcome.energy_after)?;
        validate_rating("focus_quality", outcome.focus_quality)?;
        validate_rating("productivity_rating", outcome.productivity_rating)?;

        let mut session = self.owned_session(session_id, user_id)?;
        if session.state.is_terminal() {
            return Err(EngineError::InvalidState {
                session_id: session_id.to_string(),
                state: session.state,
            });
        }
        let expected = session.state;

        time::close_pause(&mut session.pause_intervals, now);
        let elapsed = time::elapsed_seconds(session.started_at, &session.pause_intervals, now);
        session.state = SessionState::Completed;
        session.actual_duration_minutes = Some(round_minutes(elapsed));
        session.is_successful = Some(outcome.is_successful.unwrap_or(true));
        if let Some(count) = outcome.completed_task_count {
            session.completed_task_count = count;
        }
        session.mood_after = outcome.mood_after.or(session.mood_after);
        session.energy_after = outcome.energy_after.or(session.energy_after);
        session.focus_quality = outcome.focus_quality.or(session.focus_quality);
        session.productivity_rating = outcome.productivity_rating.or(session.productivity_rating);
        session.completed_at = Some(now);
        session.updated_at = now;
        self.commit_transition(&session, expected)?;

        if session.session_type == SessionType::Pomodoro
            && self.reminders.session_closed(&session)
        {
            self.emit(Event::ReminderCancelled {
                session_id: session.id.clone(),
                at: now,
            });
        }
        self.emit(Event::SessionCompleted {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
            actual_duration_minutes: session.actual_duration_minutes.unwrap_or(0),
            is_successful: session.is_successful.unwrap_or(true),
            at: now,
        });
        self.dispatch_terminal_effects(&session, now);
        Ok(SessionView::at(session, now))
    }

    /// Cancel a session from Active or Paused. Never contributes to
    /// streaks, but the attempt still shows up in analytics.
    pub fn cancel(
        &self,
        session_id: &str,
        user_id: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        let mut session = self.owned_session(session_id, user_id)?;
        if session.state.is_terminal() {
            return Err(EngineError::InvalidState {
                session_id: session_id.to_string(),
                state: session.state,
            });
        }
        let expected = session.state;

        time::close_pause(&mut session.pause_intervals, now);
        let elapsed = time::elapsed_seconds(session.started_at, &session.pause_intervals, now);
        session.state = SessionState::Cancelled;
        session.actual_duration_minutes = Some(round_minutes(elapsed));
        session.is_successful = Some(false);
        session.cancellation_reason = reason.clone();
        session.completed_at = Some(now);
        session.updated_at = now;
        self.commit_transition(&session, expected)?;

        if session.session_type == SessionType::Pomodoro
            && self.reminders.session_closed(&session)
        {
            self.emit(Event::ReminderCancelled {
                session_id: session.id.clone(),
                at: now,
            });
        }
        self.emit(Event::SessionCancelled {
            session_id: session.id.clone(),
            user_id: session.user_id.clone(),
            actual_duration_minutes: session.actual_duration_minutes.unwrap_or(0),
            reason,
            at: now,
        });
        self.dispatch_terminal_effects(&session, now);
        Ok(SessionView::at(session, now))
    }

    // ── Attached records ─────────────────────────────────────────────

    /// Record a distraction against the user's session.
    pub fn record_distraction(
        &self,
        session_id: &str,
        user_id: &str,
        draft: DistractionDraft,
        now: DateTime<Utc>,
    ) -> Result<Distraction, EngineError> {
        let distraction =
            DistractionLedger::new(&self.db).record(session_id, user_id, draft, now)?;
        self.emit(Event::DistractionRecorded {
            session_id: session_id.to_string(),
            distraction_id: distraction.id.clone(),
            impact_level: distraction.impact_level,
            at: now,
        });
        Ok(distraction)
    }

    /// Apply late-arriving subjective ratings to a terminal session.
    /// Everything else about a terminal session is immutable.
    pub fn set_ratings(
        &self,
        session_id: &str,
        user_id: &str,
        update: RatingsUpdate,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        validate_rating("mood_after", update.mood_after)?;
        validate_rating("energy_after", update.energy_after)?;
        validate_rating("focus_quality", update.focus_quality)?;
        validate_rating("productivity_rating", update.productivity_rating)?;

        let mut session = self.owned_session(session_id, user_id)?;
        if !session.state.is_terminal() {
            return Err(EngineError::Conflict(
                "session is still open; submit ratings when completing it".into(),
            ));
        }

        session.mood_after = update.mood_after.or(session.mood_after);
        session.energy_after = update.energy_after.or(session.energy_after);
        session.focus_quality = update.focus_quality.or(session.focus_quality);
        session.productivity_rating =
            update.productivity_rating.or(session.productivity_rating);
        session.updated_at = now;
        self.db.update_ratings(&session)?;
        Ok(SessionView::at(session, now))
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch one session with its recomputed elapsed time.
    pub fn session(
        &self,
        session_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionView, EngineError> {
        let session = self.owned_session(session_id, user_id)?;
        Ok(SessionView::at(session, now))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn owned_session(
        &self,
        session_id: &str,
        user_id: &str,
    ) -> Result<FocusSession, EngineError> {
        let session = self
            .db
            .fetch_session(session_id)?
            .ok_or_else(|| EngineError::NotFound(session_id.to_string()))?;
        // Forbidden, not NotFound: the id is real, it just isn't yours.
        if session.user_id != user_id {
            return Err(EngineError::Forbidden(session_id.to_string()));
        }
        Ok(session)
    }

    fn commit_transition(
        &self,
        session: &FocusSession,
        expected: SessionState,
    ) -> Result<(), EngineError> {
        if self.db.apply_transition(session, expected)? {
            Ok(())
        } else {
            Err(EngineError::Conflict(
                "session state changed concurrently; re-fetch and retry".into(),
            ))
        }
    }

    /// Streak and analytics updates for a now-terminal session. Runs
    /// after the transition is durably committed; failures here are
    /// logged and absorbed so the completed/cancelled state stands.
    fn dispatch_terminal_effects(&self, session: &FocusSession, now: DateTime<Utc>) {
        if let Err(e) = AnalyticsAggregator::new(&self.db).emit_for_terminal(session, now) {
            tracing::warn!(
                session_id = %session.id,
                error = %e,
                "failed to emit analytics metrics for terminal session"
            );
        }

        if session.state == SessionState::Completed && session.is_successful == Some(true) {
            let day = session.completed_at.unwrap_or(now).date_naive();
            match StreakCalculator::new(&self.db).apply_completion(&session.user_id, &session.id, day)
            {
                Ok(updated) => {
                    for record in updated {
                        self.emit(Event::StreakAdvanced {
                            user_id: record.user_id.clone(),
                            streak_type: record.streak_type,
                            current_streak: record.current_streak,
                            at: now,
                        });
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.id,
                        error = %e,
                        "failed to apply streak contribution"
                    );
                }
            }
        }
    }

    /// Structured audit trail of every lifecycle change.
    fn emit(&self, event: Event) {
        tracing::debug!(event = ?event, "lifecycle event");
    }
}

/// Round elapsed seconds to whole minutes, half-up.
fn round_minutes(elapsed_seconds: i64) -> u32 {
    ((elapsed_seconds + 30) / 60).max(0) as u32
}
