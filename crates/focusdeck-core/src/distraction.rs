//! Distraction ledger: interruptions recorded against a live session.
//!
//! The ledger is append-only. A distraction is created only while its
//! session is non-terminal and is never mutated afterwards; each append
//! atomically bumps the session's distraction counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::storage::Database;

/// What interrupted the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistractionType {
    /// External notification (chat, email, etc.)
    Notification,
    /// Meeting or call
    Meeting,
    /// Colleague interruption
    Colleague,
    /// Self-initiated distraction
    SelfDistraction,
    /// Tool or system interruption
    System,
    /// Unknown or other
    Other,
}

impl DistractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistractionType::Notification => "notification",
            DistractionType::Meeting => "meeting",
            DistractionType::Colleague => "colleague",
            DistractionType::SelfDistraction => "self_distraction",
            DistractionType::System => "system",
            DistractionType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "notification" => Some(DistractionType::Notification),
            "meeting" => Some(DistractionType::Meeting),
            "colleague" => Some(DistractionType::Colleague),
            "self_distraction" => Some(DistractionType::SelfDistraction),
            "system" => Some(DistractionType::System),
            "other" => Some(DistractionType::Other),
            _ => None,
        }
    }
}

/// How the user reacted to the interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserResponse {
    Ignored,
    Addressed,
    Postponed,
    GaveIn,
}

impl UserResponse {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserResponse::Ignored => "ignored",
            UserResponse::Addressed => "addressed",
            UserResponse::Postponed => "postponed",
            UserResponse::GaveIn => "gave_in",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ignored" => Some(UserResponse::Ignored),
            "addressed" => Some(UserResponse::Addressed),
            "postponed" => Some(UserResponse::Postponed),
            "gave_in" => Some(UserResponse::GaveIn),
            _ => None,
        }
    }
}

/// One recorded interruption, owned by the session it references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distraction {
    pub id: String,
    pub session_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: DistractionType,
    /// Severity on a 1-5 scale.
    pub impact_level: u8,
    pub occurred_at: DateTime<Utc>,
    pub duration_seconds: Option<u32>,
    pub user_response: Option<UserResponse>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new distraction.
#[derive(Debug, Clone, Deserialize)]
pub struct DistractionDraft {
    #[serde(rename = "type")]
    pub kind: DistractionType,
    pub impact_level: u8,
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub user_response: Option<UserResponse>,
}

/// Append-only writer over the distractions table.
pub struct DistractionLedger<'a> {
    db: &'a Database,
}

impl<'a> DistractionLedger<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record a distraction against a non-terminal session.
    ///
    /// # Errors
    /// - `NotFound` / `Forbidden` for unknown or foreign session ids
    /// - `InvalidState` if the session is already terminal
    /// - `Validation` for an out-of-range impact level
    pub fn record(
        &self,
        session_id: &str,
        user_id: &str,
        draft: DistractionDraft,
        now: DateTime<Utc>,
    ) -> Result<Distraction, EngineError> {
        if !(1..=5).contains(&draft.impact_level) {
            return Err(EngineError::Validation {
                field: "impact_level",
                message: format!("must be between 1 and 5, got {}", draft.impact_level),
            });
        }

        let session = self
            .db
            .fetch_session(session_id)?
            .ok_or_else(|| EngineError::NotFound(session_id.to_string()))?;
        if session.user_id != user_id {
            return Err(EngineError::Forbidden(session_id.to_string()));
        }
        if session.state.is_terminal() {
            return Err(EngineError::InvalidState {
                session_id: session_id.to_string(),
                state: session.state,
            });
        }

        let distraction = Distraction {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            kind: draft.kind,
            impact_level: draft.impact_level,
            occurred_at: draft.occurred_at.unwrap_or(now),
            duration_seconds: draft.duration_seconds,
            user_response: draft.user_response,
            created_at: now,
        };
        self.db.append_distraction(&distraction)?;
        Ok(distraction)
    }
}
