//! Streak continuity over completed sessions.
//!
//! A streak counts consecutive qualifying calendar periods with at least
//! one successfully completed session. Each streak type has its own
//! period granularity and is updated independently. Updates are
//! idempotent per session id: a retried completion event never
//! double-increments.
//!
//! Calendar arithmetic is done in UTC (see DESIGN.md).

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, StorageError};
use crate::storage::Database;

/// Streak flavors tracked per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakType {
    DailySessions,
    WeeklyHours,
    MonthlyConsistency,
    SessionCompletion,
}

impl StreakType {
    pub const ALL: [StreakType; 4] = [
        StreakType::DailySessions,
        StreakType::WeeklyHours,
        StreakType::MonthlyConsistency,
        StreakType::SessionCompletion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakType::DailySessions => "daily_sessions",
            StreakType::WeeklyHours => "weekly_hours",
            StreakType::MonthlyConsistency => "monthly_consistency",
            StreakType::SessionCompletion => "session_completion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily_sessions" => Some(StreakType::DailySessions),
            "weekly_hours" => Some(StreakType::WeeklyHours),
            "monthly_consistency" => Some(StreakType::MonthlyConsistency),
            "session_completion" => Some(StreakType::SessionCompletion),
            _ => None,
        }
    }

    /// Number of whole periods between two calendar days at this streak's
    /// granularity: days, ISO weeks, or calendar months.
    pub fn period_gap(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        match self {
            StreakType::DailySessions | StreakType::SessionCompletion => {
                (to - from).num_days()
            }
            StreakType::WeeklyHours => {
                (week_start(to) - week_start(from)).num_days() / 7
            }
            StreakType::MonthlyConsistency => {
                month_index(to) - month_index(from)
            }
        }
    }
}

fn week_start(d: NaiveDate) -> NaiveDate {
    d - Duration::days(i64::from(d.weekday().num_days_from_monday()))
}

fn month_index(d: NaiveDate) -> i64 {
    i64::from(d.year()) * 12 + i64::from(d.month0())
}

/// Per-user, per-type running streak count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub user_id: String,
    pub streak_type: StreakType,
    pub current_streak: u32,
    /// High-water mark, updated monotonically.
    pub longest_streak: u32,
    pub last_session_date: Option<NaiveDate>,
    pub streak_start_date: Option<NaiveDate>,
}

impl StreakRecord {
    pub fn new(user_id: &str, streak_type: StreakType) -> Self {
        Self {
            user_id: user_id.to_string(),
            streak_type,
            current_streak: 0,
            longest_streak: 0,
            last_session_date: None,
            streak_start_date: None,
        }
    }
}

/// Applies completed-session contributions to streak records.
pub struct StreakCalculator<'a> {
    db: &'a Database,
}

impl<'a> StreakCalculator<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Apply one successful completion on calendar day `day` to every
    /// streak type. Safe to re-run for the same session id: the
    /// contribution claim is keyed on it, so retries are no-ops.
    ///
    /// Claim and record update commit together per streak type. A failed
    /// update rolls the claim back with it, so a retried completion
    /// event still counts the session instead of hitting a burned claim.
    ///
    /// Returns the records that actually changed.
    pub fn apply_completion(
        &self,
        user_id: &str,
        session_id: &str,
        day: NaiveDate,
    ) -> Result<Vec<StreakRecord>, EngineError> {
        let mut updated = Vec::new();
        for streak_type in StreakType::ALL {
            let tx = self
                .db
                .conn()
                .unchecked_transaction()
                .map_err(StorageError::from)?;
            if !self.db.claim_streak_contribution(user_id, streak_type, session_id)? {
                continue; // already counted for this session
            }
            let record = self.advance(user_id, streak_type, day)?;
            tx.commit().map_err(StorageError::from)?;
            updated.push(record);
        }
        Ok(updated)
    }

    fn advance(
        &self,
        user_id: &str,
        streak_type: StreakType,
        day: NaiveDate,
    ) -> Result<StreakRecord, EngineError> {
        let mut record = self
            .db
            .fetch_streak(user_id, streak_type)?
            .unwrap_or_else(|| StreakRecord::new(user_id, streak_type));

        match record.last_session_date {
            None => {
                record.current_streak = 1;
                record.streak_start_date = Some(day);
            }
            Some(last) => match streak_type.period_gap(last, day) {
                // Same period already counted; a late-arriving completion
                // for an earlier period (negative gap) changes nothing.
                g if g <= 0 => {}
                1 => record.current_streak += 1,
                _ => {
                    record.current_streak = 1;
                    record.streak_start_date = Some(day);
                }
            },
        }

        record.longest_streak = record.longest_streak.max(record.current_streak);
        record.last_session_date = Some(match record.last_session_date {
            Some(last) => last.max(day),
            None => day,
        });

        self.db.upsert_streak(&record)?;
        Ok(record)
    }
}
