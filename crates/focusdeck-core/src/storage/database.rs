//! SQLite-based persistence for sessions, distractions, streaks, and
//! analytics metrics.
//!
//! Concurrency-sensitive invariants live in the schema, not in
//! read-then-write code:
//! - single active session per user: partial unique index over
//!   non-terminal states, so a racing second `start` fails its insert
//! - lifecycle transitions: conditional `UPDATE ... WHERE state = ?`,
//!   zero rows changed means the caller lost a race
//! - streak dedup: `INSERT OR IGNORE` into a contribution claim table

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use super::migrations;
use crate::analytics::{AnalyticsMetric, MetricType};
use crate::distraction::{Distraction, DistractionType, UserResponse};
use crate::error::StorageError;
use crate::session::{FocusSession, SessionState, SessionType};
use crate::streak::{StreakRecord, StreakType};

// === Helper Functions ===

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_optional_datetime(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

fn parse_date(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

fn parse_rating(v: Option<i64>) -> Option<u8> {
    v.map(|v| v.clamp(0, 255) as u8)
}

/// Build a FocusSession from a database row (see SESSION_COLUMNS order).
fn row_to_session(row: &rusqlite::Row) -> Result<FocusSession, rusqlite::Error> {
    let session_type: String = row.get(2)?;
    let state: String = row.get(8)?;
    let tags: String = row.get(6)?;
    let environment: Option<String> = row.get(7)?;
    let pause_intervals: String = row.get(9)?;
    let started_at: String = row.get(21)?;
    let created_at: String = row.get(23)?;
    let updated_at: String = row.get(24)?;

    Ok(FocusSession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        session_type: SessionType::parse(&session_type).unwrap_or(SessionType::Custom),
        planned_duration_minutes: row.get::<_, i64>(3)?.max(0) as u32,
        task_id: row.get(4)?,
        planned_task_count: row.get::<_, Option<i64>>(5)?.map(|v| v.max(0) as u32),
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        environment: environment.and_then(|e| serde_json::from_str(&e).ok()),
        state: SessionState::parse(&state).unwrap_or(SessionState::Cancelled),
        pause_intervals: serde_json::from_str(&pause_intervals).unwrap_or_default(),
        completed_task_count: row.get::<_, i64>(10)?.max(0) as u32,
        distraction_count: row.get::<_, i64>(11)?.max(0) as u32,
        actual_duration_minutes: row.get::<_, Option<i64>>(12)?.map(|v| v.max(0) as u32),
        is_successful: row.get::<_, Option<i64>>(13)?.map(|v| v != 0),
        cancellation_reason: row.get(14)?,
        mood_before: parse_rating(row.get(15)?),
        mood_after: parse_rating(row.get(16)?),
        energy_before: parse_rating(row.get(17)?),
        energy_after: parse_rating(row.get(18)?),
        focus_quality: parse_rating(row.get(19)?),
        productivity_rating: parse_rating(row.get(20)?),
        started_at: parse_datetime_fallback(&started_at),
        completed_at: parse_optional_datetime(row.get(22)?),
        created_at: parse_datetime_fallback(&created_at),
        updated_at: parse_datetime_fallback(&updated_at),
    })
}

const SESSION_COLUMNS: &str = "id, user_id, session_type, planned_duration_min, task_id, \
     planned_task_count, tags, environment, state, pause_intervals, completed_task_count, \
     distraction_count, actual_duration_min, is_successful, cancellation_reason, \
     mood_before, mood_after, energy_before, energy_after, focus_quality, \
     productivity_rating, started_at, completed_at, created_at, updated_at";

/// Aggregate figures over a user's terminal sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionTotals {
    pub total_sessions: u64,
    pub successful_sessions: u64,
    pub total_focus_minutes: u64,
    pub total_distractions: u64,
    /// Terminal sessions carrying an actual duration (for averaging).
    pub sessions_with_duration: u64,
    pub sum_duration_minutes: u64,
    pub avg_productivity_rating: Option<f64>,
}

/// SQLite database for the focus engine.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/focusdeck/focusdeck.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("focusdeck.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and ephemeral setups).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id                   TEXT PRIMARY KEY,
                user_id              TEXT NOT NULL,
                session_type         TEXT NOT NULL,
                planned_duration_min INTEGER NOT NULL,
                task_id              TEXT,
                planned_task_count   INTEGER,
                tags                 TEXT NOT NULL DEFAULT '[]',
                environment          TEXT,
                state                TEXT NOT NULL,
                pause_intervals      TEXT NOT NULL DEFAULT '[]',
                completed_task_count INTEGER NOT NULL DEFAULT 0,
                distraction_count    INTEGER NOT NULL DEFAULT 0,
                actual_duration_min  INTEGER,
                is_successful        INTEGER,
                cancellation_reason  TEXT,
                mood_before          INTEGER,
                mood_after           INTEGER,
                energy_before        INTEGER,
                energy_after         INTEGER,
                focus_quality        INTEGER,
                productivity_rating  INTEGER,
                started_at           TEXT NOT NULL,
                completed_at         TEXT,
                created_at           TEXT NOT NULL,
                updated_at           TEXT NOT NULL
            );

            -- The single-active-session invariant. A second insert for the
            -- same user while a non-terminal session exists violates this
            -- index, which is how concurrent starts lose atomically.
            CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_one_active_per_user
                ON sessions(user_id) WHERE state IN ('active', 'paused');

            CREATE TABLE IF NOT EXISTS distractions (
                id               TEXT PRIMARY KEY,
                session_id       TEXT NOT NULL,
                user_id          TEXT NOT NULL,
                kind             TEXT NOT NULL,
                impact_level     INTEGER NOT NULL,
                occurred_at      TEXT NOT NULL,
                duration_seconds INTEGER,
                user_response    TEXT,
                created_at       TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS streaks (
                user_id           TEXT NOT NULL,
                streak_type       TEXT NOT NULL,
                current_streak    INTEGER NOT NULL DEFAULT 0,
                longest_streak    INTEGER NOT NULL DEFAULT 0,
                last_session_date TEXT,
                streak_start_date TEXT,
                PRIMARY KEY (user_id, streak_type)
            );

            CREATE TABLE IF NOT EXISTS streak_contributions (
                user_id     TEXT NOT NULL,
                streak_type TEXT NOT NULL,
                session_id  TEXT NOT NULL,
                PRIMARY KEY (user_id, streak_type, session_id)
            );

            CREATE TABLE IF NOT EXISTS analytics_metrics (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                session_id  TEXT NOT NULL,
                metric_type TEXT NOT NULL,
                value       REAL NOT NULL,
                unit        TEXT NOT NULL,
                measured_on TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );",
        )?;

        migrations::migrate(&self.conn)
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        Ok(())
    }

    // === Sessions ===

    /// Insert a freshly started session.
    ///
    /// Returns `false` when the partial unique index rejects the row, i.e.
    /// the user already has a non-terminal session.
    pub fn insert_session(&self, s: &FocusSession) -> Result<bool, StorageError> {
        let result = self.conn.execute(
            "INSERT INTO sessions (id, user_id, session_type, planned_duration_min, task_id,
                planned_task_count, tags, environment, state, pause_intervals,
                completed_task_count, distraction_count, mood_before, energy_before,
                started_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                s.id,
                s.user_id,
                s.session_type.as_str(),
                s.planned_duration_minutes,
                s.task_id,
                s.planned_task_count,
                serde_json::to_string(&s.tags)?,
                s.environment
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                s.state.as_str(),
                serde_json::to_string(&s.pause_intervals)?,
                s.completed_task_count,
                s.distraction_count,
                s.mood_before,
                s.energy_before,
                s.started_at.to_rfc3339(),
                s.created_at.to_rfc3339(),
                s.updated_at.to_rfc3339(),
            ],
        );
        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn fetch_session(&self, id: &str) -> Result<Option<FocusSession>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"
        ))?;
        Ok(stmt.query_row(params![id], row_to_session).optional()?)
    }

    /// The user's current non-terminal session, if any.
    pub fn fetch_active_session(
        &self,
        user_id: &str,
    ) -> Result<Option<FocusSession>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE user_id = ?1 AND state IN ('active', 'paused')"
        ))?;
        Ok(stmt.query_row(params![user_id], row_to_session).optional()?)
    }

    /// Write a lifecycle transition as a conditional update keyed by
    /// `(id, user_id, expected_state)`.
    ///
    /// Returns `false` when no row matched, i.e. the session moved on
    /// since the caller read it.
    pub fn apply_transition(
        &self,
        s: &FocusSession,
        expected: SessionState,
    ) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET
                state = ?1,
                pause_intervals = ?2,
                completed_task_count = ?3,
                actual_duration_min = ?4,
                is_successful = ?5,
                cancellation_reason = ?6,
                mood_after = ?7,
                energy_after = ?8,
                focus_quality = ?9,
                productivity_rating = ?10,
                completed_at = ?11,
                updated_at = ?12
             WHERE id = ?13 AND user_id = ?14 AND state = ?15",
            params![
                s.state.as_str(),
                serde_json::to_string(&s.pause_intervals)?,
                s.completed_task_count,
                s.actual_duration_minutes,
                s.is_successful.map(i64::from),
                s.cancellation_reason,
                s.mood_after,
                s.energy_after,
                s.focus_quality,
                s.productivity_rating,
                s.completed_at.map(|t| t.to_rfc3339()),
                s.updated_at.to_rfc3339(),
                s.id,
                s.user_id,
                expected.as_str(),
            ],
        )?;
        Ok(changed == 1)
    }

    /// Late subjective ratings on a terminal session. Only the rating
    /// columns move; everything else stays immutable.
    pub fn update_ratings(&self, s: &FocusSession) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "UPDATE sessions SET
                mood_after = ?1, energy_after = ?2, focus_quality = ?3,
                productivity_rating = ?4, updated_at = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                s.mood_after,
                s.energy_after,
                s.focus_quality,
                s.productivity_rating,
                s.updated_at.to_rfc3339(),
                s.id,
                s.user_id,
            ],
        )?;
        Ok(changed == 1)
    }

    // === Distractions ===

    /// Append a distraction and bump the owning session's counter in one
    /// transaction.
    pub fn append_distraction(&self, d: &Distraction) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO distractions (id, session_id, user_id, kind, impact_level,
                occurred_at, duration_seconds, user_response, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                d.id,
                d.session_id,
                d.user_id,
                d.kind.as_str(),
                d.impact_level,
                d.occurred_at.to_rfc3339(),
                d.duration_seconds,
                d.user_response.map(|r| r.as_str()),
                d.created_at.to_rfc3339(),
            ],
        )?;
        tx.execute(
            "UPDATE sessions SET distraction_count = distraction_count + 1, updated_at = ?1
             WHERE id = ?2",
            params![d.created_at.to_rfc3339(), d.session_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn fetch_distractions(
        &self,
        session_id: &str,
    ) -> Result<Vec<Distraction>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, user_id, kind, impact_level, occurred_at,
                    duration_seconds, user_response, created_at
             FROM distractions WHERE session_id = ?1 ORDER BY occurred_at ASC",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            let kind: String = row.get(3)?;
            let occurred_at: String = row.get(5)?;
            let user_response: Option<String> = row.get(7)?;
            let created_at: String = row.get(8)?;
            Ok(Distraction {
                id: row.get(0)?,
                session_id: row.get(1)?,
                user_id: row.get(2)?,
                kind: DistractionType::parse(&kind).unwrap_or(DistractionType::Other),
                impact_level: row.get::<_, i64>(4)?.clamp(0, 255) as u8,
                occurred_at: parse_datetime_fallback(&occurred_at),
                duration_seconds: row.get::<_, Option<i64>>(6)?.map(|v| v.max(0) as u32),
                user_response: user_response.as_deref().and_then(UserResponse::parse),
                created_at: parse_datetime_fallback(&created_at),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // === Streaks ===

    /// Claim a session's streak contribution. Returns `false` when the
    /// claim already exists, i.e. this completion was counted before.
    pub fn claim_streak_contribution(
        &self,
        user_id: &str,
        streak_type: StreakType,
        session_id: &str,
    ) -> Result<bool, StorageError> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO streak_contributions (user_id, streak_type, session_id)
             VALUES (?1, ?2, ?3)",
            params![user_id, streak_type.as_str(), session_id],
        )?;
        Ok(changed == 1)
    }

    pub fn fetch_streak(
        &self,
        user_id: &str,
        streak_type: StreakType,
    ) -> Result<Option<StreakRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT current_streak, longest_streak, last_session_date, streak_start_date
             FROM streaks WHERE user_id = ?1 AND streak_type = ?2",
        )?;
        let record = stmt
            .query_row(params![user_id, streak_type.as_str()], |row| {
                Ok(StreakRecord {
                    user_id: user_id.to_string(),
                    streak_type,
                    current_streak: row.get::<_, i64>(0)?.max(0) as u32,
                    longest_streak: row.get::<_, i64>(1)?.max(0) as u32,
                    last_session_date: parse_date(row.get(2)?),
                    streak_start_date: parse_date(row.get(3)?),
                })
            })
            .optional()?;
        Ok(record)
    }

    /// All of a user's streaks with a live count, largest first.
    pub fn fetch_active_streaks(
        &self,
        user_id: &str,
    ) -> Result<Vec<StreakRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT streak_type, current_streak, longest_streak,
                    last_session_date, streak_start_date
             FROM streaks
             WHERE user_id = ?1 AND current_streak > 0
             ORDER BY current_streak DESC, streak_type ASC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let streak_type: String = row.get(0)?;
            Ok((
                streak_type,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (type_str, current, longest, last, start) = row?;
            // Unknown streak types (from a newer schema) are skipped, not fatal.
            let Some(streak_type) = StreakType::parse(&type_str) else {
                continue;
            };
            records.push(StreakRecord {
                user_id: user_id.to_string(),
                streak_type,
                current_streak: current.max(0) as u32,
                longest_streak: longest.max(0) as u32,
                last_session_date: parse_date(last),
                streak_start_date: parse_date(start),
            });
        }
        Ok(records)
    }

    pub fn upsert_streak(&self, r: &StreakRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO streaks (user_id, streak_type, current_streak, longest_streak,
                last_session_date, streak_start_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (user_id, streak_type) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_session_date = excluded.last_session_date,
                streak_start_date = excluded.streak_start_date",
            params![
                r.user_id,
                r.streak_type.as_str(),
                r.current_streak,
                r.longest_streak,
                r.last_session_date.map(|d| d.format("%Y-%m-%d").to_string()),
                r.streak_start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    // === Analytics metrics ===

    pub fn insert_metric(&self, m: &AnalyticsMetric) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO analytics_metrics (id, user_id, session_id, metric_type, value,
                unit, measured_on, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                m.id,
                m.user_id,
                m.session_id,
                m.metric_type.as_str(),
                m.value,
                m.unit,
                m.measured_on.format("%Y-%m-%d").to_string(),
                m.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Per-day, per-metric-type simple averages over a date range.
    ///
    /// Rows with an unparseable date or an unknown metric type are
    /// excluded rather than failing the query.
    pub fn metric_day_averages(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        metric_type: Option<MetricType>,
    ) -> Result<Vec<(NaiveDate, MetricType, f64)>, StorageError> {
        let mut sql = String::from(
            "SELECT measured_on, metric_type, AVG(value)
             FROM analytics_metrics
             WHERE user_id = ?1 AND measured_on >= ?2 AND measured_on <= ?3",
        );
        if metric_type.is_some() {
            sql.push_str(" AND metric_type = ?4");
        }
        sql.push_str(" GROUP BY measured_on, metric_type ORDER BY measured_on ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let from_s = from.format("%Y-%m-%d").to_string();
        let to_s = to.format("%Y-%m-%d").to_string();
        let map = |row: &rusqlite::Row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
            ))
        };
        let rows: Vec<(String, String, f64)> = match metric_type {
            Some(t) => stmt
                .query_map(params![user_id, from_s, to_s, t.as_str()], map)?
                .collect::<Result<_, _>>()?,
            None => stmt
                .query_map(params![user_id, from_s, to_s], map)?
                .collect::<Result<_, _>>()?,
        };

        Ok(rows
            .into_iter()
            .filter_map(|(date, type_str, avg)| {
                let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d").ok()?;
                let metric_type = MetricType::parse(&type_str)?;
                Some((day, metric_type, avg))
            })
            .collect())
    }

    // === Dashboard aggregates ===

    pub fn session_totals(&self, user_id: &str) -> Result<SessionTotals, StorageError> {
        let mut totals = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN state = 'completed' AND is_successful = 1
                                      THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN state = 'completed'
                                      THEN actual_duration_min ELSE 0 END), 0),
                    COALESCE(SUM(distraction_count), 0),
                    COALESCE(SUM(CASE WHEN actual_duration_min IS NOT NULL
                                      THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(COALESCE(actual_duration_min, 0)), 0)
             FROM sessions
             WHERE user_id = ?1 AND state IN ('completed', 'cancelled')",
            params![user_id],
            |row| {
                Ok(SessionTotals {
                    total_sessions: row.get::<_, i64>(0)?.max(0) as u64,
                    successful_sessions: row.get::<_, i64>(1)?.max(0) as u64,
                    total_focus_minutes: row.get::<_, i64>(2)?.max(0) as u64,
                    total_distractions: row.get::<_, i64>(3)?.max(0) as u64,
                    sessions_with_duration: row.get::<_, i64>(4)?.max(0) as u64,
                    sum_duration_minutes: row.get::<_, i64>(5)?.max(0) as u64,
                    avg_productivity_rating: None,
                })
            },
        )?;

        totals.avg_productivity_rating = self.conn.query_row(
            "SELECT AVG(productivity_rating) FROM sessions
             WHERE user_id = ?1 AND productivity_rating IS NOT NULL",
            params![user_id],
            |row| row.get::<_, Option<f64>>(0),
        )?;

        Ok(totals)
    }

    /// Sessions started within [day_start, day_end) and the focus minutes
    /// they produced.
    pub fn today_totals(
        &self,
        user_id: &str,
        day_start: DateTime<Utc>,
        day_end: DateTime<Utc>,
    ) -> Result<(u64, u64), StorageError> {
        self.conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(COALESCE(actual_duration_min, 0)), 0)
                 FROM sessions
                 WHERE user_id = ?1 AND started_at >= ?2 AND started_at < ?3",
                params![user_id, day_start.to_rfc3339(), day_end.to_rfc3339()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?.max(0) as u64,
                        row.get::<_, i64>(1)?.max(0) as u64,
                    ))
                },
            )
            .map_err(Into::into)
    }

    pub fn last_session_at(
        &self,
        user_id: &str,
    ) -> Result<Option<DateTime<Utc>>, StorageError> {
        let latest: Option<String> = self.conn.query_row(
            "SELECT MAX(started_at) FROM sessions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(parse_optional_datetime(latest))
    }
}
