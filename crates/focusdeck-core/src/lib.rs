//! # Focusdeck Core Library
//!
//! Core business logic for the Focusdeck focus-session service: the
//! session lifecycle state machine, distraction ledger, streak
//! continuity, productivity analytics, and break-reminder scheduling,
//! backed by SQLite storage and TOML configuration. The HTTP crate is a
//! thin layer over this library.
//!
//! ## Architecture
//!
//! - **Session engine**: a wall-clock-based state machine; elapsed time
//!   is recomputed from timestamps on read, never advanced by a
//!   background thread
//! - **Storage**: SQLite session/streak/metric persistence whose schema
//!   carries the concurrency invariants (partial unique active-session
//!   index, conditional transition updates)
//! - **Side effects**: streaks, analytics, and reminders are driven off
//!   committed terminal transitions and absorb their own failures
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: lifecycle state machine
//! - [`Database`]: session, distraction, streak, and metric persistence
//! - [`AnalyticsAggregator`]: dashboard and trend queries
//! - [`StreakCalculator`]: calendar-period continuity
//! - [`ReminderSink`]: seam for the external notification transport

pub mod analytics;
pub mod distraction;
pub mod error;
pub mod events;
pub mod reminder;
pub mod session;
pub mod storage;
pub mod streak;

pub use analytics::{AnalyticsAggregator, AnalyticsMetric, AnalyticsPeriod, Dashboard, MetricType, TrendPoint};
pub use distraction::{Distraction, DistractionDraft, DistractionLedger, DistractionType, UserResponse};
pub use error::{ConfigError, EngineError, StorageError};
pub use events::Event;
pub use reminder::{BreakReminder, NullSink, ReminderError, ReminderScheduler, ReminderSink};
pub use session::machine::SessionEngine;
pub use session::{
    CompletionOutcome, Environment, FocusSession, PauseInterval, RatingsUpdate, SessionPlan,
    SessionState, SessionType, SessionView,
};
pub use storage::{Config, Database, DurationsConfig};
pub use streak::{StreakCalculator, StreakRecord, StreakType};
