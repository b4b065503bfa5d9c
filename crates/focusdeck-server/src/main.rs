//! Focusdeck server binary.
//!
//! Loads the TOML configuration, opens the SQLite database in the data
//! directory, and serves the focus-session API over HTTP.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use focusdeck_core::{
    storage, BreakReminder, Config, Database, ReminderError, ReminderScheduler, ReminderSink,
    SessionEngine,
};
use focusdeck_server::create_app;

/// Sink that surfaces reminders through the structured log. Stands in
/// until a push-notification transport is configured.
struct LogSink;

impl ReminderSink for LogSink {
    fn schedule(&self, reminder: &BreakReminder) -> Result<(), ReminderError> {
        tracing::info!(
            session_id = %reminder.session_id,
            user_id = %reminder.user_id,
            due_at = %reminder.due_at,
            "break reminder scheduled"
        );
        Ok(())
    }

    fn cancel(&self, session_id: &str) -> Result<(), ReminderError> {
        tracing::info!(session_id = %session_id, "break reminder cancelled");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().context("loading configuration")?;

    let db_path = storage::data_dir()
        .context("resolving data directory")?
        .join(&config.database_file);
    let db = Database::open_at(&db_path).context("opening database")?;
    tracing::info!(path = %db_path.display(), "database ready");

    let reminders = if config.reminders.enabled {
        ReminderScheduler::new(Box::new(LogSink))
    } else {
        ReminderScheduler::disabled()
    };
    let engine = SessionEngine::with_config(db, reminders, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("parsing server address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "focusdeck listening");

    axum::serve(listener, create_app(engine)).await?;
    Ok(())
}
