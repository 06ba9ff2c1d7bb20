//! Turnview - response stream controller driven over stdio
//!
//! Backend events and user commands arrive on stdin as JSON lines; view
//! events, forwarded user messages and saved-response lists go to stdout,
//! one JSON object per line. Logs go to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use turnview::db::Database;
use turnview::runtime::DatabaseKv;
use turnview::stream::ViewContext;
use turnview::{driver, ViewConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnview=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ViewConfig::from_env();
    if !config.profile.is_known() {
        tracing::warn!(profile = %config.profile, "Unknown profile, using generic assistant name");
    }

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let context = ViewContext::new(uuid::Uuid::new_v4().to_string(), config.profile.clone())
        .with_terminal_keywords(config.terminal_keywords.clone());

    driver::serve(
        tokio::io::stdin(),
        tokio::io::stdout(),
        context,
        DatabaseKv::new(db),
        config.reveal,
    )
    .await?;

    tracing::info!("Exiting");
    Ok(())
}
