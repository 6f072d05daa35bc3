//! Roster server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `roster-config.yaml` (or defaults)
//! 2. Initialize structured logging (tracing) and check that the
//!    delete-confirmation bundle has been built
//! 3. Connect to `SQLite` and apply migrations
//! 4. Load templates and build shared state
//! 5. Start the session reaper
//! 6. Serve until `Ctrl-C`

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use roster_db::{Database, DatabaseConfig};
use roster_web::{AppConfig, AppState, ServerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "roster-config.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration. Logging is not up yet, so whether the file
    // existed is reported afterwards.
    let (config, from_file) =
        AppConfig::load(Path::new(CONFIG_PATH)).context("loading roster-config.yaml")?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!(from_file, "roster starting");

    // Without the bundle, deletes go through with no confirmation.
    if !config.assets.check_confirm_bundle()? {
        tracing::warn!(
            path = %config.assets.confirm_bundle().display(),
            "Delete-confirmation bundle missing"
        );
    }

    // 3. Connect to the database.
    let db_config = DatabaseConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections);
    let db = Database::connect(&db_config)
        .await
        .context("connecting to database")?;
    db.run_migrations().await.context("running migrations")?;
    info!(url = %config.database.url, "Database ready");

    // 4. Shared state.
    let state = Arc::new(AppState::new(db, &config).context("building application state")?);

    // 5. Session reaper.
    let reaper = roster_web::spawn_session_reaper(
        Arc::clone(&state),
        Duration::from_secs(config.session.sweep_interval_secs.max(1)),
    );

    // 6. Serve.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let result = roster_web::start_server(&server_config, Arc::clone(&state)).await;

    reaper.abort();
    state.db.close().await;
    result.context("serving HTTP")?;
    info!("roster shutdown complete");
    Ok(())
}

/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
