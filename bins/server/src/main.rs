//! Treasury API Server
//!
//! Main entry point for the daily bank-closing service.

use anyhow::Context;
use chrono_tz::Tz;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use treasury_api::{AppState, create_router};
use treasury_core::closing::ClosingPolicy;
use treasury_db::{Migrator, connect};
use treasury_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "treasury=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let timezone: Tz = config.closing.timezone.parse().map_err(|e| {
        anyhow::anyhow!("Invalid closing time zone {}: {e}", config.closing.timezone)
    })?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    if config.database.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Migrations applied");
    }

    let policy = ClosingPolicy::from(&config.closing);
    info!(
        max_backdays = policy.max_backdays,
        stop_on_error = policy.stop_on_error,
        timezone = %timezone,
        "Closing policy configured"
    );

    let state = AppState::new(db, policy, timezone);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
