//! LedgerLens report server.
//!
//! Serves the BI reports over HTTP against an ERP database.

use std::{sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerlens_api::{AppState, create_router};
use ledgerlens_db::connect;
use ledgerlens_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerlens=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    info!(
        chart_limit = config.reports.chart_limit,
        monthwise_window_days = config.reports.monthwise_window_days,
        "Report settings loaded"
    );

    let state = AppState {
        db: Arc::new(db),
        settings: Arc::new(config.reports.clone()),
    };

    let app = create_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
