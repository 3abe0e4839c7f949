use std::sync::Arc;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tank_monitor_service::{
    api::{self, AppState},
    config::Config,
    control::ControlService,
    db,
    ingest::IngestService,
    query::QueryService,
    store::{
        memory::{MemoryControlRegister, MemoryReadingStore},
        postgres::{PgControlRegister, PgReadingStore},
        ControlRegister, ReadingStore,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    // Pick the storage backend
    let (readings, register): (Arc<dyn ReadingStore>, Arc<dyn ControlRegister>) =
        match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url).await?;
                db::run_migrations(&pool).await?;
                info!("Database ready");
                (
                    Arc::new(PgReadingStore::new(pool.clone())),
                    Arc::new(PgControlRegister::new(pool)),
                )
            }
            None => {
                warn!("DATABASE_URL not set — using in-memory storage, readings are lost on restart");
                (
                    Arc::new(MemoryReadingStore::new()),
                    Arc::new(MemoryControlRegister::new()),
                )
            }
        };

    let state = AppState {
        ingest: IngestService::new(readings.clone()),
        query: QueryService::new(readings, config.history_limit, config.display_utc_offset),
        control: ControlService::new(register),
    };

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
