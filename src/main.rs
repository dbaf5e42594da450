use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use collection_api::config;
use collection_api::database::{spawn_keepalive, DatabaseManager, PgStore, Store};
use collection_api::middleware::cors_layer;
use collection_api::server::{app, shutdown_signal, AppState, FatalFlag};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_HOST, DB_NAME, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("collection_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    info!("Starting collection API in {:?} mode", config.environment);

    let fatal = FatalFlag::new();
    fatal.install_panic_hook();

    // Never start half-ready: the store must answer before we bind
    let manager = DatabaseManager::connect_lazy(&config.database);
    if let Err(e) = manager.probe().await {
        error!("Database unreachable at startup: {}", e);
        std::process::exit(1);
    }
    info!("Database connection verified");

    let store: Arc<dyn Store> = Arc::new(PgStore::new(&manager));
    let keepalive = spawn_keepalive(store.clone(), config.database.keepalive_interval());

    let cors = cors_layer(config).context("invalid CORS_DEV_ORIGIN")?;
    let app = app(AppState::new(store), cors);

    let bind_addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Collection API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(fatal.clone()))
        .await
        .context("server error")?;

    keepalive.abort();
    manager.close().await;

    let code = fatal.exit_code();
    if code != 0 {
        error!("Exiting after fatal fault");
        std::process::exit(code);
    }

    info!("Shutdown complete");
    Ok(())
}
