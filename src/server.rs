use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::database::Store;
use crate::error::ApiError;
use crate::handlers;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(handlers::register_user))
        .route("/api/save-collection", post(handlers::save_collection))
        .route("/api/collections", get(handlers::list_collections))
        .route("/api/collections/:id", put(handlers::update_collection))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Process-wide fatal fault flag.
///
/// Any panic trips it; the server then drains and the process exits non-zero.
#[derive(Clone)]
pub struct FatalFlag {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl FatalFlag {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    pub fn trip(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_tripped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Process exit status once the server has stopped: 1 after a fatal fault
    pub fn exit_code(&self) -> i32 {
        if self.is_tripped() {
            1
        } else {
            0
        }
    }

    /// Resolves once the flag is tripped
    pub async fn tripped(&self) {
        let mut rx = self.rx.clone();
        // Only errors if the sender is gone, and we hold it
        let _ = rx.wait_for(|fatal| *fatal).await;
    }

    /// Route every panic through the flag, keeping the default panic output.
    pub fn install_panic_hook(&self) {
        let flag = self.clone();
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            error!("Unrecoverable fault, shutting down: {}", panic_info);
            flag.trip();
            default_hook(panic_info);
        }));
    }
}

impl Default for FatalFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl-C, SIGTERM, or a tripped fatal flag
pub async fn shutdown_signal(fatal: FatalFlag) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
        _ = fatal.tripped() => error!("Fatal fault, shutting down"),
    }
}
