// HTTP layer - routing, shared state and startup
//
// Plumbing only: everything of substance lives in the downloader module.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::downloader::{CompletedDownload, DownloadExecutor, ExtractionTool, YtDlp};

/// Registry of finished downloads, kept only in memory
pub type DownloadRegistry = Arc<Mutex<HashMap<Uuid, CompletedDownload>>>;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<DownloadExecutor>,
    pub downloads: DownloadRegistry,
}

impl AppState {
    pub fn new(executor: Arc<DownloadExecutor>) -> Self {
        Self {
            executor,
            downloads: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/download", post(handlers::download))
        .route("/api/downloads/{id}", get(handlers::download_info))
        .route("/api/downloads/{id}/file", get(handlers::download_file))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build state from config and serve until the listener dies
pub async fn run(config: Config) -> Result<(), String> {
    let tool = Arc::new(YtDlp::locate(config.ytdlp_path.clone()));
    if tool.is_available().await {
        let version = tool.version().await;
        info!(
            path = tool.path(),
            version = version.as_deref().unwrap_or("unknown"),
            "yt-dlp found"
        );
    } else {
        tracing::warn!(
            path = tool.path(),
            "yt-dlp not found; downloads will fail until it is installed"
        );
    }

    let executor = Arc::new(DownloadExecutor::new(
        tool,
        config.download_dir.clone(),
        config.network.clone(),
        config.attempt_timeout_secs,
    ));

    let app = build_router(AppState::new(executor));

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| format!("cannot bind {}: {}", config.bind, e))?;

    info!(addr = %config.bind, "mediafetch listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {}", e))
}
