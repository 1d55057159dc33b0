mod error;
mod files;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    config::Config,
    media::{MediaService, YtDlpExtractor},
};

#[derive(Clone)]
pub struct AppState {
    pub media: Arc<MediaService>,
}

/// Builds the HTTP surface. `/files` is a plain static mount over the
/// download directory, `/file/{filename}` goes through the JSON error path.
pub fn router(state: AppState, cors: bool) -> Router {
    let static_files = ServeDir::new(state.media.download_dir());

    let mut router = Router::new()
        .route("/", get(routes::root))
        .route("/formats", get(routes::formats))
        .route("/download", get(routes::download))
        .route("/file/{filename}", get(files::get_file))
        .nest_service("/files", static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

pub async fn run(config: &Config) -> Result<()> {
    let download_dir = &config.downloads.dir;
    tokio::fs::create_dir_all(download_dir)
        .await
        .with_context(|| format!("Failed to create download directory {}", download_dir.display()))?;

    let extractor = YtDlpExtractor::new(&config.extractor.binary, config.extractor.timeout());
    let media = MediaService::new(Arc::new(extractor), download_dir.clone());

    if let Err(e) = media.test_setup().await {
        warn!("Media extractor test failed: {}", e);
    }

    let app = router(
        AppState {
            media: Arc::new(media),
        },
        config.server.cors,
    );

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to run API server")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
