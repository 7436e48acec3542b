//! Web front end: list, upload, download and delete files in a single
//! root container through whichever [`FileProvider`] is configured.

mod error;
mod handlers;
mod page;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use fileproviders_core::FileProvider;
use tower_http::trace::TraceLayer;

pub use error::WebError;

/// Root container every request operates on.
pub const ROOT_CONTAINER: &str = "Images";

/// Request body limit used by [`router`]; large enough for ordinary photos.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 30 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn FileProvider>,
}

pub fn router(provider: Arc<dyn FileProvider>) -> Router {
    router_with_limit(provider, DEFAULT_MAX_UPLOAD_BYTES)
}

/// Like [`router`], with uploads capped at `max_upload_bytes`.
pub fn router_with_limit(provider: Arc<dyn FileProvider>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", post(handlers::upload))
        .route("/download", post(handlers::download))
        .route("/delete", post(handlers::delete))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { provider })
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(
    addr: &str,
    provider: Arc<dyn FileProvider>,
    max_upload_bytes: usize,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, max_upload_bytes, "Starting web front end");
    axum::serve(listener, router_with_limit(provider, max_upload_bytes)).await
}
