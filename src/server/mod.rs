//! HTTP API over a [`SessionStore`].
//!
//! Routes mirror the frontend's expectations: names travel as query parameters, bodies are
//! JSON except for avatar uploads, which are raw bytes.

mod error;
mod handlers;
pub mod sniff;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::SessionResult;
use crate::store::SessionStore;

pub use error::ApiError;

/// Upload ceiling used when nothing else is configured.
pub const DEFAULT_MAX_AVATAR_BYTES: usize = 10 << 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Largest request body accepted, which bounds avatar uploads.
    pub max_avatar_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_avatar_bytes: DEFAULT_MAX_AVATAR_BYTES,
        }
    }
}

/// Shared handler state: the store built at startup plus server settings.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn SessionStore>,
    config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn SessionStore>, config: ServerConfig) -> Self {
        Self { store, config }
    }

    /// Runs a store call on the blocking pool; store operations do synchronous file I/O.
    pub(crate) async fn run<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SessionStore) -> SessionResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || call(store.as_ref()))
            .await
            .map_err(|err| ApiError::Internal(format!("store task failed: {err}")))?
            .map_err(ApiError::from)
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_avatar_bytes;
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/api/sessions/list", get(handlers::list_sessions))
        .route("/api/sessions/get", get(handlers::get_session))
        .route("/api/sessions/create", post(handlers::create_session))
        .route(
            "/api/sessions/update",
            post(handlers::update_session).put(handlers::update_session),
        )
        .route(
            "/api/sessions/delete",
            post(handlers::delete_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/rename", post(handlers::rename_session))
        .route("/api/sessions/page/create", post(handlers::create_page))
        .route(
            "/api/sessions/page/update",
            post(handlers::update_page).put(handlers::update_page),
        )
        .route(
            "/api/sessions/page/delete",
            post(handlers::delete_page).delete(handlers::delete_page),
        )
        .route("/api/sessions/avatar/list", get(handlers::list_avatars))
        .route("/api/sessions/avatar/upload", post(handlers::upload_avatar))
        .route(
            "/api/sessions/avatar/delete",
            post(handlers::delete_avatar).delete(handlers::delete_avatar),
        )
        .route("/api/sessions/avatar/rename", post(handlers::rename_avatar))
        .route("/api/sessions/avatar/get", get(handlers::get_avatar))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
}
