//! HTTP server wiring: shared state, routes and the serve loop.

use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post};
use delish_core::repository::StoreRepository;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::WebError;
use crate::flash::{FlashKey, FlashMessage};
use crate::handlers;
use crate::photo::PhotoProcessor;
use crate::views::Page;

/// Shared application state.
pub struct AppState<R> {
    /// Store persistence, injected by the caller.
    pub stores: R,
    pub photos: PhotoProcessor,
    pub flash_key: FlashKey,
    pub config: ServerConfig,
}

impl<R> AppState<R> {
    /// Fails when the configured cookie secret is too short to sign with.
    pub fn new(stores: R, config: ServerConfig) -> Result<Self, WebError> {
        let photos = PhotoProcessor::new(
            config.uploads_dir.clone(),
            config.photo_width,
            config.photo_max_dimension,
        );
        let flash_key = FlashKey::from_secret(config.cookie_secret.as_deref())?;
        Ok(Self {
            stores,
            photos,
            flash_key,
            config,
        })
    }

    /// Page chrome for a rendered view.
    pub fn page<'a>(&'a self, title: &'a str, flashes: &'a [FlashMessage]) -> Page<'a> {
        Page {
            title,
            flashes,
            maps_api_key: self.config.maps_api_key.as_deref(),
        }
    }
}

impl<R> FromRef<Arc<AppState<R>>> for FlashKey {
    fn from_ref(state: &Arc<AppState<R>>) -> Self {
        state.flash_key.clone()
    }
}

/// Build the application router.
pub fn router<R: StoreRepository + 'static>(state: Arc<AppState<R>>) -> Router {
    let uploads = ServeDir::new(state.photos.uploads_dir());
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::home_page::<R>))
        .route(
            "/add",
            get(handlers::add_store::<R>).post(handlers::create_store::<R>),
        )
        .route("/add/{id}", post(handlers::update_store::<R>))
        .route("/stores", get(handlers::get_stores::<R>))
        .route("/store/{id}/edit", get(handlers::edit_store::<R>))
        .route("/store/{slug}", get(handlers::get_store_by_slug::<R>))
        .route("/tags", get(handlers::get_tags::<R>))
        .route("/tags/{tag}", get(handlers::get_store_by_tag::<R>))
        .route("/javascripts/autocomplete.js", get(handlers::autocomplete_js))
        .nest_service("/uploads", uploads)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The HTTP server.
pub struct Server<R> {
    state: Arc<AppState<R>>,
}

impl<R: StoreRepository + 'static> Server<R> {
    pub fn new(stores: R, config: ServerConfig) -> Result<Self, WebError> {
        Ok(Self {
            state: Arc::new(AppState::new(stores, config)?),
        })
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind the configured address and serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.state.config.addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr = %addr, "Starting Delish server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Delish server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
