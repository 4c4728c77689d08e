use crate::config::Config;
use crate::favorites::FavoritesStore;
use crate::notify::Notifier;
use crate::omdb::{MovieSummary, OmdbApi, OmdbClient};
use crate::session::{Controller, Session, SessionView};
use anyhow::Result;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

pub async fn run_server(config: Config) -> Result<()> {
    let omdb: Arc<dyn OmdbApi> = Arc::new(OmdbClient::from_config(&config)?);
    let favorites = FavoritesStore::load(&config.favorites_path);
    info!(
        "Loaded {} favorites from {:?}",
        favorites.len(),
        favorites.path()
    );
    let controller = Controller::new(omdb, Session::new(favorites, Notifier::default()));

    let app = build_router(controller);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(controller: Controller) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/state", get(state))
        .route("/search", post(search))
        .route("/select/:imdb_id", post(select))
        .route("/detail", delete(close_detail))
        .route("/favorites", get(favorites))
        .route("/favorites/toggle", post(toggle_favorite))
        .route("/notification", delete(dismiss_notification))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(controller)
}

async fn health() -> &'static str {
    "OK"
}

async fn state(State(controller): State<Controller>) -> Json<SessionView> {
    Json(controller.view().await)
}

async fn search(
    State(controller): State<Controller>,
    Json(req): Json<SearchRequest>,
) -> Json<SessionView> {
    controller.search(&req.query).await;
    Json(controller.view().await)
}

async fn select(
    State(controller): State<Controller>,
    Path(imdb_id): Path<String>,
) -> Json<SessionView> {
    controller.select(&imdb_id).await;
    Json(controller.view().await)
}

async fn close_detail(State(controller): State<Controller>) -> Json<SessionView> {
    controller.close_detail().await;
    Json(controller.view().await)
}

async fn favorites(State(controller): State<Controller>) -> Json<Vec<MovieSummary>> {
    Json(controller.favorites().await)
}

async fn toggle_favorite(
    State(controller): State<Controller>,
    Json(summary): Json<MovieSummary>,
) -> Json<SessionView> {
    controller.toggle_favorite(&summary).await;
    Json(controller.view().await)
}

async fn dismiss_notification(State(controller): State<Controller>) -> Json<SessionView> {
    controller.dismiss_notification().await;
    Json(controller.view().await)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        term.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
