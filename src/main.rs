use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivio::{
    api, auth, broadcast,
    config::ServerConfig,
    state::AppState,
    store::{JsonFileStore, MemoryStore, SetStore},
    ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trivio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trivio...");

    let config = ServerConfig::from_env();
    let auth_config = Arc::new(auth::AuthConfig::from_env());

    let store: Arc<dyn SetStore> = match &config.data_dir {
        Some(dir) => match JsonFileStore::open(dir).await {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::error!("Cannot open data directory {}: {}", dir.display(), e);
                return;
            }
        },
        None => Arc::new(MemoryStore::new()),
    };

    let state = Arc::new(AppState::new(store));
    match state.restore_snapshot().await {
        Ok(true) => tracing::info!("Resuming the previous game"),
        Ok(false) => {}
        Err(e) => tracing::warn!("Could not restore last game: {}", e),
    }

    // Push set list updates to clients when sets are saved
    broadcast::spawn_store_watcher(state.clone());

    // Export/import and set listings are host business
    let api_routes = Router::new()
        .nest("/api", api::routes())
        .layer(middleware::from_fn_with_state(
            auth_config.clone(),
            auth::host_auth_middleware,
        ));

    // Board connections are open; role=host needs credentials
    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            auth_config.clone(),
            auth::host_ws_auth_middleware,
        ));

    let app = Router::new()
        .merge(ws_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
