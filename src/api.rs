//! HTTP API endpoints.
//!
//! Read-only views of the game plus state export/import for the host.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::state::export::GameStateExport;
use crate::state::AppState;

/// Routes mounted under `/api`
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/game", get(get_game))
        .route("/sets", get(list_sets))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
}

/// Current game snapshot.
///
/// GET /api/game
pub async fn get_game(State(state): State<Arc<AppState>>) -> Response {
    match state.get_snapshot().await {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::NOT_FOUND, "No game is running").into_response(),
    }
}

/// Stored sets and drafts.
///
/// GET /api/sets
pub async fn list_sets(State(state): State<Arc<AppState>>) -> Response {
    match state.list_sets().await {
        Ok(sets) => Json(sets).into_response(),
        Err(e) => {
            tracing::error!("Listing sets failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Export the entire game state as JSON.
///
/// GET /api/state/export
pub async fn export_state(State(state): State<Arc<AppState>>) -> Json<GameStateExport> {
    Json(state.export_state().await)
}

/// Import a game state snapshot.
///
/// POST /api/state/import
///
/// Replaces session, roster and builder with the imported data.
/// Broadcasts the restored state to all connected clients.
pub async fn import_state(
    State(state): State<Arc<AppState>>,
    Json(export): Json<GameStateExport>,
) -> Response {
    match state.import_state(export).await {
        Ok(()) => (StatusCode::OK, "State imported successfully").into_response(),
        Err(e) => {
            tracing::error!("State import failed: {}", e);
            (StatusCode::BAD_REQUEST, format!("Import failed: {}", e)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::set::tests::sample_document;
    use crate::store::MemoryStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    async fn app() -> (Router, Arc<AppState>) {
        let store = Arc::new(MemoryStore::with_sets([sample_document()]).await);
        let state = Arc::new(AppState::new(store));
        (routes().with_state(state.clone()), state)
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_game_and_sets() {
        let (app, state) = app().await;

        let response = app
            .clone()
            .oneshot(Request::get("/game").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        state.load_set("set-1").await.unwrap();
        let response = app
            .clone()
            .oneshot(Request::get("/game").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("\"title\":\"Pub Night\""));

        let response = app
            .oneshot(Request::get("/sets").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("set-1"));
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let (router, state) = app().await;
        state
            .add_team("Owls".to_string(), vec![], "blue".to_string())
            .await
            .unwrap();
        state.load_set("set-1").await.unwrap();

        let response = router
            .oneshot(Request::get("/state/export").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let exported = body_string(response).await;

        let (fresh_app, fresh_state) = app().await;
        let response = fresh_app
            .clone()
            .oneshot(
                Request::post("/state/import")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(exported))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            fresh_state.get_snapshot().await.map(|s| s.game_id),
            state.get_snapshot().await.map(|s| s.game_id)
        );

        let response = fresh_app
            .oneshot(
                Request::post("/state/import")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"schema_version":99,"exported_at":"now","session":null}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
