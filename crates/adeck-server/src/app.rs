//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;

use crate::state::AppState;
use crate::websocket;

pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(deck))
        .route("/ws", get(websocket::ws_handler))
        .with_state(state)
}

/// The latest built deck.
async fn deck(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read_to_string(&state.output_path).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::warn!(path = %state.output_path.display(), error = %e, "Cannot serve deck");
            (StatusCode::NOT_FOUND, "deck not built yet").into_response()
        }
    }
}
