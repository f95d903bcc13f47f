//! REST handlers for the leaderboard and the interrupt test hook.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lasermaze_board::{BoardError, Entry};
use lasermaze_protocol::InterruptEvent;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewEntry {
    name: String,
    time_ms: f64,
}

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryPatch {
    name: Option<String>,
    time_ms: Option<f64>,
}

/// `GET /api/leaderboard`: the ranked listing, best time first, top
/// 100.
pub(crate) async fn list_entries(State(state): State<AppState>) -> Json<Vec<Entry>> {
    Json(state.board.list().await)
}

/// `POST /api/leaderboard`
pub(crate) async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<NewEntry>,
) -> Result<(StatusCode, Json<Entry>), ApiError> {
    let entry = state.board.insert(&body.name, body.time_ms).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `PUT /api/leaderboard/{id}`
pub(crate) async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<EntryPatch>,
) -> Result<Json<Entry>, ApiError> {
    let entry = state
        .board
        .update(&id, body.name.as_deref(), body.time_ms)
        .await?;
    Ok(Json(entry))
}

/// `DELETE /api/leaderboard/{id}`, returns the removed entry.
pub(crate) async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Entry>, ApiError> {
    let removed = state.board.remove(&id).await?;
    Ok(Json(removed))
}

/// `POST /api/test-interrupt`: publishes a simulated sensor interrupt
/// to every connected session, exactly as a tripped beam would.
pub(crate) async fn test_interrupt(State(state): State<AppState>) -> Json<serde_json::Value> {
    let delivered = state.hub.publish(InterruptEvent::now(Some("test")));
    info!(delivered, "test interrupt published");
    Json(json!({ "ok": true }))
}

/// Maps store errors onto HTTP responses with a JSON error body.
pub(crate) struct ApiError(BoardError);

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BoardError::InvalidName | BoardError::InvalidTime => StatusCode::BAD_REQUEST,
            BoardError::NotFound(_) => StatusCode::NOT_FOUND,
            BoardError::Storage(_) | BoardError::Encode(_) => {
                tracing::error!(error = %self.0, "leaderboard operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
