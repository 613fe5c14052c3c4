use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    handler::{ApiError, ApiJsonResult, SharedState},
    media::types::{RecordingConfig, RecordingStatus},
};

pub fn recording_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/list", get(list_recordings))
        .route("/add", post(add_recording))
        .route("/remove/{id}", get(remove_recording))
        .route("/status/{id}", get(get_recording_status))
}

#[derive(Serialize, Deserialize)]
struct RecordingRequest {
    id: String,
    /// MSE WebSocket endpoint, e.g. ws://host:8083/stream/<key>/channel/0/mse?uuid=demo&channel=0
    url: String,
    #[serde(default)]
    replace: bool,
}

async fn index() -> &'static str {
    "recording route!"
}

async fn list_recordings(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(state.manager.ids().await)
}

async fn add_recording(
    State(state): State<SharedState>,
    Json(req): Json<RecordingRequest>,
) -> ApiJsonResult<String> {
    let config = RecordingConfig::builder()
        .id(req.id)
        .url(req.url)
        .output_dir(state.config.output_dir())
        .session(state.config.session())
        .driver(state.config.driver())
        .backoff(state.config.backoff())
        .build()
        .map_err(ApiError::bad_request)?;

    state
        .manager
        .add(config, req.replace)
        .await
        .map_err(ApiError::bad_request)?;
    Ok(Json("success".to_string()))
}

async fn remove_recording(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiJsonResult<String> {
    if !state.manager.remove(&id).await {
        return Err(ApiError::not_found("recording"));
    }
    Ok(Json("success".to_string()))
}

async fn get_recording_status(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiJsonResult<RecordingStatus> {
    let recording = state
        .manager
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("recording"))?;
    Ok(Json(recording.status()))
}
