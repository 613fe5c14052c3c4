use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::handler::SharedState;

pub fn system_router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/info", get(info))
}

#[derive(Serialize)]
struct SystemInfo {
    version: &'static str,
    output_dir: String,
    stall_timeout_secs: Option<u64>,
    recordings: usize,
}

async fn index() -> &'static str {
    "system route!"
}

async fn info(State(state): State<SharedState>) -> Json<SystemInfo> {
    Json(SystemInfo {
        version: env!("CARGO_PKG_VERSION"),
        output_dir: state.config.output_dir().display().to_string(),
        stall_timeout_secs: state.config.driver().stall_timeout.map(|d| d.as_secs()),
        recordings: state.manager.ids().await.len(),
    })
}
