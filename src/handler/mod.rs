use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{config::NvrConfig, manager::RecordingManager};

pub mod recording;
pub mod system;

pub type ApiResult<T> = Result<T, ApiError>;
pub type ApiJsonResult<T> = ApiResult<Json<T>>;

pub struct AppState {
    pub config: NvrConfig,
    pub manager: RecordingManager,
}

pub type SharedState = Arc<AppState>;

pub struct ApiError(StatusCode, anyhow::Error);

impl ApiError {
    pub fn bad_request(err: impl Into<anyhow::Error>) -> Self {
        Self(StatusCode::BAD_REQUEST, err.into())
    }

    pub fn not_found(what: &str) -> Self {
        Self(StatusCode::NOT_FOUND, anyhow::anyhow!("{} not found", what))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_server_error() {
            log::error!("ApiError: {:?}", self.1);
            return (
                self.0,
                "Manager went wrong because service inner error".to_string(),
            )
                .into_response();
        }
        log::warn!("ApiError: {:#}", self.1);
        (self.0, format!("{:#}", self.1)).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, err.into())
    }
}
