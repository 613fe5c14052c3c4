//! UniFi Protect NVR (UNVR) camera discovery and RTSPtoWeb config generation.

pub mod client;
pub mod page;
pub mod rtsp_to_web;
pub mod settings;

pub use client::{Bootstrap, Camera, UnvrClient};
pub use rtsp_to_web::{RtspToWebConfig, build_config};
pub use settings::UnvrSettings;

pub type UnvrResult<T> = Result<T, UnvrError>;

#[derive(Debug, thiserror::Error)]
pub enum UnvrError {
    #[error("login failed with status {0}")]
    LoginFailed(reqwest::StatusCode),

    #[error("login response carried no TOKEN cookie")]
    MissingToken,

    #[error("request to {url} failed with status {status}")]
    RequestFailed {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
