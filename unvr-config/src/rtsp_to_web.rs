use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::client::Bootstrap;

/// Port of the UNVR secure RTSP service.
pub const RTSPS_PORT: u16 = 7441;

/// Channel id of the low resolution stream re-published to RTSPtoWeb.
pub const STREAM_CHANNEL_ID: u32 = 2;

/// `config.json` consumed by the RTSPtoWeb server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtspToWebConfig {
    pub channel_defaults: serde_json::Map<String, serde_json::Value>,
    pub server: ServerConfig,
    /// Keyed by camera name without spaces, in bootstrap order.
    pub streams: IndexMap<String, StreamConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub debug: bool,
    pub http_debug: bool,
    pub http_demo: bool,
    pub http_dir: String,
    pub http_login: String,
    pub http_password: String,
    pub http_port: String,
    pub https: bool,
    pub https_auto_tls: bool,
    pub https_auto_tls_name: String,
    pub https_cert: String,
    pub https_key: String,
    pub https_port: String,
    pub ice_credential: String,
    pub ice_servers: Vec<String>,
    pub ice_username: String,
    pub log_level: String,
    pub rtsp_port: String,
    pub token: TokenConfig,
    pub webrtc_port_max: u16,
    pub webrtc_port_min: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub backend: String,
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub channels: BTreeMap<String, ChannelConfig>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub on_demand: bool,
    pub insecure_skip_verify: bool,
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debug: true,
            http_debug: false,
            http_demo: true,
            http_dir: "web".to_string(),
            http_login: "demo".to_string(),
            http_password: "demo".to_string(),
            http_port: ":8083".to_string(),
            https: false,
            https_auto_tls: false,
            https_auto_tls_name: String::new(),
            https_cert: "server.crt".to_string(),
            https_key: "server.key".to_string(),
            https_port: ":443".to_string(),
            ice_credential: String::new(),
            ice_servers: vec!["stun:stun.l.google.com:19302".to_string()],
            ice_username: String::new(),
            log_level: "debug".to_string(),
            rtsp_port: ":5541".to_string(),
            token: TokenConfig {
                backend: "http://127.0.0.1/test.php".to_string(),
                enable: false,
            },
            webrtc_port_max: 0,
            webrtc_port_min: 0,
        }
    }
}

impl RtspToWebConfig {
    /// RTSPtoWeb HTTP port parsed from `server.http_port` (`":8083"`).
    pub fn http_port(&self) -> u16 {
        self.server
            .http_port
            .trim_start_matches(':')
            .parse()
            .unwrap_or(8083)
    }
}

/// `Front Door` -> `FrontDoor`
pub fn stream_key(camera_name: &str) -> String {
    camera_name.replace(' ', "")
}

/// Build the RTSPtoWeb config with one on-demand stream per camera.
///
/// Cameras without an RTSP alias on channel 2 are skipped.
pub fn build_config(bootstrap: &Bootstrap, unvr_ip: &str) -> RtspToWebConfig {
    let mut streams = IndexMap::new();
    for camera in &bootstrap.cameras {
        let alias = camera
            .channels
            .iter()
            .find(|c| c.id == STREAM_CHANNEL_ID)
            .and_then(|c| c.rtsp_alias.as_deref())
            .filter(|alias| !alias.is_empty());

        let Some(alias) = alias else {
            log::warn!(
                "RTSPtoWeb: camera {:?} has no RTSP alias on channel {}, skipped",
                camera.name,
                STREAM_CHANNEL_ID
            );
            continue;
        };

        let channel = ChannelConfig {
            on_demand: true,
            insecure_skip_verify: true,
            url: format!("rtsps://{}:{}/{}", unvr_ip, RTSPS_PORT, alias),
        };
        streams.insert(
            stream_key(&camera.name),
            StreamConfig {
                channels: BTreeMap::from([("0".to_string(), channel)]),
                name: camera.name.clone(),
            },
        );
    }

    RtspToWebConfig {
        channel_defaults: serde_json::Map::new(),
        server: ServerConfig::default(),
        streams,
    }
}

/// MSE WebSocket endpoint of one stream on the RTSPtoWeb server.
pub fn mse_url(rtspw_ip: &str, http_port: u16, key: &str) -> String {
    format!(
        "ws://{}:{}/stream/{}/channel/0/mse?uuid=demo&channel=0",
        rtspw_ip, http_port, key
    )
}
