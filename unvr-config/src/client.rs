use serde::{Deserialize, Serialize};

use crate::{UnvrError, UnvrResult};

const TOKEN_COOKIE: &str = "TOKEN";

/// Subset of `/proxy/protect/api/bootstrap` used for stream discovery.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub cameras: Vec<Camera>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camera {
    pub name: String,
    #[serde(default)]
    pub channels: Vec<CameraChannel>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraChannel {
    pub id: u32,
    #[serde(rename = "rtspAlias", default)]
    pub rtsp_alias: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

pub struct UnvrClient {
    base_url: String,
    http: reqwest::Client,
}

impl UnvrClient {
    /// `base_url` without trailing slash, e.g. `https://192.168.1.10`.
    pub fn new(base_url: &str) -> UnvrResult<Self> {
        // UNVR ships a self-signed certificate
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn for_host(unvr_ip: &str) -> UnvrResult<Self> {
        Self::new(&format!("https://{}", unvr_ip))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in and return the session token cookie.
    pub async fn login(&self, username: &str, password: &str) -> UnvrResult<String> {
        let url = format!("{}/api/auth/login", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            log::warn!("UNVR: login failed with {}", response.status());
            return Err(UnvrError::LoginFailed(response.status()));
        }

        let token = response
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or(UnvrError::MissingToken)?;
        log::info!("UNVR: logged in as {}", username);
        Ok(token)
    }

    pub async fn bootstrap(&self, token: &str) -> UnvrResult<Bootstrap> {
        let url = format!("{}/proxy/protect/api/bootstrap", self.base_url);
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::COOKIE, format!("{}={}", TOKEN_COOKIE, token))
            .send()
            .await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(UnvrError::RequestFailed {
                url,
                status: response.status(),
            });
        }

        let bootstrap: Bootstrap = response.json().await?;
        log::info!("UNVR: bootstrap lists {} cameras", bootstrap.cameras.len());
        Ok(bootstrap)
    }
}
