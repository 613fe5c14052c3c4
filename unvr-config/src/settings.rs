use std::{
    io::{BufRead, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::UnvrResult;

pub const DEFAULT_SETTINGS_FILE: &str = "streamsconfig.json";

/// Credentials and addresses kept in `streamsconfig.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnvrSettings {
    pub username: String,
    pub password: String,
    #[serde(rename = "UNVR_IP")]
    pub unvr_ip: String,
    /// Host running the RTSPtoWeb server.
    #[serde(rename = "RTSPW_IP")]
    pub rtspw_ip: String,
}

impl UnvrSettings {
    pub fn load(path: impl AsRef<Path>) -> UnvrResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> UnvrResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load the settings file, or ask for each value and create it.
    pub fn load_or_prompt(
        path: impl AsRef<Path>,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> UnvrResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let settings = Self {
            username: prompt(input, output, "Enter UNVR username: ")?,
            password: prompt(input, output, "Enter UNVR password: ")?,
            unvr_ip: prompt(input, output, "Enter UNVR IP: ")?,
            rtspw_ip: prompt(input, output, "Enter RTSPtoWeb Server IP: ")?,
        };
        settings.save(path)?;
        log::info!("Settings: saved {}", path.display());
        Ok(settings)
    }
}

fn prompt(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> UnvrResult<String> {
    output.write_all(label.as_bytes())?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("no input for {:?}", label.trim_end()),
        )
        .into());
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
