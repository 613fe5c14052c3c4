use std::path::{Path, PathBuf};

use unvr_config::{UnvrClient, UnvrSettings, build_config, page, rtsp_to_web};

pub const CONFIG_FILE: &str = "config.json";
pub const PAGE_FILE: &str = "Cameras.html";

/// Discover cameras on the UNVR and write the RTSPtoWeb config and viewer page.
/// Returns the MSE URL of every generated stream.
pub async fn generate(settings_path: PathBuf, out_dir: &Path) -> anyhow::Result<Vec<String>> {
    let settings = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        UnvrSettings::load_or_prompt(&settings_path, &mut input, &mut output)
    })
    .await??;

    let client = UnvrClient::for_host(&settings.unvr_ip)?;
    log::info!("Generate: logging in to {}", client.base_url());
    let token = client.login(&settings.username, &settings.password).await?;
    let bootstrap = client.bootstrap(&token).await?;
    log::info!("Generate: {} cameras reported", bootstrap.cameras.len());

    write_outputs(&build_config(&bootstrap, &settings.unvr_ip), &settings.rtspw_ip, out_dir).await
}

pub(crate) async fn write_outputs(
    config: &unvr_config::RtspToWebConfig,
    rtspw_ip: &str,
    out_dir: &Path,
) -> anyhow::Result<Vec<String>> {
    tokio::fs::create_dir_all(out_dir).await?;

    let config_path = out_dir.join(CONFIG_FILE);
    tokio::fs::write(&config_path, serde_json::to_string_pretty(config)?).await?;
    log::info!("Generate: wrote {}", config_path.display());

    let page_path = out_dir.join(PAGE_FILE);
    tokio::fs::write(&page_path, page::render(config, rtspw_ip)).await?;
    log::info!("Generate: wrote {}", page_path.display());

    let port = config.http_port();
    Ok(config
        .streams
        .keys()
        .map(|key| rtsp_to_web::mse_url(rtspw_ip, port, key))
        .collect())
}
