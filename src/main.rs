use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::{
    config::{FeedArgs, NvrConfig},
    handler::AppState,
    manager::RecordingManager,
    media::{recording::Recording, types::RecordingConfig},
};

mod api;
mod config;
mod generate;
mod handler;
mod manager;
mod media;

#[derive(Parser)]
#[command(name = "mse-nvr", version, about = "Record and serve RTSPtoWeb MSE camera feeds")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the recording API server
    Serve {
        #[arg(long, env = "MSE_NVR_LISTEN", default_value = "0.0.0.0:8080")]
        listen: SocketAddr,
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Record a single feed in the foreground until Ctrl-C
    Record {
        #[arg(long)]
        id: String,
        /// MSE WebSocket endpoint
        #[arg(long)]
        url: String,
        #[command(flatten)]
        feed: FeedArgs,
    },
    /// Generate RTSPtoWeb config.json and Cameras.html from a UNVR
    Generate {
        #[arg(long, default_value = unvr_config::settings::DEFAULT_SETTINGS_FILE)]
        settings: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .filter_module("mse_feed", log::LevelFilter::Debug)
        .filter_module("unvr_config", log::LevelFilter::Debug)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { listen, feed } => serve(NvrConfig::new(listen, &feed)).await,
        Command::Record { id, url, feed } => {
            let config = NvrConfig::new(SocketAddr::from(([0, 0, 0, 0], 0)), &feed);
            record(id, url, config).await
        }
        Command::Generate { settings, out_dir } => {
            let urls = generate::generate(settings, &out_dir).await?;
            for url in urls {
                println!("{}", url);
            }
            Ok(())
        }
    }
}

async fn serve(config: NvrConfig) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let state = Arc::new(AppState {
        config,
        manager: RecordingManager::new(),
    });

    let server = api::start_api_server(Arc::clone(&state), cancel.clone()).await?;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                break;
            },
            _ = tokio::signal::ctrl_c() => {
                log::info!("Received Ctrl-C, shutting down");
                cancel.cancel();
            },
        }
    }

    state.manager.cancel_all().await;
    server.await?;
    Ok(())
}

async fn record(id: String, url: String, config: NvrConfig) -> anyhow::Result<()> {
    let recording_config = RecordingConfig::builder()
        .id(id)
        .url(url)
        .output_dir(config.output_dir())
        .session(config.session())
        .driver(config.driver())
        .backoff(config.backoff())
        .build()?;

    let recording = Arc::new(Recording::new(recording_config));
    let handle = tokio::spawn({
        let recording = Arc::clone(&recording);
        async move { recording.start().await }
    });

    tokio::signal::ctrl_c().await?;
    log::info!("Received Ctrl-C, stopping recording");
    recording.cancel();
    handle.await?;

    let status = recording.status();
    log::info!(
        "Recording: {} wrote {} bytes in {} sessions",
        status.id,
        status.bytes_written,
        status.sessions
    );
    Ok(())
}
