use std::{net::SocketAddr, path::PathBuf, time::Duration};

use clap::Args;
use mse_feed::{DescriptorPolicy, SessionOptions, driver::DriverOptions};

use crate::media::types::BackoffConfig;

/// Options shared by `serve` and `record`.
#[derive(Args, Clone, Debug)]
pub struct FeedArgs {
    /// Directory recordings are written to.
    #[arg(long, env = "MSE_NVR_OUTPUT_DIR", default_value = "recordings")]
    pub output_dir: PathBuf,

    /// Seconds the sink may stay busy before the session is dropped; 0 disables.
    #[arg(long, default_value_t = 10)]
    pub stall_timeout: u64,

    /// Handling of a codec descriptor repeated mid-session: ignore, reinitialize or reject.
    #[arg(long, default_value = "ignore")]
    pub descriptor_policy: DescriptorPolicy,

    /// Upper bound of the reconnect backoff in seconds.
    #[arg(long, default_value_t = 30)]
    pub max_backoff: u64,
}

pub struct NvrConfig {
    listen: SocketAddr,
    output_dir: PathBuf,
    session: SessionOptions,
    driver: DriverOptions,
    backoff: BackoffConfig,
}

impl NvrConfig {
    pub fn new(listen: SocketAddr, feed: &FeedArgs) -> Self {
        let stall_timeout = match feed.stall_timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self {
            listen,
            output_dir: feed.output_dir.clone(),
            session: SessionOptions {
                descriptor_policy: feed.descriptor_policy,
                ..Default::default()
            },
            driver: DriverOptions { stall_timeout },
            backoff: BackoffConfig {
                max: Duration::from_secs(feed.max_backoff.max(1)),
                ..Default::default()
            },
        }
    }

    pub fn listen(&self) -> SocketAddr {
        self.listen
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn session(&self) -> SessionOptions {
        self.session
    }

    pub fn driver(&self) -> DriverOptions {
        self.driver
    }

    pub fn backoff(&self) -> BackoffConfig {
        self.backoff
    }
}
