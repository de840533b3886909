//! Server binary.
//!
//! Loads configuration from the path given as the first argument
//! (`gymdesk.toml` by default), applies `GYMDESK_*` environment overrides,
//! and serves until interrupted.

use std::process::ExitCode;

use gymdesk::config::GymdeskConfig;
use gymdesk_server::observability::{LogFormat, init_observability};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    let path = std::env::args().nth(1).unwrap_or_else(|| "gymdesk.toml".to_owned());
    let config = match GymdeskConfig::load(&path) {
        Ok(config) => config,
        Err(err) => {
            error!(config_path = %path, "failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = gymdesk_server::serve(config).await {
        error!("server exited with error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
