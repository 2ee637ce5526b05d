//! # album-mirror
//!
//! Keeps `<indexdir>/albums/<album title>/<filename>` in sync with the albums
//! of a Google Photos library. Every entry is a symbolic link into the local
//! image collection under `<imagedir>`; image data is never copied.
//!
//! ```text
//! album-mirror --indexdir /srv/photos/index --imagedir /srv/photos/originals
//! album-mirror --indexdir idx --imagedir img --dry-run --log-level debug
//! ```

mod cli;

use anyhow::Context;
use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
use bridge_traits::time::SystemClock;
use clap::Parser;
use core_auth::load_token_file;
use core_mirror::{MirrorCoordinator, MirrorReport};
use core_runtime::logging::init_logging;
use provider_google_photos::GooglePhotosConnector;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = init_logging(cli.logging_config()) {
        eprintln!("album-mirror: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(report) => {
            info!(
                planned = report.planned,
                applied = report.applied,
                failed = report.failed,
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            error!("{error:#}");
            eprintln!("album-mirror: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<MirrorReport> {
    let config = cli.mirror_config().context("Invalid configuration")?;

    let tokens = load_token_file(&config.token_path)
        .await
        .with_context(|| format!("Failed to load OAuth token from {}", config.token_path.display()))?;

    let http_client = Arc::new(ReqwestHttpClient::new().context("Failed to create HTTP client")?);
    let library = Arc::new(GooglePhotosConnector::new(
        http_client,
        tokens.bearer_token().to_string(),
    ));

    let coordinator = MirrorCoordinator::new(
        config,
        library,
        Arc::new(TokioFileSystem::new()),
        Arc::new(SystemClock),
    )?;

    coordinator.run().await.context("Album mirror run failed")
}
