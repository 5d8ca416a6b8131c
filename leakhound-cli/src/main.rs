//! leakhound command-line entry point.

mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{Cli, API_KEY_ENV};
use leakhound_core::{AppConfig, Target};
use leakhound_intelx::{IntelxClient, SearchWindow};
use leakhound_scanner::{ScanConfig, ScanPipeline};
use leakhound_sink::open_sink;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Initialize tracing subscriber for logging
fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if debug { "info,leakhound=debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(debug))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    ExitCode::from(exit_status(run(cli).await))
}

/// Process exit status for a finished run. Every error is fatal here, since
/// per-document and per-query failures never reach this point.
fn exit_status(result: anyhow::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("Ignoring unreadable .env file: {}", e);
        }
    }

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    }
    .with_env_overrides();
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let Some(api_key) = cli.api_key(std::env::var(API_KEY_ENV).ok()) else {
        bail!(
            "API key is required. Provide it with -k or set {} in the environment or a .env file",
            API_KEY_ENV
        );
    };

    let target = Target::new(cli.target.as_str())?;

    let today = chrono::Local::now().date_naive();
    let window = SearchWindow::lookback(today, config.scanning.range_months);
    info!("Searching from {} to {}", window.from_timestamp(), window.to_timestamp());
    if config.scanning.email_search {
        info!(
            "Email search enabled: also searching for '{}'",
            target.email_variant()
        );
    }

    let client = IntelxClient::from_config(api_key.as_str(), &config.intelx)
        .context("failed to create Intelligence X client")?;
    debug!("IntelX API initialized for target: {}", target);

    let output = cli.output_path(&config.output.directory, &target);
    let sink = open_sink(cli.format, &output);
    let pipeline = ScanPipeline::new(
        ScanConfig::from_app_config(target, &config, window),
        Arc::new(client),
        sink,
    );

    let report = pipeline
        .run()
        .await
        .context("error during credential search")?;

    let failed = report.failed_documents().count();
    if failed > 0 {
        warn!(
            "{} of {} documents could not be processed",
            failed,
            report.documents.len()
        );
    }

    Ok(())
}
