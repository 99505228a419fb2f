//! `sift` binary: metasearch over stdin/stdout JSON.
//!
//! Usage: `sift [--config <path>]`. Without `--config` the default config
//! path is used when it exists.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean JSON protocol channel.

use std::path::PathBuf;

use anyhow::Context;
use sift::{DEFAULT_LOG_FILTER, Metasearch, SiftConfig};

fn config_arg() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().context("--config requires a path")?;
                path = Some(PathBuf::from(value));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = config_arg()?;
    let config = SiftConfig::load(config_path.as_deref()).context("failed to load config")?;

    let fallback = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .init();

    tracing::info!("sift starting");

    let sift = Metasearch::with_defaults(config.search).context("invalid search config")?;
    sift::host::run_stdio_host(&sift).await.map_err(|e| {
        tracing::error!(error = %e, "sift exited with error");
        anyhow::anyhow!("sift failed: {e}")
    })?;

    tracing::info!("sift shut down cleanly");
    Ok(())
}
