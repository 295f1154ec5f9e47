//! World clock poller: keeps a display showing the server's current time.

use anyhow::{bail, Context, Result};
use clap::Parser;
use common::config::{self, PollerConfig, WorldClockConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use world_clock_poller::{DisplayTarget, FileDisplay, HttpTimeSource, Poller, TerminalDisplay};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "world-clock.json")]
    config: String,
    /// Server base URL the endpoint path is resolved against.
    #[arg(long)]
    base_url: Option<String>,
    /// Endpoint path, relative to the base URL.
    #[arg(long)]
    path: Option<String>,
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Name of the display target.
    #[arg(long)]
    element: Option<String>,
    /// Write the display to this file instead of the terminal.
    #[arg(long)]
    output_file: Option<String>,
    /// Per-request timeout. No timeout when unset.
    #[arg(long)]
    timeout_ms: Option<u64>,
}

/// Effective poller settings: CLI flag, then config file, then default.
#[derive(Debug, PartialEq)]
struct Settings {
    base_url: String,
    path: String,
    interval_ms: u64,
    element: String,
    output_file: Option<String>,
    timeout: Option<Duration>,
}

fn resolve(args: Args, file: PollerConfig) -> Settings {
    Settings {
        base_url: args.base_url.or(file.base_url).unwrap_or_else(|| config::DEFAULT_BASE_URL.into()),
        path: args.path.or(file.path).unwrap_or_else(|| config::DEFAULT_ENDPOINT.into()),
        interval_ms: args.interval_ms.or(file.interval_ms).unwrap_or(config::DEFAULT_INTERVAL_MS),
        element: args.element.or(file.element).unwrap_or_else(|| config::DEFAULT_ELEMENT.into()),
        output_file: args.output_file.or(file.output_file),
        timeout: args.timeout_ms.or(file.timeout_ms).map(Duration::from_millis),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so the terminal display keeps its line.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "world_clock_poller=info".into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let file = WorldClockConfig::load(&args.config)
        .context("Failed to load config")?
        .poller();

    let Settings {
        base_url,
        path,
        interval_ms,
        element,
        output_file,
        timeout,
    } = resolve(args, file);

    if interval_ms == 0 {
        bail!("interval must be at least 1 ms");
    }

    let source = HttpTimeSource::new(&base_url, &path, timeout)
        .context("Failed to set up time source")?;

    let display: Arc<dyn DisplayTarget> = match output_file {
        Some(out) => {
            info!(file = %out, "Display '{}' writes to file", element);
            Arc::new(FileDisplay::new(element, out))
        }
        None => Arc::new(TerminalDisplay::stdout(element)),
    };

    let poller = Poller::new(Arc::new(source), display, Duration::from_millis(interval_ms));

    info!("🕑 World clock poller v{}", env!("CARGO_PKG_VERSION"));
    poller
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
