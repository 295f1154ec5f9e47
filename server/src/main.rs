use anyhow::{Context, Result};
use clap::Parser;
use common::config::{self, ServerConfig, WorldClockConfig};
use common::zones::Zone;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    bind: Option<String>,
    #[arg(long)]
    static_dir: Option<String>,
    #[arg(long, default_value = "world-clock.json")]
    config: String,
}

/// Effective server settings: CLI flag, then config file, then default.
#[derive(Debug, PartialEq)]
struct Settings {
    port: u16,
    bind: String,
    static_dir: String,
}

fn resolve(args: Args, file: ServerConfig) -> Settings {
    Settings {
        port: args.port.or(file.port).unwrap_or(config::DEFAULT_PORT),
        bind: args.bind.or(file.bind).unwrap_or_else(|| config::DEFAULT_BIND.into()),
        static_dir: args
            .static_dir
            .or(file.static_dir)
            .unwrap_or_else(|| config::DEFAULT_STATIC_DIR.into()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "world_clock_server=info,tower_http=info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let file = WorldClockConfig::load(&args.config)
        .context("Failed to load config")?
        .server();

    let Settings { port, bind, static_dir } = resolve(args, file);

    let addr = format!("{}:{}", bind, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Static assets from: {}", static_dir);
    info!(
        "Cities: {}",
        Zone::all().iter().map(|z| z.code).collect::<Vec<_>>().join(", ")
    );
    info!("Press Ctrl-C to exit.");

    let app = world_clock_server::router(static_dir);
    world_clock_server::serve(listener, app, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::parse_from(std::iter::once("world-clock-server").chain(flags.iter().copied()))
    }

    fn file() -> ServerConfig {
        ServerConfig {
            port: Some(9090),
            bind: Some("127.0.0.1".into()),
            static_dir: Some("/srv/static".into()),
        }
    }

    #[test]
    fn test_cli_flags_win_over_file() {
        let settings = resolve(
            args(&["--port", "7070", "--bind", "::1", "--static-dir", "assets"]),
            file(),
        );
        assert_eq!(
            settings,
            Settings { port: 7070, bind: "::1".into(), static_dir: "assets".into() }
        );
    }

    #[test]
    fn test_file_used_without_flags() {
        let settings = resolve(args(&[]), file());
        assert_eq!(
            settings,
            Settings { port: 9090, bind: "127.0.0.1".into(), static_dir: "/srv/static".into() }
        );
    }

    #[test]
    fn test_defaults_without_flags_or_file() {
        let settings = resolve(args(&[]), ServerConfig::default());
        assert_eq!(
            settings,
            Settings { port: 8080, bind: "0.0.0.0".into(), static_dir: "static".into() }
        );
    }

    #[test]
    fn test_mixed_sources() {
        let partial = ServerConfig { bind: Some("127.0.0.1".into()), ..ServerConfig::default() };
        let settings = resolve(args(&["--port", "7070"]), partial);
        assert_eq!(settings.port, 7070);
        assert_eq!(settings.bind, "127.0.0.1");
        assert_eq!(settings.static_dir, "static");
    }
}
