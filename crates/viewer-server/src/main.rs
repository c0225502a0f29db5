//! artifactory-viewer: browse an Artifactory repository folder.
//!
//! Provides:
//! - `serve`: the `/api/browse` and `/api/file` proxy plus the static front-end
//! - `ls`, `open`: directory listing and document viewing with link following
//! - `watch`: periodic change notifications for a directory
//! - `notifications`: the persisted notification preference

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use viewer_core::PreferenceStore;
use viewer_server::commands::{self, ClientOptions, Toggle};
use viewer_server::config::{Config, default_config_dir};
use viewer_server::{AppState, Upstream, router, serve, shutdown_signal};

#[derive(Parser, Debug)]
#[command(name = "artifactory-viewer")]
#[command(about = "Browse an Artifactory repository folder and follow links between its documents")]
struct Cli {
    /// Path to config directory
    #[arg(long, env = "VIEWER_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the proxy and serve the front-end
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 3000, env = "VIEWER_PORT")]
        port: u16,

        /// Address to bind to
        #[arg(long, default_value = "0.0.0.0", env = "VIEWER_BIND")]
        bind: String,
    },

    /// List a directory
    Ls {
        /// Repository path, e.g. "1.0.0/docs" (default: root)
        #[arg(default_value = "")]
        path: String,

        #[command(flatten)]
        proxy: ProxyArgs,
    },

    /// Show a file and optionally follow links from it
    Open {
        /// Repository path of the file
        path: String,

        /// Link to follow from the open document (repeatable, applied in order)
        #[arg(long)]
        follow: Vec<String>,

        /// Print the link resolution log afterwards
        #[arg(long)]
        trace: bool,

        #[command(flatten)]
        proxy: ProxyArgs,
    },

    /// Report changes to a directory until interrupted
    Watch {
        /// Repository path to watch (default: root)
        #[arg(default_value = "")]
        path: String,

        /// Poll period in seconds (default: poll_interval_secs from config)
        #[arg(long)]
        interval: Option<u64>,

        #[command(flatten)]
        proxy: ProxyArgs,
    },

    /// Turn change notifications on or off
    Notifications {
        #[arg(value_enum, default_value_t = Toggle::Status)]
        toggle: Toggle,
    },
}

#[derive(Args, Debug)]
struct ProxyArgs {
    /// URL of a running proxy
    #[arg(
        long = "proxy",
        default_value = "http://localhost:3000",
        env = "VIEWER_PROXY_URL"
    )]
    proxy_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG; the server logs requests, commands only problems
    let default_filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Command::Serve { .. }, false) => {
            "artifactory_viewer=info,viewer_server=info,viewer_core=info,tower_http=debug"
        }
        (_, false) => "warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);

    match cli.command {
        Command::Serve { port, bind } => run_server(Config::load(&config_dir)?, &bind, port).await,
        Command::Ls { path, proxy } => {
            let config = Config::load(&config_dir)?;
            commands::list(&client_options(&config, proxy), &path).await
        }
        Command::Open {
            path,
            follow,
            trace,
            proxy,
        } => {
            let config = Config::load(&config_dir)?;
            commands::open(&client_options(&config, proxy), &path, &follow, trace).await
        }
        Command::Watch {
            path,
            interval,
            proxy,
        } => {
            let config = Config::load(&config_dir)?;
            let interval = interval
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.poll_interval());
            let store = PreferenceStore::new(&config_dir);
            commands::watch(&client_options(&config, proxy), &store, &path, interval).await
        }
        Command::Notifications { toggle } => {
            commands::notifications(&PreferenceStore::new(&config_dir), toggle)
        }
    }
}

fn client_options(config: &Config, proxy: ProxyArgs) -> ClientOptions {
    ClientOptions {
        proxy_url: proxy.proxy_url,
        timeout: config.request_timeout(),
    }
}

async fn run_server(config: Config, bind: &str, port: u16) -> Result<()> {
    let upstream = Upstream::from_config(&config).context("Failed to create upstream client")?;
    tracing::info!("Browsing: {}", upstream.describe());
    tracing::info!("Serving static files from {:?}", config.static_dir);

    let state = Arc::new(AppState { upstream });
    let app = router(state, &config.static_dir);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Artifactory Viewer running at http://{}", addr);
    serve(listener, app, shutdown_signal()).await?;

    tracing::info!("Artifactory Viewer shut down");
    Ok(())
}
