//! HTTP server for the task board.
//!
//! Opens the database once, serves the JSON API (and optionally the browser
//! UI) until Ctrl-C or SIGTERM, then closes the database.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use taskboard::config::ServerConfig;
use taskboard::tasks::{SqliteTaskStore, TaskService};
use taskboard::{http, logging};

/// Serve the task board over HTTP.
#[derive(Parser, Debug)]
#[command(name = "taskboard-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML config file (defaults to ./taskboard.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Database file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Directory of browser assets to serve
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Log filter, e.g. info or taskboard=debug
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(db) = self.db {
            config.db_path = db;
        }
        if let Some(dir) = self.static_dir {
            config.static_dir = Some(dir);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        config
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match ServerConfig::resolve(args.config.as_deref()) {
        Ok(config) => args.apply(config),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init(&config.log_level) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = SqliteTaskStore::open(&config.db_path)?;
    let service = Arc::new(TaskService::new(store));

    let app = http::router(Arc::clone(&service), config.static_dir.as_deref());
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, db = %config.db_path.display(), "server listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("shutdown signal received, closing database");

    match Arc::try_unwrap(service) {
        Ok(service) => service.into_store().close()?,
        Err(_) => warn!("database still in use at shutdown; leaving it to drop"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
