use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use vanish_lifecycle::{
    ExpiryNotifier, ExpiryStrategy, LinkLifecycleManager, ReaperBuilder, SweepNotifier,
    TimerNotifier,
};
use vanish_server::api::{AppState, router};
use vanish_server::config::VanishConfig;
use vanish_server::{blob_factory, repo_factory, telemetry};

/// Vanish file-sharing HTTP server.
#[derive(Parser, Debug)]
#[command(name = "vanish-server", about = "Standalone HTTP server for Vanish")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "vanish.toml")]
    config: String,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from the TOML file, or use defaults if it does
    // not exist.
    let config_exists = Path::new(&cli.config).exists();
    let mut config: VanishConfig = if config_exists {
        let contents = std::fs::read_to_string(&cli.config)?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    telemetry::init();

    if !config_exists {
        info!(path = %cli.config, "config file not found, using defaults");
    }

    // Construct the process-scoped collaborators.
    let repo = repo_factory::create_repository(&config.repository)?;
    info!(backend = %config.repository.backend, "repository initialized");

    let blobs = blob_factory::create_blob_store(&config.blob).await?;
    info!(backend = %config.blob.backend, "blob store initialized");

    // The timer strategy needs its registration channel wired between
    // the manager's notifier and the reaper before either is built.
    let use_timer = config.reaper.enabled && config.reaper.strategy == ExpiryStrategy::Timer;
    let (notifier, registrations): (Arc<dyn ExpiryNotifier>, _) = if use_timer {
        let (notifier, rx) = TimerNotifier::channel();
        (Arc::new(notifier), Some(rx))
    } else {
        (Arc::new(SweepNotifier::new()), None)
    };

    let manager = Arc::new(
        LinkLifecycleManager::builder()
            .repository(repo)
            .blob_store(blobs)
            .notifier(notifier)
            .limits(config.upload_limits())
            .build()?,
    );

    let reaper = if config.reaper.enabled {
        let mut builder = ReaperBuilder::new()
            .config(config.reaper_config())
            .manager(Arc::clone(&manager));
        if let Some(rx) = registrations {
            builder = builder.registrations(rx);
        }
        let (mut reaper, shutdown_tx) = builder.build()?;
        let handle = tokio::spawn(async move {
            reaper.run().await;
        });
        Some((handle, shutdown_tx))
    } else {
        warn!("background reaper disabled; expired groups will not be cleaned up");
        None
    };

    let state = AppState {
        lifecycle: manager,
        link_base: config.link_base(),
        max_body_bytes: config.max_body_bytes(),
        allowed_origin: config.cors.allowed_origin.clone(),
    };
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "vanish server listening");

    // Serve with graceful shutdown on SIGINT / SIGTERM.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stop the reaper and give it a bounded window to finish its pass.
    if let Some((handle, shutdown_tx)) = reaper {
        let _ = shutdown_tx.send(()).await;
        let timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);
        if tokio::time::timeout(timeout, handle).await.is_err() {
            warn!(
                timeout_secs = config.server.shutdown_timeout_seconds,
                "reaper did not stop within the shutdown timeout"
            );
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// Wait for SIGINT (Ctrl+C) or SIGTERM, then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("received SIGINT"); }
        () = terminate => { info!("received SIGTERM"); }
    }
}
