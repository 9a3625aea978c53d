//! `pms-syncd`: webhook daemon applying commit-driven work item status
//! changes.
//!
//! Stores state in `PostgreSQL` when `database.url` is configured. Otherwise
//! state is kept in memory, starting from the `[seed]` configuration section.

use clap::Parser;
use mockable::DefaultClock;
use pms_sync::{
    config::{AppConfig, ConfigError},
    http::{AppState, create_router},
    push_sync::{
        adapters::{
            memory::InMemoryActivityLog,
            postgres::{
                PostgresActivityLog, PostgresProjectDirectory, PostgresWorkItemStore, build_pool,
            },
        },
        ports::{ActivityLogHistory, ActivityLogSink, ProjectDirectory, WorkItemStore},
        services::{PushSyncService, SyncSettings},
    },
    telemetry::{TelemetryError, init_tracing},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "pms-syncd")]
#[command(about = "Commit-driven work item status synchronisation daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PMS_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration file
    #[arg(short, long, env = "PMS_SYNC_LISTEN_ADDR")]
    listen: Option<SocketAddr>,

    /// Log level, overriding the configuration file
    #[arg(long, env = "PMS_SYNC_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "PMS_SYNC_LOG_JSON")]
    json: bool,
}

/// Fatal daemon errors.
#[derive(Debug, Error)]
enum DaemonError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("failed to build database pool: {0}")]
    Database(#[from] diesel::r2d2::PoolError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    init_tracing(&config.logging)?;
    let settings = config.sync.to_settings().map_err(ConfigError::from)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_addr = %config.server.listen_addr,
        branch_policy = %config.sync.branch_policy,
        "starting pms-syncd"
    );

    match config.database.url.as_deref() {
        Some(url) => {
            let pool = build_pool(url, config.database.max_connections)?;
            tracing::info!("using PostgreSQL persistence");
            if !config.seed.projects.is_empty() || !config.seed.work_items.is_empty() {
                tracing::warn!("seed section is ignored when a database is configured");
            }
            serve(
                config.server.listen_addr,
                PostgresWorkItemStore::new(pool.clone()),
                PostgresActivityLog::new(pool.clone()),
                PostgresProjectDirectory::new(pool),
                settings,
            )
            .await
        }
        None => {
            let (projects, work_items) = config.seed.memory_adapters()?;
            tracing::warn!(
                seeded_projects = config.seed.projects.len(),
                seeded_work_items = config.seed.work_items.len(),
                "no database configured; state is kept in memory"
            );
            if config.seed.projects.is_empty() {
                tracing::warn!("no projects seeded; every push will be answered with 404");
            }
            serve(
                config.server.listen_addr,
                work_items,
                InMemoryActivityLog::new(),
                projects,
                settings,
            )
            .await
        }
    }
}

async fn serve<W, L, P>(
    addr: SocketAddr,
    work_items: W,
    activity_log: L,
    projects: P,
    settings: SyncSettings,
) -> Result<(), DaemonError>
where
    W: WorkItemStore + 'static,
    L: ActivityLogSink + ActivityLogHistory + 'static,
    P: ProjectDirectory + 'static,
{
    let service = PushSyncService::new(
        Arc::new(work_items),
        Arc::new(activity_log),
        Arc::new(projects),
        Arc::new(DefaultClock),
        settings,
    );
    let app = create_router(AppState::new(service));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}
