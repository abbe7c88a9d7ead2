//! rosterd - runs the roster engine with its expiry sweeper
//!
//! Without a chat platform attached, groups render through a surface that
//! only logs. The daemon sweeps expired groups on schedule, discards stale
//! creation drafts, and logs every retirement until interrupted.

use clap::Parser;
use roster_daemon::{
    log_sweep_event, DaemonError, DaemonResult, LogSurface, RosterConfig, RosterService,
    StaticPrivileges,
};
use roster_registry::GroupRegistry;
use roster_sweeper::ExpirySweeper;
use roster_types::ParticipantId;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Roster daemon CLI
#[derive(Parser)]
#[command(name = "rosterd")]
#[command(about = "Roster daemon - role-slotted groups with FIFO waitlists", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ROSTER_CONFIG")]
    config: Option<String>,

    /// Log level
    #[arg(long, env = "ROSTER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "ROSTER_LOG_JSON")]
    json: bool,

    /// Participants allowed to manage any group
    #[arg(long = "admin", value_name = "PARTICIPANT")]
    admins: Vec<String>,

    /// Let any participant create groups
    #[arg(long)]
    open_creation: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    let config = RosterConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        cli.json || config.logging.json,
    );

    let registry = Arc::new(GroupRegistry::new());
    let surface = Arc::new(LogSurface::new());
    let privileges = StaticPrivileges::new(cli.admins.into_iter().map(ParticipantId::new))
        .with_open_creation(cli.open_creation);

    let service = Arc::new(RosterService::new(
        registry.clone(),
        surface.clone(),
        Arc::new(privileges),
        config.catalog(),
        config.drafts.ttl(),
    ));

    let sweeper = Arc::new(ExpirySweeper::new(
        config.sweeper.clone(),
        registry.clone(),
        surface,
    ));

    let mut events = sweeper.subscribe();
    let event_task = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_sweep_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Sweep event log fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let purge_every = config
        .drafts
        .ttl()
        .to_std()
        .unwrap_or_default()
        .max(std::time::Duration::from_secs(1));
    let draft_task = {
        let service = service.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(purge_every);
            loop {
                ticker.tick().await;
                service.purge_drafts();
            }
        })
    };

    let sweeper_task = sweeper.spawn();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        roles = config.catalog().len(),
        retention_secs = config.sweeper.retention_secs,
        interval_secs = config.sweeper.interval_secs,
        "rosterd started"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    sweeper.stop();
    sweeper_task
        .await
        .map_err(|e| DaemonError::Task(e.to_string()))?;
    draft_task.abort();
    drop(sweeper);
    event_task
        .await
        .map_err(|e| DaemonError::Task(e.to_string()))?;

    info!(groups = registry.len(), "rosterd stopped");
    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.to_string().into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
