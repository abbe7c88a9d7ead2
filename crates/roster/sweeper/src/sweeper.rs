//! Expiry sweeper
//!
//! A sweep lists expired groups, then for each one awaits the surface deletion
//! with no group lock held and retires the group under its lock. Retirement
//! re-checks expiry, so a sweep never races an in-flight join or leave into an
//! inconsistent state.

use crate::config::SweeperConfig;
use crate::surface::{RenderSurface, SurfaceError};
use roster_registry::GroupRegistry;
use roster_types::{Clock, GroupId, RetiredGroup, RosterError};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Events emitted by the sweeper.
#[derive(Debug, Clone)]
pub enum SweepEvent {
    /// A group left the registry. `surface_error` is set when its surface
    /// could not be deleted.
    GroupRetired {
        group: RetiredGroup,
        surface_error: Option<SurfaceError>,
    },

    /// A sweep finished. `expired` counts the groups found past retention.
    SweepCompleted { expired: usize, retired: usize },
}

/// Summary of one sweep
#[derive(Debug, Default, Clone)]
pub struct SweepReport {
    /// Groups found past the retention window
    pub expired: usize,
    pub retired: Vec<RetiredGroup>,
    pub surface_failures: Vec<(GroupId, SurfaceError)>,
}

pub struct ExpirySweeper {
    config: SweeperConfig,
    registry: Arc<GroupRegistry>,
    surface: Arc<dyn RenderSurface>,
    event_tx: broadcast::Sender<SweepEvent>,
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    pub fn new(
        config: SweeperConfig,
        registry: Arc<GroupRegistry>,
        surface: Arc<dyn RenderSurface>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            config,
            registry,
            surface,
            event_tx,
            shutdown_tx,
        }
    }

    /// Subscribe to sweep events.
    pub fn subscribe(&self) -> broadcast::Receiver<SweepEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Run one sweep now.
    #[instrument(skip(self))]
    pub async fn sweep(&self) -> SweepReport {
        let now = self.registry.clock().now();
        let retention = self.config.retention();
        let expired = self.registry.expired(now, retention);

        let mut report = SweepReport {
            expired: expired.len(),
            ..Default::default()
        };

        for candidate in expired {
            // External cleanup first; the registry wins either way.
            let surface_error = self.surface.delete(&candidate.render_target).await.err();

            match self.registry.retire_expired(&candidate.id, now, retention) {
                Ok(Some(group)) => {
                    info!(
                        group_id = %group.id,
                        created_at = %candidate.created_at,
                        "Retired expired group"
                    );
                    if let Some(err) = &surface_error {
                        report.surface_failures.push((group.id.clone(), err.clone()));
                    }
                    let _ = self.event_tx.send(SweepEvent::GroupRetired {
                        group: group.clone(),
                        surface_error,
                    });
                    report.retired.push(group);
                }
                Ok(None) => {
                    debug!(group_id = %candidate.id, "Group no longer expired, skipping");
                }
                Err(RosterError::NotFound(_)) => {
                    debug!(group_id = %candidate.id, "Group already retired");
                }
                Err(e) => {
                    warn!(group_id = %candidate.id, error = %e, "Failed to retire group");
                }
            }
        }

        info!(
            expired = report.expired,
            retired = report.retired.len(),
            "Sweep completed"
        );
        let _ = self.event_tx.send(SweepEvent::SweepCompleted {
            expired: report.expired,
            retired: report.retired.len(),
        });

        report
    }

    /// Sweep on every interval tick until [`stop`](Self::stop) is called.
    ///
    /// The first tick fires immediately.
    pub async fn run(self: Arc<Self>) {
        let mut shutdown = self.shutdown_tx.subscribe();
        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.interval().as_secs(),
            retention_secs = self.config.retention_secs,
            "Expiry sweeper started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    }

    /// Spawn [`run`](Self::run) on the current runtime.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run())
    }

    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }
}
