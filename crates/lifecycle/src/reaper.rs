//! Background expiry processing.
//!
//! The [`Reaper`] owns the periodic work: in the sweep strategy it
//! scans the repository for groups past their deadline and reaps them;
//! in the timer strategy it arms a per-group [`DelayQueue`] entry from
//! each registration and reaps the moment a deadline fires, with a
//! coarse fallback sweep as the safety net for timers lost to a
//! restart. Overlapping passes (sweep vs. timer, or two sweeps) are
//! harmless because [`LinkLifecycleManager::reap`] is idempotent.

use std::future::poll_fn;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::interval;
use tokio_util::time::DelayQueue;
use tracing::{error, info};

use vanish_core::FileGroupId;

use crate::manager::LinkLifecycleManager;
use crate::notifier::Registration;

/// How expired groups are noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStrategy {
    /// Periodically scan the repository for expired groups. Simple and
    /// restart-proof; the sweep interval bounds how long expired data
    /// can linger.
    Sweep,
    /// Arm a per-group timer at creation for near-instant teardown.
    /// Timers live in process memory, so a coarse fallback sweep
    /// covers anything lost to a restart or a missed registration.
    Timer,
}

/// Configuration for the background reaper.
#[derive(Debug, Clone)]
pub struct ReaperConfig {
    /// Which expiry strategy to run.
    pub strategy: ExpiryStrategy,
    /// Sweep period for [`ExpiryStrategy::Sweep`] (default: 300 seconds).
    pub sweep_interval: Duration,
    /// Fallback sweep period for [`ExpiryStrategy::Timer`]
    /// (default: 3600 seconds).
    pub fallback_sweep_interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            strategy: ExpiryStrategy::Sweep,
            sweep_interval: Duration::from_secs(300),
            fallback_sweep_interval: Duration::from_secs(3600),
        }
    }
}

/// Background task that reaps expired file groups.
pub struct Reaper {
    config: ReaperConfig,
    manager: Arc<LinkLifecycleManager>,
    registrations: Option<mpsc::Receiver<Registration>>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl std::fmt::Debug for Reaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Reaper")
    }
}

impl Reaper {
    /// Run until a shutdown signal arrives.
    pub async fn run(&mut self) {
        info!(strategy = ?self.config.strategy, "expiry reaper starting");

        let sweep_every = match self.config.strategy {
            ExpiryStrategy::Sweep => self.config.sweep_interval,
            ExpiryStrategy::Timer => self.config.fallback_sweep_interval,
        };
        let mut sweep_tick = interval(sweep_every);
        let mut timers: DelayQueue<FileGroupId> = DelayQueue::new();

        loop {
            // An empty DelayQueue reports ready-None instead of pending,
            // so its branch stays disabled until something is armed.
            let has_timers = !timers.is_empty();

            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("expiry reaper received shutdown signal");
                    break;
                }
                _ = sweep_tick.tick() => {
                    if let Err(e) = self.manager.sweep_expired().await {
                        error!(error = %e, "error running expiry sweep");
                    }
                }
                Some(reg) = next_registration(&mut self.registrations) => {
                    let delay = (reg.expires_at - Utc::now())
                        .to_std()
                        .unwrap_or(Duration::ZERO);
                    timers.insert(reg.id, delay);
                }
                Some(expired) = poll_fn(|cx| timers.poll_expired(cx)), if has_timers => {
                    let id = expired.into_inner();
                    if let Err(e) = self.manager.reap(&id).await {
                        // The record survives; the fallback sweep retries.
                        error!(id = %id, error = %e, "timer-driven reap failed");
                    }
                }
            }
        }

        info!("expiry reaper stopped");
    }
}

/// Await the next registration, or forever when running without a
/// registration channel (sweep strategy).
async fn next_registration(
    rx: &mut Option<mpsc::Receiver<Registration>>,
) -> Option<Registration> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Builder for creating a [`Reaper`].
pub struct ReaperBuilder {
    config: ReaperConfig,
    manager: Option<Arc<LinkLifecycleManager>>,
    registrations: Option<mpsc::Receiver<Registration>>,
}

impl ReaperBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ReaperConfig::default(),
            manager: None,
            registrations: None,
        }
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: ReaperConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the lifecycle manager (required).
    #[must_use]
    pub fn manager(mut self, manager: Arc<LinkLifecycleManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Set the registration channel produced by
    /// [`TimerNotifier::channel`](crate::TimerNotifier::channel).
    /// Required for [`ExpiryStrategy::Timer`].
    #[must_use]
    pub fn registrations(mut self, rx: mpsc::Receiver<Registration>) -> Self {
        self.registrations = Some(rx);
        self
    }

    /// Build the reaper.
    ///
    /// Returns the reaper and a shutdown sender.
    pub fn build(self) -> Result<(Reaper, mpsc::Sender<()>), &'static str> {
        let manager = self.manager.ok_or("manager is required")?;
        if self.config.strategy == ExpiryStrategy::Timer && self.registrations.is_none() {
            return Err("timer strategy requires a registration channel");
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Ok((
            Reaper {
                config: self.config,
                manager,
                registrations: self.registrations,
                shutdown_rx,
            },
            shutdown_tx,
        ))
    }
}

impl Default for ReaperBuilder {
    fn default() -> Self {
        Self::new()
    }
}
