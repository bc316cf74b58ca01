//! Expiry notification strategies.
//!
//! Expired groups must eventually be reaped, with at most one
//! observable teardown per group. That is one interface with two
//! pluggable implementations: [`SweepNotifier`] does nothing at
//! registration time and lets the periodic sweep discover expired
//! groups, while [`TimerNotifier`] forwards each `(id, expires_at)`
//! pair to the [`Reaper`](crate::Reaper), which arms a per-group timer
//! for near-instant teardown. A coarse fallback sweep covers timers
//! lost to restarts or full channels.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use vanish_core::FileGroupId;

use crate::error::LifecycleError;

/// A pending expiry registration forwarded to the reaper.
#[derive(Debug, Clone)]
pub struct Registration {
    /// The group to reap when the deadline passes.
    pub id: FileGroupId,
    /// The group's expiry instant.
    pub expires_at: DateTime<Utc>,
}

/// Signals, near the expiry instant, that a file group has expired.
///
/// `register` is called once per group, right after its metadata is
/// persisted. Registration failures are absorbed by the caller: the
/// fallback sweep guarantees eventual reaping either way.
#[async_trait]
pub trait ExpiryNotifier: Send + Sync {
    /// Register a group's expiry deadline.
    async fn register(
        &self,
        id: &FileGroupId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), LifecycleError>;
}

/// Notifier for the sweep strategy: registration is a no-op because
/// the periodic sweep queries the repository directly.
#[derive(Debug, Default)]
pub struct SweepNotifier;

impl SweepNotifier {
    /// Create a new sweep notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExpiryNotifier for SweepNotifier {
    async fn register(
        &self,
        _id: &FileGroupId,
        _expires_at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        Ok(())
    }
}

/// Notifier for the timer strategy: forwards registrations to the
/// reaper's delay queue over an mpsc channel.
#[derive(Debug)]
pub struct TimerNotifier {
    tx: mpsc::Sender<Registration>,
}

impl TimerNotifier {
    /// Create a notifier together with the receiving end the reaper
    /// consumes.
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<Registration>) {
        let (tx, rx) = mpsc::channel(256);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ExpiryNotifier for TimerNotifier {
    async fn register(
        &self,
        id: &FileGroupId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        self.tx
            .send(Registration {
                id: id.clone(),
                expires_at,
            })
            .await
            .map_err(|_| LifecycleError::Notify("expiry reaper is not running".to_owned()))
    }
}
