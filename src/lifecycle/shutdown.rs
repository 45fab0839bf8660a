//! Per-instance shutdown trigger.
//!
//! Every `LifecycleManager` owns one `Shutdown`. Handles cloned from it start
//! the same drain sequence an interrupt would, so several servers can share a
//! process without stopping each other.

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct Shutdown {
    notify: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(1);
        Self { notify }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.notify.subscribe()
    }

    /// Request shutdown.
    ///
    /// A request made before serving starts is held until the manager begins
    /// waiting for it. Returns `false` once the owning manager has finished.
    pub fn trigger(&self) -> bool {
        let delivered = self.notify.send(()).is_ok();
        tracing::debug!(delivered, "Shutdown requested");
        delivered
    }

    /// Number of managers still waiting on this trigger.
    pub fn receiver_count(&self) -> usize {
        self.notify.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
