//! Online/offline signal.
//!
//! Hosts report connectivity changes to a [`NetworkMonitor`]; the reconciler
//! follows a receiver of the monitor's channel. Nothing is polled.

use std::fmt;
use tokio::sync::watch;
use tracing::{info, warn};

/// Whether the remote store is reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// Remote calls are attempted
    #[default]
    Online,
    /// Everything stays local
    Offline,
}

impl Connectivity {
    /// Maps a platform `onLine`-style boolean.
    #[must_use]
    pub const fn from_online(online: bool) -> Self {
        if online { Self::Online } else { Self::Offline }
    }

    /// True for [`Connectivity::Online`].
    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => f.write_str("online"),
            Self::Offline => f.write_str("offline"),
        }
    }
}

/// Publishes connectivity changes on a watch channel.
///
/// Repeated reports of the same status do not wake subscribers.
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<Connectivity>,
}

impl NetworkMonitor {
    /// Monitor starting at `initial`.
    #[must_use]
    pub fn new(initial: Connectivity) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// A receiver for [`crate::sync::OfflineReconciler::follow`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }

    /// Last reported status.
    #[must_use]
    pub fn status(&self) -> Connectivity {
        *self.tx.borrow()
    }

    /// Records a platform event. Returns true when the status changed.
    pub fn report(&self, status: Connectivity) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            match status {
                Connectivity::Online => info!("Network: ONLINE"),
                Connectivity::Offline => warn!("Network: OFFLINE"),
            }
        }
        changed
    }
}
