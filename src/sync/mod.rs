//! Offline-first reconciliation between the local store and the remote store.
//!
//! Every mutation runs in two phases. The commit phase updates the in-memory
//! list and the local store synchronously and cannot fail. The remote phase
//! executes a [`RemoteOp`] and yields a [`SyncOutcome`] that is merged back by
//! id. Failures only ever show up as pending flags.

mod connectivity;
mod ops;
mod reconciler;

pub use connectivity::{Connectivity, NetworkMonitor};
pub use ops::{RemoteOp, SyncOutcome};
pub use reconciler::{OfflineReconciler, SyncReport, merge_remote};
