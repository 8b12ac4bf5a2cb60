//! The remote half of a two-phase mutation.

use crate::errors::Error;
use crate::models::{NewProduct, Product, ProductPatch};
use crate::remote::RemoteStore;
use tracing::{debug, warn};

/// A remote call produced by a local commit.
///
/// Executing it does not touch the reconciler, so callers may run it
/// concurrently with further commits and apply the outcome later.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOp {
    /// Create the record that was committed locally under `local_id`.
    Create {
        /// Client-generated id the outcome is matched against
        local_id: String,
        /// Non-id fields sent to the server
        data: NewProduct,
    },
    /// Send a partial update for `id`.
    Update {
        /// Record id
        id: String,
        /// Fields that changed
        patch: ProductPatch,
    },
    /// Delete a record that was already removed locally.
    Delete {
        /// The record as it was before removal, reinserted if the call fails
        removed: Product,
    },
}

/// Result of executing a [`RemoteOp`], merged back with
/// [`crate::sync::OfflineReconciler::apply`].
#[derive(Debug)]
pub enum SyncOutcome {
    /// The server stored the record, possibly under a new id.
    Created {
        /// Id of the local copy to replace
        local_id: String,
        /// Server copy
        product: Product,
    },
    /// The server accepted the update.
    Updated {
        /// Id of the local copy to replace
        id: String,
        /// Server copy
        product: Product,
    },
    /// The server deleted the record.
    Deleted {
        /// Deleted id
        id: String,
    },
    /// The call failed; the op is kept for compensation.
    Failed {
        /// The op that failed
        op: RemoteOp,
        /// Why
        error: Error,
    },
}

impl SyncOutcome {
    /// True unless the call failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

impl RemoteOp {
    /// Id of the record the op concerns (the local id for creates).
    #[must_use]
    pub fn record_id(&self) -> &str {
        match self {
            Self::Create { local_id, .. } => local_id,
            Self::Update { id, .. } => id,
            Self::Delete { removed } => &removed.id,
        }
    }

    /// Runs the call. Never fails; errors become [`SyncOutcome::Failed`].
    ///
    /// A delete the server answers with "not found" counts as done: the
    /// record is already gone there.
    pub async fn execute<R: RemoteStore + ?Sized>(self, remote: &R) -> SyncOutcome {
        debug!("Executing remote op for {}", self.record_id());
        let result = match &self {
            Self::Create { data, .. } => remote.create_product(data.clone()).await,
            Self::Update { id, patch } => remote.update_product(id, patch.clone()).await,
            Self::Delete { removed } => remote.delete_product(&removed.id).await,
        };

        match (self, result) {
            (Self::Create { local_id, .. }, Ok(product)) => {
                SyncOutcome::Created { local_id, product }
            }
            (Self::Update { id, .. }, Ok(product)) => SyncOutcome::Updated { id, product },
            (Self::Delete { removed }, Ok(_)) => SyncOutcome::Deleted { id: removed.id },
            (Self::Delete { removed }, Err(Error::ProductNotFound { .. })) => {
                debug!("{} was never on the server, delete confirmed", removed.id);
                SyncOutcome::Deleted { id: removed.id }
            }
            (op, Err(error)) => {
                warn!("Remote op for {} failed: {}", op.record_id(), error);
                SyncOutcome::Failed { op, error }
            }
        }
    }
}
