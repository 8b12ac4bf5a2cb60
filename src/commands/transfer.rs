//! Sync and device-transfer commands.

use crate::errors::Result;
use crate::models::today;
use crate::remote::RemoteStore;
use crate::storage::LocalStore;
use crate::sync::OfflineReconciler;
use crate::transfer::{self, SnapshotClient};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Arguments of `export` and `download-snapshot`.
#[derive(Debug, Clone, Args)]
pub struct DirArgs {
    /// Destination directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

/// Arguments of `import`.
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Exported JSON file
    pub file: PathBuf,
}

/// Sends pending records and merges the remote list.
pub async fn sync<L: LocalStore, R: RemoteStore>(
    reconciler: &mut OfflineReconciler<L, R>,
) -> String {
    if !reconciler.is_online() {
        return format!(
            "Offline: {} produtos aguardando sincronização.",
            reconciler.pending_count()
        );
    }
    let report = reconciler.sync_pending().await;
    let merged = reconciler.refetch().await;
    format!(
        "Sincronização: {} enviados, {} com falha. Lista do servidor {}.",
        report.synced,
        report.failed,
        if merged { "mesclada" } else { "indisponível" }
    )
}

/// Writes the current list as `banco_produtos_<today>.json`.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn export<L: LocalStore, R: RemoteStore>(
    reconciler: &OfflineReconciler<L, R>,
    args: &DirArgs,
) -> Result<String> {
    let path = transfer::export_to_dir(
        &args.dir,
        reconciler.products(),
        today().date_naive(),
    )?;
    Ok(format!(
        "{} produtos exportados para {}",
        reconciler.products().len(),
        path.display()
    ))
}

/// Imports an exported file; every record is added with a fresh id.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a product list.
/// Nothing is added in that case.
pub async fn import<L: LocalStore, R: RemoteStore>(
    reconciler: &mut OfflineReconciler<L, R>,
    args: &ImportArgs,
) -> Result<String> {
    let products = transfer::import_file(&args.file)?;
    info!("Importing {} products from {}", products.len(), args.file.display());
    let added = reconciler.import(products).await;
    Ok(format!("{} produtos importados com sucesso!", added.len()))
}

/// Compares the published snapshot with the local list.
///
/// # Errors
/// Returns an error if the snapshot cannot be fetched or is malformed.
pub async fn check_snapshot<L: LocalStore, R: RemoteStore>(
    reconciler: &OfflineReconciler<L, R>,
    client: &SnapshotClient,
) -> Result<String> {
    let comparison = client.check(reconciler.products()).await?;
    let hint = if comparison.remote_is_newer() {
        "\nHá dados mais recentes no GitHub: use download-snapshot e depois import."
    } else {
        ""
    };
    Ok(format!("{comparison}{hint}"))
}

/// Saves the published snapshot for a later import.
///
/// # Errors
/// Returns an error if the snapshot cannot be fetched or written.
pub async fn download_snapshot(client: &SnapshotClient, args: &DirArgs) -> Result<String> {
    let path = client.download(&args.dir).await?;
    Ok(format!("Snapshot salvo em {}", path.display()))
}
