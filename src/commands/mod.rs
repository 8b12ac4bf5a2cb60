//! Command-line interface: argument definitions and the session that runs them.

pub mod format;
pub mod product;
pub mod transfer;

use crate::config::{AppConfig, RemoteKind, database};
use crate::errors::Result;
use crate::remote::{DatabaseRemote, HttpRemote, RemoteStore};
use crate::storage::FileStore;
use crate::sync::{Connectivity, OfflineReconciler};
use crate::transfer::SnapshotClient;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{info, warn};

/// The reconciler as the binary builds it.
pub type Session = OfflineReconciler<FileStore, Box<dyn RemoteStore>>;

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(
    name = "controle-precos",
    about = "Controle de preços offline-first",
    long_about = None
)]
pub struct Cli {
    /// Never contact the remote store; changes stay pending
    #[arg(long, global = true)]
    pub offline: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List stored products
    List(product::ListArgs),
    /// Register a purchase
    Add(product::AddArgs),
    /// Change fields of a product
    Update(product::UpdateArgs),
    /// Delete a product
    Remove(product::RemoveArgs),
    /// Search by name or brand
    Search(product::SearchArgs),
    /// Send pending products and merge the server list
    Sync,
    /// Write the list to banco_produtos_<date>.json
    Export(transfer::DirArgs),
    /// Add every product of an exported file
    Import(transfer::ImportArgs),
    /// Compare the published snapshot with the local list
    CheckSnapshot,
    /// Save the published snapshot as banco_produtos.json
    DownloadSnapshot(transfer::DirArgs),
}

/// Builds the configured remote and reports whether it is reachable.
///
/// The embedded database is reachable whenever it opens; the HTTP API is
/// probed unless `offline` is set.
///
/// # Errors
/// Returns an error if the embedded database cannot be opened or the HTTP
/// client cannot be built.
pub async fn connect_remote(
    config: &AppConfig,
    offline: bool,
) -> Result<(Box<dyn RemoteStore>, Connectivity)> {
    match config.remote.kind {
        RemoteKind::Http => {
            let remote = HttpRemote::new(
                config.remote.base_url.clone(),
                Duration::from_secs(config.remote.timeout_secs),
            )?;
            let connectivity = if offline {
                Connectivity::Offline
            } else {
                Connectivity::from_online(remote.probe().await)
            };
            let remote: Box<dyn RemoteStore> = Box::new(remote);
            Ok((remote, connectivity))
        }
        RemoteKind::Database => {
            let url = database::get_database_url(config.remote.database_url.as_deref());
            let db = database::create_connection(&url).await?;
            let connectivity = Connectivity::from_online(!offline);
            let remote: Box<dyn RemoteStore> = Box::new(DatabaseRemote::new(db));
            Ok((remote, connectivity))
        }
    }
}

/// Opens the session: loads the local list offline, then goes online if the
/// remote is reachable, which sends pending records and merges the server list.
///
/// # Errors
/// Returns an error if the remote cannot be built.
pub async fn open_session(config: &AppConfig, offline: bool) -> Result<Session> {
    std::fs::create_dir_all(&config.storage.dir)?;
    let local = FileStore::new(&config.storage.dir, &config.storage.key);
    let (remote, connectivity) = connect_remote(config, offline).await?;

    let mut session = OfflineReconciler::new(local, remote, Connectivity::Offline);
    session.load();
    if connectivity.is_online() {
        if let Some(report) = session.set_connectivity(connectivity).await {
            if report.attempted > 0 {
                info!(
                    "Startup sync: {} of {} pending products sent",
                    report.synced, report.attempted
                );
            }
        }
    } else {
        warn!("Remote store unreachable, working offline");
    }
    Ok(session)
}

impl Cli {
    /// Runs the command and returns what to print.
    ///
    /// # Errors
    /// Returns validation, import, snapshot and setup errors. Remote-store
    /// failures during mutations are not errors; they leave records pending.
    pub async fn run(self, config: &AppConfig) -> Result<String> {
        let mut session = open_session(config, self.offline).await?;
        let snapshot = || {
            SnapshotClient::new(
                config.snapshot.url.clone(),
                Duration::from_secs(config.remote.timeout_secs),
            )
        };

        match self.command {
            Command::List(args) => Ok(product::list(&session, &args)),
            Command::Add(args) => product::add(&mut session, &args).await,
            Command::Update(args) => product::update(&mut session, &args).await,
            Command::Remove(args) => product::remove(&mut session, &args).await,
            Command::Search(args) => Ok(product::search(&session, &args).await),
            Command::Sync => Ok(transfer::sync(&mut session).await),
            Command::Export(args) => transfer::export(&session, &args),
            Command::Import(args) => transfer::import(&mut session, &args).await,
            Command::CheckSnapshot => transfer::check_snapshot(&session, &snapshot()?).await,
            Command::DownloadSnapshot(args) => {
                transfer::download_snapshot(&snapshot()?, &args).await
            }
        }
    }
}
