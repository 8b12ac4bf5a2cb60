//! The offline reconciler: owns the product list the UI renders.

use super::connectivity::Connectivity;
use super::ops::{RemoteOp, SyncOutcome};
use crate::models::{NewProduct, Product, ProductPatch};
use crate::remote::RemoteStore;
use crate::storage::LocalStore;
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Counts from one [`OfflineReconciler::sync_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Pending records sent to the remote store
    pub attempted: usize,
    /// Records the remote store confirmed
    pub synced: usize,
    /// Records still pending afterwards
    pub failed: usize,
}

/// Stateful service holding the in-memory list, mirrored to a [`LocalStore`]
/// and reconciled with a [`RemoteStore`] while online.
///
/// Built once per session and passed by reference. Local commits never fail;
/// remote failures only leave records flagged pending.
#[derive(Debug)]
pub struct OfflineReconciler<L, R> {
    local: L,
    remote: R,
    products: Vec<Product>,
    connectivity: Connectivity,
}

impl<L: LocalStore, R: RemoteStore> OfflineReconciler<L, R> {
    /// A reconciler with an empty list. Call [`Self::load`] to read the local store.
    #[must_use]
    pub const fn new(local: L, remote: R, connectivity: Connectivity) -> Self {
        Self {
            local,
            remote,
            products: Vec::new(),
            connectivity,
        }
    }

    /// Reads the local store into memory and returns the record count.
    ///
    /// Read or parse errors are logged and leave an empty list.
    pub fn load(&mut self) -> usize {
        self.products = match self.local.read_all() {
            Ok(products) => products,
            Err(e) => {
                error!("Failed to read local store, starting empty: {}", e);
                Vec::new()
            }
        };
        info!("Loaded {} products from local store", self.products.len());
        self.products.len()
    }

    /// Current list, newest additions first.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Record with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Number of records not yet confirmed by the remote store.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.products.iter().filter(|p| p.pending_sync).count()
    }

    /// Current connectivity.
    #[must_use]
    pub const fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Shorthand for `connectivity().is_online()`.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// The remote store, for executing ops outside the reconciler.
    #[must_use]
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    /// The local store.
    #[must_use]
    pub const fn local(&self) -> &L {
        &self.local
    }

    fn persist(&self) {
        if let Err(e) = self.local.write_all(&self.products) {
            error!("Failed to write local store: {}", e);
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.products.iter().position(|p| p.id == id)
    }

    /// Commit phase of [`Self::add`].
    ///
    /// Prepends the record under a fresh id, flagged pending when offline, and
    /// returns it with the create op to run when online.
    pub fn commit_add(&mut self, data: NewProduct) -> (Product, Option<RemoteOp>) {
        let pending = !self.is_online();
        let id = Uuid::new_v4().to_string();
        let product = Product::from_new(id.clone(), data.clone()).flagged(pending);

        self.products.insert(0, product.clone());
        self.persist();
        debug!("Committed product {} locally (pending: {})", id, pending);

        let op = (!pending).then_some(RemoteOp::Create { local_id: id, data });
        (product, op)
    }

    /// Commit phase of [`Self::update`].
    ///
    /// Unknown ids are logged and ignored.
    pub fn commit_update(&mut self, id: &str, patch: ProductPatch) -> Option<RemoteOp> {
        let Some(index) = self.position(id) else {
            warn!("Update for unknown product {} ignored", id);
            return None;
        };
        let pending = !self.is_online();
        let product = &mut self.products[index];
        product.apply_patch(&patch);
        product.offline = pending;
        product.pending_sync = pending;
        self.persist();
        debug!("Committed update of {} locally (pending: {})", id, pending);

        (!pending).then(|| RemoteOp::Update {
            id: id.to_string(),
            patch,
        })
    }

    /// Commit phase of [`Self::remove`].
    ///
    /// Unknown ids are logged and ignored.
    pub fn commit_remove(&mut self, id: &str) -> Option<RemoteOp> {
        let Some(index) = self.position(id) else {
            warn!("Removal of unknown product {} ignored", id);
            return None;
        };
        let removed = self.products.remove(index);
        self.persist();
        debug!("Removed {} locally", id);

        self.is_online().then_some(RemoteOp::Delete { removed })
    }

    /// Merges a remote outcome back into the list by id.
    ///
    /// Outcomes may arrive in any order; the last one applied wins.
    pub fn apply(&mut self, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Created {
                local_id: id,
                product,
            }
            | SyncOutcome::Updated { id, product } => {
                self.replace(&id, product.confirmed());
            }
            SyncOutcome::Deleted { id } => {
                debug!("Remote confirmed deletion of {}", id);
                return;
            }
            SyncOutcome::Failed { op, error } => match op {
                RemoteOp::Create { local_id: id, .. } | RemoteOp::Update { id, .. } => {
                    warn!("Keeping {} pending after remote failure: {}", id, error);
                    if let Some(index) = self.position(&id) {
                        let flagged = self.products[index].clone().flagged(true);
                        self.products[index] = flagged;
                    }
                }
                RemoteOp::Delete { removed } => {
                    if self.position(&removed.id).is_some() {
                        debug!("{} already back in the list, not reinserting", removed.id);
                        return;
                    }
                    warn!(
                        "Remote delete of {} failed, reinserting: {}",
                        removed.id, error
                    );
                    self.products.push(removed.flagged(true));
                }
            },
        }
        self.persist();
    }

    fn replace(&mut self, id: &str, product: Product) {
        match self.position(id) {
            Some(index) => {
                debug!("Replacing {} with remote copy {}", id, product.id);
                self.products[index] = product;
            }
            None => debug!("Remote copy for {} arrived after local removal", id),
        }
    }

    /// Adds a product: local commit, then a remote create when online.
    ///
    /// Returns the record as it stands afterwards: the server copy on
    /// success, otherwise the local copy flagged pending. Callers that need
    /// the local record before the remote call finishes use
    /// [`Self::commit_add`] and [`Self::apply`] directly.
    pub async fn add(&mut self, data: NewProduct) -> Product {
        let (local, op) = self.commit_add(data);
        let Some(op) = op else {
            return local;
        };
        let outcome = op.execute(&self.remote).await;
        let settled = match &outcome {
            SyncOutcome::Created { product, .. } => product.clone().confirmed(),
            _ => local.flagged(true),
        };
        self.apply(outcome);
        settled
    }

    /// Partially updates a product: local commit, then a remote update when online.
    pub async fn update(&mut self, id: &str, patch: ProductPatch) {
        if let Some(op) = self.commit_update(id, patch) {
            let outcome = op.execute(&self.remote).await;
            self.apply(outcome);
        }
    }

    /// Removes a product: local commit, then a remote delete when online.
    ///
    /// A failed remote delete puts the record back, flagged pending.
    pub async fn remove(&mut self, id: &str) {
        if let Some(op) = self.commit_remove(id) {
            let outcome = op.execute(&self.remote).await;
            self.apply(outcome);
        }
    }

    /// Remote search while online; local name/brand match when offline or
    /// when the remote call fails.
    pub async fn search(&self, query: &str) -> Vec<Product> {
        if self.is_online() {
            match self.remote.search_products(query).await {
                Ok(found) => return found,
                Err(e) => warn!("Remote search failed, searching locally: {}", e),
            }
        }
        self.search_local(query)
    }

    /// Case-insensitive substring match on `nome` and `marca`.
    #[must_use]
    pub fn search_local(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    /// Sends every pending record to the remote store as a create.
    ///
    /// Records that already exist remotely are created again. Does nothing
    /// while offline.
    pub async fn sync_pending(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        if !self.is_online() {
            debug!("Offline, skipping pending sync");
            return report;
        }

        let ops: Vec<RemoteOp> = self
            .products
            .iter()
            .filter(|p| p.pending_sync)
            .map(|p| RemoteOp::Create {
                local_id: p.id.clone(),
                data: p.to_new(),
            })
            .collect();
        if ops.is_empty() {
            return report;
        }

        info!("Syncing {} pending products", ops.len());
        for op in ops {
            report.attempted += 1;
            let outcome = op.execute(&self.remote).await;
            if outcome.is_success() {
                report.synced += 1;
            } else {
                report.failed += 1;
            }
            self.apply(outcome);
        }
        info!(
            "Pending sync finished: {} synced, {} failed",
            report.synced, report.failed
        );
        report
    }

    /// Fetches the remote list and merges it with [`merge_remote`].
    ///
    /// Returns false when offline or when the fetch fails; the list is then
    /// left unchanged.
    pub async fn refetch(&mut self) -> bool {
        if !self.is_online() {
            return false;
        }
        match self.remote.list_products().await {
            Ok(remote) => {
                let remote_count = remote.len();
                self.products = merge_remote(&self.products, remote);
                self.persist();
                info!(
                    "Merged {} remote products into {} total",
                    remote_count,
                    self.products.len()
                );
                true
            }
            Err(e) => {
                error!("Failed to fetch remote products: {}", e);
                false
            }
        }
    }

    /// Alias of [`Self::refetch`].
    pub async fn sync_with_server(&mut self) -> bool {
        self.refetch().await
    }

    /// Records a connectivity change.
    ///
    /// Going from offline to online runs [`Self::sync_pending`] and then
    /// [`Self::refetch`], and returns the sync report.
    pub async fn set_connectivity(&mut self, connectivity: Connectivity) -> Option<SyncReport> {
        let previous = self.connectivity;
        self.connectivity = connectivity;
        if previous == connectivity {
            return None;
        }
        info!("Connectivity changed: {} -> {}", previous, connectivity);
        if !connectivity.is_online() {
            return None;
        }
        let report = self.sync_pending().await;
        self.refetch().await;
        Some(report)
    }

    /// Applies every status published on `rx`, starting with the current one,
    /// until the sender is dropped.
    pub async fn follow(&mut self, mut rx: watch::Receiver<Connectivity>) {
        loop {
            let status = *rx.borrow_and_update();
            self.set_connectivity(status).await;
            if rx.changed().await.is_err() {
                debug!("Connectivity channel closed");
                break;
            }
        }
    }

    /// Adds imported records with fresh ids. Returns what was added.
    pub async fn import(&mut self, products: Vec<Product>) -> Vec<Product> {
        let mut added = Vec::with_capacity(products.len());
        for product in products {
            added.push(self.add(product.to_new()).await);
        }
        info!("Imported {} products", added.len());
        added
    }
}

/// Remote list first, then local records flagged offline whose id the remote
/// list lacks.
///
/// Never drops a remote record and only de-duplicates by id.
#[must_use]
pub fn merge_remote(local: &[Product], remote: Vec<Product>) -> Vec<Product> {
    let remote_ids: HashSet<String> = remote.iter().map(|p| p.id.clone()).collect();
    let local_only = local
        .iter()
        .filter(|p| p.offline && !remote_ids.contains(&p.id))
        .cloned();
    let mut merged = remote;
    merged.extend(local_only);
    merged
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::remote::{DatabaseRemote, MockRemoteStore};
    use crate::storage::MemoryStore;
    use crate::test_utils::{
        database_reconciler, init_test_tracing, remote_failure, sample_product,
    };

    fn mock_reconciler(
        remote: MockRemoteStore,
        connectivity: Connectivity,
    ) -> OfflineReconciler<MemoryStore, MockRemoteStore> {
        OfflineReconciler::new(MemoryStore::new(), remote, connectivity)
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_offline_add_survives_reload() {
        init_test_tracing();
        let mut remote = MockRemoteStore::new();
        remote.expect_create_product().never();
        let mut reconciler = mock_reconciler(remote, Connectivity::Offline);

        let added = reconciler
            .add(NewProduct::new("Arroz", 2.0, 5.5).with_mercado("Atacadão"))
            .await;
        assert!(added.pending_sync);
        assert!(added.offline);
        assert_eq!(reconciler.products()[0], added);

        let mut reloaded = OfflineReconciler::new(
            reconciler.local().clone(),
            MockRemoteStore::new(),
            Connectivity::Offline,
        );
        assert_eq!(reloaded.load(), 1);
        assert_eq!(reloaded.products(), &[added]);
    }

    #[tokio::test]
    async fn test_add_keeps_amounts_consistent() -> crate::errors::Result<()> {
        let mut reconciler = database_reconciler(Connectivity::Offline).await?;
        let added = reconciler.add(NewProduct::new("Feijão", 3.0, 2.50)).await;

        let stored = reconciler.local().read_all()?;
        assert_eq!(stored[0].id, added.id);
        assert_eq!(stored[0].valor_total, 7.50);
        Ok(())
    }

    #[tokio::test]
    async fn test_online_add_replaces_local_id() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_create_product()
            .once()
            .returning(|data| Ok(Product::from_new("server-1".to_string(), data)));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);

        let added = reconciler.add(NewProduct::new("Café", 1.0, 18.9)).await;
        assert_eq!(added.id, "server-1");
        assert_eq!(ids(reconciler.products()), vec!["server-1"]);
        assert_eq!(reconciler.pending_count(), 0);
        assert_eq!(reconciler.local().read_all().unwrap(), vec![added]);
    }

    #[tokio::test]
    async fn test_online_add_failure_stays_pending() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_create_product()
            .once()
            .returning(|_| Err(remote_failure()));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);

        let added = reconciler.add(NewProduct::new("Leite", 12.0, 4.79)).await;
        assert!(added.pending_sync);
        assert_eq!(reconciler.get(&added.id), Some(&added));
        assert_eq!(reconciler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_update_offline_flags_pending() {
        let mut remote = MockRemoteStore::new();
        remote.expect_update_product().never();
        let mut reconciler = mock_reconciler(remote, Connectivity::Offline);
        reconciler.local().write_all(&[sample_product("p1", "Pão")]).unwrap();
        reconciler.load();

        let patch = ProductPatch {
            marca: Some("Padaria Central".to_string()),
            ..ProductPatch::default()
        };
        reconciler.update("p1", patch).await;

        let updated = reconciler.get("p1").unwrap();
        assert_eq!(updated.marca, "Padaria Central");
        assert!(updated.pending_sync && updated.offline);
    }

    #[tokio::test]
    async fn test_update_online_uses_server_copy() {
        let mut remote = MockRemoteStore::new();
        remote.expect_update_product().once().returning(|id, patch| {
            let mut product = sample_product(id, "Pão");
            product.apply_patch(&patch);
            product.valor_total = product.quantidade * product.valor_unitario;
            Ok(product)
        });
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        reconciler.local().write_all(&[sample_product("p1", "Pão")]).unwrap();
        reconciler.load();

        let patch = ProductPatch {
            quantidade: Some(4.0),
            ..ProductPatch::default()
        };
        reconciler.update("p1", patch).await;

        let updated = reconciler.get("p1").unwrap();
        assert_eq!(updated.quantidade, 4.0);
        assert_eq!(updated.valor_total, 4.0 * updated.valor_unitario);
        assert!(!updated.pending_sync);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let mut remote = MockRemoteStore::new();
        remote.expect_update_product().never();
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);

        reconciler.update("ghost", ProductPatch::default()).await;
        assert!(reconciler.products().is_empty());
        assert!(reconciler.local().raw().is_none());
    }

    #[tokio::test]
    async fn test_failed_remote_delete_is_compensated() {
        init_test_tracing();
        let mut remote = MockRemoteStore::new();
        remote
            .expect_delete_product()
            .once()
            .returning(|_| Err(remote_failure()));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        let original = sample_product("p1", "Azeite");
        reconciler
            .local()
            .write_all(&[original.clone(), sample_product("p2", "Sal")])
            .unwrap();
        reconciler.load();

        reconciler.remove("p1").await;

        assert_eq!(ids(reconciler.products()), vec!["p2", "p1"]);
        let restored = reconciler.get("p1").unwrap();
        assert_eq!(restored.to_new(), original.to_new());
        assert!(restored.pending_sync && restored.offline);
        assert_eq!(reconciler.local().read_all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_of_local_only_record_sticks() -> crate::errors::Result<()> {
        let mut reconciler = database_reconciler(Connectivity::Online).await?;
        reconciler
            .local()
            .write_all(&[sample_product("nunca-enviado", "Sal")])?;
        reconciler.load();

        reconciler.remove("nunca-enviado").await;
        assert!(reconciler.products().is_empty());
        assert!(reconciler.local().read_all()?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_offline_remove_is_local_only() {
        let mut remote = MockRemoteStore::new();
        remote.expect_delete_product().never();
        let mut reconciler = mock_reconciler(remote, Connectivity::Offline);
        reconciler.local().write_all(&[sample_product("p1", "Sal")]).unwrap();
        reconciler.load();

        reconciler.remove("p1").await;
        assert!(reconciler.products().is_empty());
        assert!(reconciler.local().read_all().unwrap().is_empty());
    }

    #[test]
    fn test_late_outcomes_apply_in_arrival_order() {
        let mut reconciler = mock_reconciler(MockRemoteStore::new(), Connectivity::Online);
        let (local, op) = reconciler.commit_add(NewProduct::new("Ovo", 12.0, 0.8));
        assert!(!local.pending_sync);
        assert!(op.is_some());

        let mut first = local.clone();
        first.mercado = "Feira".to_string();
        let mut second = local.clone();
        second.mercado = "Mercadinho".to_string();

        reconciler.apply(SyncOutcome::Updated {
            id: local.id.clone(),
            product: first,
        });
        reconciler.apply(SyncOutcome::Updated {
            id: local.id.clone(),
            product: second,
        });
        assert_eq!(reconciler.get(&local.id).unwrap().mercado, "Mercadinho");
    }

    #[test]
    fn test_created_outcome_after_removal_is_dropped() {
        let mut reconciler = mock_reconciler(MockRemoteStore::new(), Connectivity::Online);
        let (local, _) = reconciler.commit_add(NewProduct::new("Ovo", 1.0, 1.0));
        reconciler.commit_remove(&local.id);

        reconciler.apply(SyncOutcome::Created {
            local_id: local.id.clone(),
            product: sample_product("srv", "Ovo"),
        });
        assert!(reconciler.products().is_empty());
    }

    #[tokio::test]
    async fn test_search_offline_matches_locally() {
        let mut remote = MockRemoteStore::new();
        remote.expect_search_products().never();
        let mut reconciler = mock_reconciler(remote, Connectivity::Offline);
        reconciler
            .local()
            .write_all(&[sample_product("a", "Arroz"), sample_product("f", "Feijão")])
            .unwrap();
        reconciler.load();

        let found = reconciler.search("arr").await;
        assert_eq!(ids(&found), vec!["a"]);
    }

    #[tokio::test]
    async fn test_search_online_returns_remote_result() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_search_products()
            .once()
            .returning(|_| Ok(vec![sample_product("remote", "Arroz Parboilizado")]));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        reconciler.local().write_all(&[sample_product("a", "Arroz")]).unwrap();
        reconciler.load();

        assert_eq!(ids(&reconciler.search("arroz").await), vec!["remote"]);
    }

    #[tokio::test]
    async fn test_search_falls_back_on_remote_failure() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_search_products()
            .once()
            .returning(|_| Err(remote_failure()));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        let mut branded = sample_product("b", "Macarrão");
        branded.marca = "Renata".to_string();
        reconciler.local().write_all(&[branded]).unwrap();
        reconciler.load();

        assert_eq!(ids(&reconciler.search("RENA").await), vec!["b"]);
    }

    #[tokio::test]
    async fn test_sync_pending_is_idempotent() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_create_product()
            .times(2)
            .returning(|data| Ok(Product::from_new(format!("srv-{}", data.nome), data)));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        reconciler
            .local()
            .write_all(&[
                sample_product("l1", "Arroz").flagged(true),
                sample_product("l2", "Feijão").flagged(true),
                sample_product("s1", "Sal"),
            ])
            .unwrap();
        reconciler.load();

        let first = reconciler.sync_pending().await;
        assert_eq!(
            first,
            SyncReport {
                attempted: 2,
                synced: 2,
                failed: 0
            }
        );
        assert_eq!(ids(reconciler.products()), vec!["srv-Arroz", "srv-Feijão", "s1"]);

        let second = reconciler.sync_pending().await;
        assert_eq!(second, SyncReport::default());
    }

    #[tokio::test]
    async fn test_sync_pending_failure_keeps_flag() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_create_product()
            .times(2)
            .returning(|_| Err(remote_failure()));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        reconciler
            .local()
            .write_all(&[sample_product("l1", "Arroz").flagged(true)])
            .unwrap();
        reconciler.load();

        let report = reconciler.sync_pending().await;
        assert_eq!(report.failed, 1);
        assert_eq!(reconciler.pending_count(), 1);

        let retry = reconciler.sync_pending().await;
        assert_eq!(retry.attempted, 1);
        assert_eq!(reconciler.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_sync_pending_offline_makes_no_calls() {
        let mut remote = MockRemoteStore::new();
        remote.expect_create_product().never();
        let mut reconciler = mock_reconciler(remote, Connectivity::Offline);
        reconciler.add(NewProduct::new("Arroz", 1.0, 1.0)).await;

        assert_eq!(reconciler.sync_pending().await, SyncReport::default());
        assert_eq!(reconciler.pending_count(), 1);
    }

    #[test]
    fn test_merge_rule() {
        let a = sample_product("A", "Arroz");
        let b = sample_product("B", "Batata");
        let c = sample_product("C", "Cebola").flagged(true);

        let merged = merge_remote(&[a.clone(), c], vec![a, b]);
        assert_eq!(ids(&merged), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_merge_drops_confirmed_local_only_records() {
        let stale = sample_product("old", "Vinagre");
        let merged = merge_remote(&[stale], vec![sample_product("A", "Arroz")]);
        assert_eq!(ids(&merged), vec!["A"]);
    }

    #[tokio::test]
    async fn test_refetch_failure_leaves_list() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_list_products()
            .once()
            .returning(|| Err(remote_failure()));
        let mut reconciler = mock_reconciler(remote, Connectivity::Online);
        reconciler.local().write_all(&[sample_product("p1", "Sal")]).unwrap();
        reconciler.load();

        assert!(!reconciler.refetch().await);
        assert_eq!(ids(reconciler.products()), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_reconnect_syncs_then_refetches() -> crate::errors::Result<()> {
        init_test_tracing();
        let mut reconciler = database_reconciler(Connectivity::Offline).await?;
        let server = DatabaseRemote::new(reconciler.remote().connection().clone());
        let existing = server
            .create_product(NewProduct::new("Açúcar", 1.0, 4.5))
            .await?;

        let offline = reconciler.add(NewProduct::new("Farinha", 2.0, 6.0)).await;
        assert!(offline.pending_sync);
        assert!(reconciler.set_connectivity(Connectivity::Offline).await.is_none());

        let report = reconciler.set_connectivity(Connectivity::Online).await;
        assert_eq!(report.map(|r| r.synced), Some(1));
        assert_eq!(reconciler.pending_count(), 0);
        assert_eq!(reconciler.products().len(), 2);
        assert!(reconciler.get(&existing.id).is_some());
        assert!(reconciler.get(&offline.id).is_none());
        assert_eq!(server.list_products().await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_follow_reacts_to_monitor() -> crate::errors::Result<()> {
        let mut reconciler = database_reconciler(Connectivity::Offline).await?;
        reconciler.add(NewProduct::new("Milho", 1.0, 3.0)).await;

        let monitor = crate::sync::NetworkMonitor::new(Connectivity::Offline);
        let rx = monitor.subscribe();
        monitor.report(Connectivity::Online);
        drop(monitor);

        reconciler.follow(rx).await;
        assert!(reconciler.is_online());
        assert_eq!(reconciler.pending_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_local_store_loads_empty() {
        let mut reconciler = OfflineReconciler::new(
            MemoryStore::with_raw("{not json"),
            MockRemoteStore::new(),
            Connectivity::Offline,
        );
        assert_eq!(reconciler.load(), 0);
        assert!(reconciler.products().is_empty());
    }

    #[tokio::test]
    async fn test_import_assigns_fresh_ids() -> crate::errors::Result<()> {
        let mut reconciler = database_reconciler(Connectivity::Online).await?;
        let added = reconciler
            .import(vec![sample_product("dup", "Arroz"), sample_product("dup", "Feijão")])
            .await;

        assert_eq!(added.len(), 2);
        assert_ne!(added[0].id, added[1].id);
        assert!(added.iter().all(|p| p.id != "dup" && !p.pending_sync));
        assert_eq!(ids(reconciler.products()), vec![added[1].id.as_str(), added[0].id.as_str()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_imported_zero_quantity_record_syncs() -> crate::errors::Result<()> {
        let mut brinde = sample_product("b1", "Brinde");
        brinde.quantidade = 0.0;
        brinde.valor_unitario = 0.0;
        brinde.valor_total = 0.0;

        let mut reconciler = database_reconciler(Connectivity::Offline).await?;
        reconciler.import(vec![brinde]).await;
        assert_eq!(reconciler.pending_count(), 1);

        let report = reconciler.set_connectivity(Connectivity::Online).await.unwrap();
        assert_eq!((report.synced, report.failed), (1, 0));
        assert_eq!(reconciler.pending_count(), 0);
        assert_eq!(reconciler.products().len(), 1);
        assert_eq!(reconciler.products()[0].quantidade, 0.0);
        Ok(())
    }
}
