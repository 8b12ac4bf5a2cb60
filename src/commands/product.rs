//! Product commands: list, add, update, remove, search.

use super::format::{product_line, product_table};
use crate::errors::{Error, Result};
use crate::models::{NewProduct, Product, ProductPatch, purchase_date};
use crate::remote::RemoteStore;
use crate::storage::LocalStore;
use crate::sync::OfflineReconciler;
use chrono::{DateTime, Utc};
use clap::Args;
use tracing::info;

fn date_arg(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    purchase_date::parse(raw).ok_or_else(|| format!("'{raw}' is not a date (use YYYY-MM-DD)"))
}

/// Arguments of `list`.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Only records not yet confirmed by the remote store
    #[arg(long)]
    pub pending: bool,
}

/// Arguments of `add`.
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Product name
    pub nome: String,

    /// Quantity bought
    #[arg(short, long, default_value_t = 1.0)]
    pub quantidade: f64,

    /// Unit ("un", "kg", ...)
    #[arg(short, long, default_value = "un")]
    pub unidade: String,

    /// Price per unit
    #[arg(long)]
    pub valor_unitario: Option<f64>,

    /// Price for the whole quantity; the unit price is derived from it
    #[arg(long)]
    pub valor_total: Option<f64>,

    /// Brand
    #[arg(short, long, default_value = "")]
    pub marca: String,

    /// Market
    #[arg(long, default_value = "")]
    pub mercado: String,

    /// Purchase date (YYYY-MM-DD), today when omitted
    #[arg(short, long, value_parser = date_arg)]
    pub data: Option<DateTime<Utc>>,
}

impl AddArgs {
    /// Creation data, filled through the same edit handlers as the form.
    ///
    /// # Errors
    /// Returns the validation error of [`NewProduct::validate`].
    pub fn to_new_product(&self) -> Result<NewProduct> {
        let mut data = NewProduct::new(self.nome.trim(), self.quantidade, 0.0)
            .with_unidade(self.unidade.clone())
            .with_marca(self.marca.clone())
            .with_mercado(self.mercado.clone());
        if let Some(data_compra) = self.data {
            data = data.with_data_compra(data_compra);
        }
        if let Some(valor_unitario) = self.valor_unitario {
            data.set_valor_unitario(valor_unitario);
        }
        if let Some(valor_total) = self.valor_total {
            data.set_valor_total(valor_total);
        }
        data.validate()?;
        Ok(data)
    }
}

/// Arguments of `update`. Only the given fields change.
#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    /// Product id
    pub id: String,

    /// New name
    #[arg(long)]
    pub nome: Option<String>,

    /// New quantity
    #[arg(short, long)]
    pub quantidade: Option<f64>,

    /// New unit
    #[arg(short, long)]
    pub unidade: Option<String>,

    /// New unit price
    #[arg(long)]
    pub valor_unitario: Option<f64>,

    /// New total price
    #[arg(long)]
    pub valor_total: Option<f64>,

    /// New brand
    #[arg(short, long)]
    pub marca: Option<String>,

    /// New market
    #[arg(long)]
    pub mercado: Option<String>,

    /// New purchase date (YYYY-MM-DD)
    #[arg(short, long, value_parser = date_arg)]
    pub data: Option<DateTime<Utc>>,
}

impl UpdateArgs {
    /// Patch against `current`.
    ///
    /// Amount edits go through the form's edit handlers, so the patch carries
    /// a consistent quantity, unit price and total.
    ///
    /// # Errors
    /// Returns the validation error of the edited record.
    pub fn to_patch(&self, current: &Product) -> Result<ProductPatch> {
        let mut edited = current.to_new();
        if let Some(quantidade) = self.quantidade {
            edited.set_quantidade(quantidade);
        }
        if let Some(valor_unitario) = self.valor_unitario {
            edited.set_valor_unitario(valor_unitario);
        }
        if let Some(valor_total) = self.valor_total {
            edited.set_valor_total(valor_total);
        }
        if let Some(nome) = &self.nome {
            edited.nome = nome.trim().to_string();
        }
        edited.validate()?;

        let amounts_edited =
            self.quantidade.is_some() || self.valor_unitario.is_some() || self.valor_total.is_some();
        let amounts = |value: f64| amounts_edited.then_some(value);

        Ok(ProductPatch {
            nome: self.nome.as_ref().map(|_| edited.nome.clone()),
            marca: self.marca.clone(),
            quantidade: amounts(edited.quantidade),
            unidade: self.unidade.clone(),
            valor_unitario: amounts(edited.valor_unitario),
            valor_total: amounts(edited.valor_total),
            data_compra: self.data,
            mercado: self.mercado.clone(),
        })
    }
}

/// Arguments of `remove`.
#[derive(Debug, Clone, Args)]
pub struct RemoveArgs {
    /// Product id
    pub id: String,
}

/// Arguments of `search`.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Name or brand fragment, case-insensitive
    pub query: String,
}

fn status_line<L: LocalStore, R: RemoteStore>(reconciler: &OfflineReconciler<L, R>) -> String {
    format!(
        "{} produtos | {} pendentes | {}",
        reconciler.products().len(),
        reconciler.pending_count(),
        reconciler.connectivity()
    )
}

/// Lists the in-memory products.
pub fn list<L: LocalStore, R: RemoteStore>(
    reconciler: &OfflineReconciler<L, R>,
    args: &ListArgs,
) -> String {
    let shown: Vec<Product> = reconciler
        .products()
        .iter()
        .filter(|p| !args.pending || p.pending_sync)
        .cloned()
        .collect();
    format!("{}\n{}", product_table(&shown), status_line(reconciler))
}

/// Adds a product.
///
/// # Errors
/// Returns a validation error; remote failures only leave the record pending.
pub async fn add<L: LocalStore, R: RemoteStore>(
    reconciler: &mut OfflineReconciler<L, R>,
    args: &AddArgs,
) -> Result<String> {
    let data = args.to_new_product()?;
    info!("Adding product '{}'", data.nome);
    let added = reconciler.add(data).await;
    Ok(format!("Produto salvo:\n{}", product_line(&added)))
}

/// Updates a product.
///
/// # Errors
/// Returns `ProductNotFound` for an unknown id, or a validation error.
pub async fn update<L: LocalStore, R: RemoteStore>(
    reconciler: &mut OfflineReconciler<L, R>,
    args: &UpdateArgs,
) -> Result<String> {
    let current = reconciler
        .get(&args.id)
        .ok_or_else(|| Error::ProductNotFound {
            id: args.id.clone(),
        })?;
    let patch = args.to_patch(current)?;
    if patch.is_empty() {
        return Ok("Nada para atualizar.".to_string());
    }
    reconciler.update(&args.id, patch).await;
    let shown = reconciler
        .get(&args.id)
        .map_or_else(|| args.id.clone(), product_line);
    Ok(format!("Produto atualizado:\n{shown}"))
}

/// Removes a product.
///
/// # Errors
/// Returns `ProductNotFound` for an unknown id.
pub async fn remove<L: LocalStore, R: RemoteStore>(
    reconciler: &mut OfflineReconciler<L, R>,
    args: &RemoveArgs,
) -> Result<String> {
    if reconciler.get(&args.id).is_none() {
        return Err(Error::ProductNotFound {
            id: args.id.clone(),
        });
    }
    reconciler.remove(&args.id).await;
    if reconciler.get(&args.id).is_some() {
        return Ok(format!(
            "Falha ao excluir {} no servidor; mantido como pendente.",
            args.id
        ));
    }
    Ok(format!("Produto {} excluído.", args.id))
}

/// Searches by name or brand.
pub async fn search<L: LocalStore, R: RemoteStore>(
    reconciler: &OfflineReconciler<L, R>,
    args: &SearchArgs,
) -> String {
    product_table(&reconciler.search(&args.query).await)
}
