//! Product entity - one purchase record as stored by the embedded remote.
//!
//! Ids are server-assigned UUID strings. Reconciler flags never reach this
//! table; they only exist in the local store.

use crate::models::Product;
use sea_orm::entity::prelude::*;

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "produtos")]
pub struct Model {
    /// Server-assigned identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Quantity bought
    pub quantidade: f64,
    /// Free-text unit
    pub unidade: String,
    /// Product name
    pub nome: String,
    /// Brand
    pub marca: String,
    /// Price per unit
    pub valor_unitario: f64,
    /// Price for the whole quantity, recomputed on every amount change
    pub valor_total: f64,
    /// Purchase date (UTC, stored naive)
    pub data_compra: DateTime,
    /// Market
    pub mercado: String,
}

/// Products have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            nome: model.nome,
            marca: model.marca,
            quantidade: model.quantidade,
            unidade: model.unidade,
            valor_unitario: model.valor_unitario,
            valor_total: model.valor_total,
            data_compra: model.data_compra.and_utc(),
            mercado: model.mercado,
            offline: false,
            pending_sync: false,
        }
    }
}
