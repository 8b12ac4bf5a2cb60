//! Product business logic for the embedded remote store.
//!
//! These functions implement the server half of the CRUD contract: ids are
//! assigned here, `valor_total` is recomputed from quantity and unit price on
//! every create and on updates that touch either, and listings come back
//! newest purchase first.

use crate::{
    entities::{ProductEntity, product},
    errors::{Error, Result},
    models::{NewProduct, Product, ProductPatch},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use uuid::Uuid;

/// Lists every product, newest purchase first, optionally filtered by a
/// case-insensitive name substring.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(db: &DatabaseConnection, nome: Option<&str>) -> Result<Vec<Product>> {
    let products = all_newest_first(db).await?;
    let Some(needle) = nome.map(|n| n.trim().to_lowercase()).filter(|n| !n.is_empty()) else {
        return Ok(products);
    };
    Ok(products
        .into_iter()
        .filter(|p| p.nome.to_lowercase().contains(&needle))
        .collect())
}

// SQLite `LIKE` only folds ASCII, so text matching happens on the Rust side.
async fn all_newest_first(db: &DatabaseConnection) -> Result<Vec<Product>> {
    let models = ProductEntity::find()
        .order_by_desc(product::Column::DataCompra)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Product::from).collect())
}

/// Retrieves a product by id.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn get_product(db: &DatabaseConnection, id: &str) -> Result<Option<Product>> {
    Ok(ProductEntity::find_by_id(id.to_string())
        .one(db)
        .await?
        .map(Product::from))
}

/// Inserts a product under a fresh id, recomputing its total.
///
/// Stores whatever it is given; form input is checked by the caller.
///
/// # Errors
/// Returns an error if the database insert operation fails.
pub async fn create_product(db: &DatabaseConnection, data: NewProduct) -> Result<Product> {
    let model = product::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        quantidade: Set(data.quantidade),
        unidade: Set(data.unidade),
        nome: Set(data.nome.trim().to_string()),
        marca: Set(data.marca),
        valor_unitario: Set(data.valor_unitario),
        valor_total: Set(data.quantidade * data.valor_unitario),
        data_compra: Set(data.data_compra.naive_utc()),
        mercado: Set(data.mercado),
    };
    Ok(model.insert(db).await?.into())
}

/// Applies a partial update. When quantity or unit price changes, the total
/// is recomputed from the merged values; otherwise a supplied total is kept.
///
/// # Errors
/// Returns an error if the product does not exist or the update fails.
pub async fn update_product(
    db: &DatabaseConnection,
    id: &str,
    patch: ProductPatch,
) -> Result<Product> {
    let existing = ProductEntity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound { id: id.to_string() })?;

    let quantidade = patch.quantidade.unwrap_or(existing.quantidade);
    let valor_unitario = patch.valor_unitario.unwrap_or(existing.valor_unitario);
    let recompute = patch.touches_amounts();

    let mut active: product::ActiveModel = existing.into();
    if let Some(nome) = patch.nome {
        active.nome = Set(nome.trim().to_string());
    }
    if let Some(marca) = patch.marca {
        active.marca = Set(marca);
    }
    if let Some(unidade) = patch.unidade {
        active.unidade = Set(unidade);
    }
    if let Some(mercado) = patch.mercado {
        active.mercado = Set(mercado);
    }
    if let Some(data_compra) = patch.data_compra {
        active.data_compra = Set(data_compra.naive_utc());
    }
    active.quantidade = Set(quantidade);
    active.valor_unitario = Set(valor_unitario);
    if recompute {
        active.valor_total = Set(quantidade * valor_unitario);
    } else if let Some(valor_total) = patch.valor_total {
        active.valor_total = Set(valor_total);
    }

    Ok(active.update(db).await?.into())
}

/// Deletes a product and returns the removed record.
///
/// # Errors
/// Returns an error if the product does not exist or the delete fails.
pub async fn delete_product(db: &DatabaseConnection, id: &str) -> Result<Product> {
    let existing = ProductEntity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound { id: id.to_string() })?;

    ProductEntity::delete_by_id(id.to_string()).exec(db).await?;
    Ok(existing.into())
}

/// Case-insensitive name/brand search, newest purchase first. A blank query
/// matches nothing.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn search_products(db: &DatabaseConnection, query: &str) -> Result<Vec<Product>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    Ok(all_newest_first(db)
        .await?
        .into_iter()
        .filter(|p| p.matches_lowercase(&needle))
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_product_stores_unchecked_amounts() -> Result<()> {
        let db = setup_test_db().await?;

        let created = create_product(&db, NewProduct::new("Brinde", 0.0, 0.0)).await?;
        assert_eq!(created.quantidade, 0.0);
        assert_eq!(created.valor_total, 0.0);
        assert_eq!(get_product(&db, &created.id).await?.unwrap(), created);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_recomputes_total() -> Result<()> {
        let db = setup_test_db().await?;

        let mut data = NewProduct::new("  Arroz  ", 3.0, 2.50);
        data.valor_total = 99.0;
        let created = create_product(&db, data).await?;

        assert_eq!(created.nome, "Arroz");
        assert_eq!(created.valor_total, 7.50);
        assert!(!created.id.is_empty());
        assert!(!created.pending_sync);

        let stored = get_product(&db, &created.id).await?.unwrap();
        assert_eq!(stored, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "Sal").await?;
        let b = create_test_product(&db, "Sal").await?;
        assert_ne!(a.id, b.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        create_dated_product(&db, "Velho", "2023-01-10").await?;
        create_dated_product(&db, "Novo", "2024-08-01").await?;
        create_dated_product(&db, "Meio", "2024-02-15").await?;

        let names: Vec<String> = list_products(&db, None)
            .await?
            .into_iter()
            .map(|p| p.nome)
            .collect();
        assert_eq!(names, vec!["Novo", "Meio", "Velho"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_name_filter() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_product(&db, "Arroz").await?;
        create_test_product(&db, "Feijao").await?;

        let filtered = list_products(&db, Some("arr")).await?;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].nome, "Arroz");

        assert_eq!(list_products(&db, Some("  ")).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_recomputes_total_when_amounts_change() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_product(&db, NewProduct::new("Leite", 2.0, 4.0)).await?;

        let patch = ProductPatch {
            quantidade: Some(6.0),
            ..ProductPatch::default()
        };
        let updated = update_product(&db, &created.id, patch).await?;
        assert_eq!(updated.quantidade, 6.0);
        assert_eq!(updated.valor_total, 24.0);

        let patch = ProductPatch {
            valor_total: Some(30.0),
            mercado: Some("Atacadão".to_string()),
            ..ProductPatch::default()
        };
        let updated = update_product(&db, &created.id, patch).await?;
        assert_eq!(updated.valor_total, 30.0);
        assert_eq!(updated.valor_unitario, 4.0);
        assert_eq!(updated.mercado, "Atacadão");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_product(&db, "nope", ProductPatch::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ProductNotFound { id } if id == "nope"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_product() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_product(&db, "Café").await?;

        let deleted = delete_product(&db, &created.id).await?;
        assert_eq!(deleted, created);
        assert!(get_product(&db, &created.id).await?.is_none());

        let again = delete_product(&db, &created.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::ProductNotFound { id: _ }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_search_name_or_brand_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        create_product(&db, NewProduct::new("Arroz", 1.0, 5.0).with_marca("Camil")).await?;
        create_product(&db, NewProduct::new("Feijao", 1.0, 8.0).with_marca("Camil")).await?;
        create_product(&db, NewProduct::new("Acucar", 1.0, 4.0).with_marca("Uniao")).await?;

        let by_name = search_products(&db, "ARROZ").await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].nome, "Arroz");

        let by_brand = search_products(&db, "camil").await?;
        assert_eq!(by_brand.len(), 2);

        assert!(search_products(&db, "   ").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_search_folds_accented_letters() -> Result<()> {
        let db = setup_test_db().await?;
        create_product(&db, NewProduct::new("AÇÚCAR", 1.0, 4.0).with_marca("União")).await?;
        create_product(&db, NewProduct::new("Feijão", 1.0, 8.0).with_marca("Camil")).await?;

        let found = search_products(&db, "açúcar").await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].nome, "AÇÚCAR");

        assert_eq!(search_products(&db, "FEIJÃO").await?[0].nome, "Feijão");
        assert_eq!(search_products(&db, "UNIÃO").await?.len(), 1);

        let listed = list_products(&db, Some("feijão")).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].nome, "Feijão");
        Ok(())
    }
}
