//! Database configuration for the embedded remote store.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::ProductEntity;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default on-disk database; `mode=rwc` creates the file on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/produtos.sqlite?mode=rwc";

/// The configured database URL (which already carries any `DATABASE_URL`
/// override), or [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    configured.map_or_else(|| DEFAULT_DATABASE_URL.to_string(), str::to_string)
}

/// Establishes a connection and makes sure the tables exist.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates the `produtos` table if it is not there yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(ProductEntity);
    product_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;

    Ok(())
}
