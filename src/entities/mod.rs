//! Entity module - `SeaORM` entity definitions for the embedded remote store.
//! The single table mirrors the remote CRUD contract's product record.

pub mod product;

pub use product::{Column as ProductColumn, Entity as ProductEntity, Model as ProductModel};
