//! Server-side product rules behind the remote CRUD contract.

/// Product CRUD over the embedded `SeaORM` table
pub mod product;
