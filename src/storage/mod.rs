//! Durable on-device storage of the product list.
//!
//! The store is a key-value slot holding the whole list as one JSON array,
//! reconciler flags included. Writes are full overwrites: last write wins and
//! nothing is merged.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::Result;
use crate::models::Product;

/// Key-value persisted list of products.
pub trait LocalStore {
    /// Reads the whole list. A missing key is an empty list; unparseable
    /// content is an error, which callers may treat as empty.
    ///
    /// # Errors
    /// Returns an error if the slot cannot be read or does not hold a product array.
    fn read_all(&self) -> Result<Vec<Product>>;

    /// Replaces the whole list.
    ///
    /// # Errors
    /// Returns an error if the slot cannot be written.
    fn write_all(&self, products: &[Product]) -> Result<()>;
}

fn decode(raw: &str) -> Result<Vec<Product>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(raw)?)
}

fn encode(products: &[Product]) -> Result<String> {
    Ok(serde_json::to_string(products)?)
}
