use super::{LocalStore, decode, encode};
use crate::errors::{Error, Result};
use crate::models::Product;
use std::sync::{Arc, Mutex};

/// In-process slot holding the serialized list.
///
/// Clones share the slot, so a second reconciler built over a clone sees what
/// the first one wrote, the same way a page reload sees local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with raw content, used to simulate corrupted storage.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    /// The raw serialized content, if anything was written.
    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    fn poisoned() -> Error {
        Error::Io(std::io::Error::other("memory store lock poisoned"))
    }
}

impl LocalStore for MemoryStore {
    fn read_all(&self) -> Result<Vec<Product>> {
        let slot = self.slot.lock().map_err(|_| Self::poisoned())?;
        slot.as_deref().map_or_else(|| Ok(Vec::new()), decode)
    }

    fn write_all(&self, products: &[Product]) -> Result<()> {
        let encoded = encode(products)?;
        *self.slot.lock().map_err(|_| Self::poisoned())? = Some(encoded);
        Ok(())
    }
}
