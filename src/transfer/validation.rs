//! Schema-checked parsing of imported product files.

use crate::models::{Product, purchase_date};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// First problem found in an imported document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// The text is not JSON at all.
    #[error("File is not valid JSON: {message}")]
    NotJson {
        /// Parser message
        message: String,
    },

    /// The document is JSON but not an array.
    #[error("File does not contain a list of products")]
    NotAnArray,

    /// An array element is not an object.
    #[error("Item {index} is not an object")]
    NotAnObject {
        /// Position in the array
        index: usize,
    },

    /// A required field is absent.
    #[error("Item {index} is missing `{field}`")]
    MissingField {
        /// Position in the array
        index: usize,
        /// JSON field name
        field: &'static str,
    },

    /// A field has the wrong JSON type.
    #[error("Item {index}: `{field}` must be a {expected}")]
    WrongType {
        /// Position in the array
        index: usize,
        /// JSON field name
        field: &'static str,
        /// Expected JSON type
        expected: &'static str,
    },

    /// `dataCompra` is a string but not a date.
    #[error("Item {index}: `dataCompra` is not a date: {value}")]
    InvalidDate {
        /// Position in the array
        index: usize,
        /// The rejected text
        value: String,
    },
}

/// Parses an exported product list.
///
/// Every item is checked before anything is returned, so a bad item rejects
/// the whole file. Items without an `id` (or with an empty one) get a fresh
/// UUID. Reconciler flags in the file are ignored.
///
/// # Errors
/// Returns the first [`ImportError`] found, in document order.
pub fn parse_import(raw: &str) -> Result<Vec<Product>, ImportError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ImportError::NotJson {
        message: e.to_string(),
    })?;
    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| parse_item(index, item))
        .collect()
}

fn parse_item(index: usize, item: &Value) -> Result<Product, ImportError> {
    let fields = item
        .as_object()
        .ok_or(ImportError::NotAnObject { index })?;
    let field = Fields { index, fields };

    let id = match field.optional_str("id")? {
        Some(id) if !id.is_empty() => id,
        _ => Uuid::new_v4().to_string(),
    };
    let nome = field.required_str("nome")?;
    let marca = field.optional_str("marca")?.unwrap_or_default();
    let quantidade = field.required_number("quantidade")?;
    let unidade = field.optional_str("unidade")?.unwrap_or_default();
    let valor_unitario = field.required_number("valorUnitario")?;
    let valor_total = field.required_number("valorTotal")?;
    let raw_date = field.required_str("dataCompra")?;
    let data_compra = purchase_date::parse(&raw_date).ok_or(ImportError::InvalidDate {
        index,
        value: raw_date,
    })?;
    let mercado = field.optional_str("mercado")?.unwrap_or_default();

    Ok(Product {
        id,
        nome,
        marca,
        quantidade,
        unidade,
        valor_unitario,
        valor_total,
        data_compra,
        mercado,
        offline: false,
        pending_sync: false,
    })
}

struct Fields<'a> {
    index: usize,
    fields: &'a Map<String, Value>,
}

impl Fields<'_> {
    const fn wrong_type(&self, field: &'static str, expected: &'static str) -> ImportError {
        ImportError::WrongType {
            index: self.index,
            field,
            expected,
        }
    }

    const fn missing(&self, field: &'static str) -> ImportError {
        ImportError::MissingField {
            index: self.index,
            field,
        }
    }

    /// Absent and `null` both read as `None`.
    fn optional_str(&self, field: &'static str) -> Result<Option<String>, ImportError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.wrong_type(field, "string")),
        }
    }

    fn required_str(&self, field: &'static str) -> Result<String, ImportError> {
        self.optional_str(field)?.ok_or_else(|| self.missing(field))
    }

    fn required_number(&self, field: &'static str) -> Result<f64, ImportError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(self.missing(field)),
            Some(value) => value.as_f64().ok_or_else(|| self.wrong_type(field, "number")),
        }
    }
}
