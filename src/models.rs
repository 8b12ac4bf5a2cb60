//! Product records as they travel between the local store, the remote store and
//! exported files.
//!
//! Field names follow the JSON wire format (`valorUnitario`, `dataCompra`, ...)
//! through serde renames. The two reconciler-only flags (`_offline`,
//! `_pendingSync`) are omitted from the JSON when false, so an export with the
//! flags cleared has the plain remote shape.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single purchase record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Opaque unique id; generated client-side, may be replaced by the server
    pub id: String,
    /// Product name
    pub nome: String,
    /// Brand, empty when unknown
    #[serde(default)]
    pub marca: String,
    /// Quantity bought
    pub quantidade: f64,
    /// Free-text unit ("un", "kg", ...)
    #[serde(default)]
    pub unidade: String,
    /// Price per unit
    pub valor_unitario: f64,
    /// Price paid for the whole quantity
    pub valor_total: f64,
    /// Purchase date
    #[serde(with = "purchase_date")]
    pub data_compra: DateTime<Utc>,
    /// Market where it was bought, empty when unknown
    #[serde(default)]
    pub mercado: String,
    /// Created or modified while disconnected
    #[serde(rename = "_offline", default, skip_serializing_if = "is_false")]
    pub offline: bool,
    /// Not yet confirmed by the remote store
    #[serde(rename = "_pendingSync", default, skip_serializing_if = "is_false")]
    pub pending_sync: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

impl Product {
    /// Builds a record from creation data and an id. Flags start cleared.
    #[must_use]
    pub fn from_new(id: String, data: NewProduct) -> Self {
        Self {
            id,
            nome: data.nome,
            marca: data.marca,
            quantidade: data.quantidade,
            unidade: data.unidade,
            valor_unitario: data.valor_unitario,
            valor_total: data.valor_total,
            data_compra: data.data_compra,
            mercado: data.mercado,
            offline: false,
            pending_sync: false,
        }
    }

    /// The non-id, non-flag fields, as sent in a create request.
    #[must_use]
    pub fn to_new(&self) -> NewProduct {
        NewProduct {
            nome: self.nome.clone(),
            marca: self.marca.clone(),
            quantidade: self.quantidade,
            unidade: self.unidade.clone(),
            valor_unitario: self.valor_unitario,
            valor_total: self.valor_total,
            data_compra: self.data_compra,
            mercado: self.mercado.clone(),
        }
    }

    /// Overwrites every field present in `patch`. Nothing is recomputed.
    pub fn apply_patch(&mut self, patch: &ProductPatch) {
        if let Some(nome) = &patch.nome {
            self.nome.clone_from(nome);
        }
        if let Some(marca) = &patch.marca {
            self.marca.clone_from(marca);
        }
        if let Some(quantidade) = patch.quantidade {
            self.quantidade = quantidade;
        }
        if let Some(unidade) = &patch.unidade {
            self.unidade.clone_from(unidade);
        }
        if let Some(valor_unitario) = patch.valor_unitario {
            self.valor_unitario = valor_unitario;
        }
        if let Some(valor_total) = patch.valor_total {
            self.valor_total = valor_total;
        }
        if let Some(data_compra) = patch.data_compra {
            self.data_compra = data_compra;
        }
        if let Some(mercado) = &patch.mercado {
            self.mercado.clone_from(mercado);
        }
    }

    /// Sets both reconciler flags to `pending`.
    #[must_use]
    pub fn flagged(mut self, pending: bool) -> Self {
        self.offline = pending;
        self.pending_sync = pending;
        self
    }

    /// A copy with both reconciler flags cleared, as confirmed by the remote.
    #[must_use]
    pub fn confirmed(self) -> Self {
        self.flagged(false)
    }

    /// Case-insensitive substring match on name or brand.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.nome.to_lowercase().contains(needle) || self.marca.to_lowercase().contains(needle)
    }
}

/// Creation data: a product without id or reconciler flags.
///
/// `Default` gives the blank form row: one unit ("un"), zero prices, today's
/// date. The `set_*` amount handlers keep `valor_total` and `valor_unitario`
/// consistent with whichever was edited last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    /// Quantity bought
    pub quantidade: f64,
    /// Free-text unit
    #[serde(default)]
    pub unidade: String,
    /// Product name
    pub nome: String,
    /// Brand
    #[serde(default)]
    pub marca: String,
    /// Price per unit
    pub valor_unitario: f64,
    /// Price for the whole quantity
    pub valor_total: f64,
    /// Purchase date
    #[serde(with = "purchase_date")]
    pub data_compra: DateTime<Utc>,
    /// Market
    #[serde(default)]
    pub mercado: String,
}

impl Default for NewProduct {
    fn default() -> Self {
        Self {
            quantidade: 1.0,
            unidade: "un".to_string(),
            nome: String::new(),
            marca: String::new(),
            valor_unitario: 0.0,
            valor_total: 0.0,
            data_compra: today(),
            mercado: String::new(),
        }
    }
}

impl NewProduct {
    /// A consistent record: `valor_total = quantidade × valor_unitario`.
    #[must_use]
    pub fn new(nome: impl Into<String>, quantidade: f64, valor_unitario: f64) -> Self {
        let mut product = Self {
            nome: nome.into(),
            ..Self::default()
        };
        product.set_quantidade(quantidade);
        product.set_valor_unitario(valor_unitario);
        product
    }

    /// Sets the brand.
    #[must_use]
    pub fn with_marca(mut self, marca: impl Into<String>) -> Self {
        self.marca = marca.into();
        self
    }

    /// Sets the market.
    #[must_use]
    pub fn with_mercado(mut self, mercado: impl Into<String>) -> Self {
        self.mercado = mercado.into();
        self
    }

    /// Sets the unit.
    #[must_use]
    pub fn with_unidade(mut self, unidade: impl Into<String>) -> Self {
        self.unidade = unidade.into();
        self
    }

    /// Sets the purchase date.
    #[must_use]
    pub fn with_data_compra(mut self, data_compra: DateTime<Utc>) -> Self {
        self.data_compra = data_compra;
        self
    }

    /// Quantity edit: the total follows the unit price.
    pub fn set_quantidade(&mut self, quantidade: f64) {
        self.quantidade = quantidade;
        self.valor_total = quantidade * self.valor_unitario;
    }

    /// Unit price edit: the total follows.
    pub fn set_valor_unitario(&mut self, valor_unitario: f64) {
        self.valor_unitario = valor_unitario;
        self.valor_total = self.quantidade * valor_unitario;
    }

    /// Total edit: the unit price is back-derived, or zero for a zero quantity.
    pub fn set_valor_total(&mut self, valor_total: f64) {
        self.valor_total = valor_total;
        self.valor_unitario = if self.quantidade == 0.0 {
            0.0
        } else {
            valor_total / self.quantidade
        };
    }

    /// Field checks applied before a record is accepted from user input.
    ///
    /// # Errors
    /// - `InvalidProduct` if the name is empty or whitespace-only
    /// - `InvalidAmount` if the quantity is not positive, or a price is
    ///   negative or not finite
    pub fn validate(&self) -> Result<()> {
        if self.nome.trim().is_empty() {
            return Err(Error::InvalidProduct {
                message: "Product name cannot be empty".to_string(),
            });
        }
        if !self.quantidade.is_finite() || self.quantidade <= 0.0 {
            return Err(Error::InvalidAmount {
                amount: self.quantidade,
            });
        }
        for amount in [self.valor_unitario, self.valor_total] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
        }
        Ok(())
    }
}

/// Partial update: only the fields that are `Some` are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    /// New brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    /// New quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantidade: Option<f64>,
    /// New unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    /// New unit price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_unitario: Option<f64>,
    /// New total price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor_total: Option<f64>,
    /// New purchase date
    #[serde(
        default,
        with = "purchase_date::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub data_compra: Option<DateTime<Utc>>,
    /// New market
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mercado: Option<String>,
}

impl ProductPatch {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nome.is_none()
            && self.marca.is_none()
            && self.quantidade.is_none()
            && self.unidade.is_none()
            && self.valor_unitario.is_none()
            && self.valor_total.is_none()
            && self.data_compra.is_none()
            && self.mercado.is_none()
    }

    /// True when the server has to recompute the total.
    #[must_use]
    pub const fn touches_amounts(&self) -> bool {
        self.quantidade.is_some() || self.valor_unitario.is_some()
    }
}

/// Serde codec for purchase dates.
///
/// Reads a bare `YYYY-MM-DD` (as typed into a form), a naive
/// `YYYY-MM-DDTHH:MM:SS`, or RFC 3339; writes RFC 3339 with milliseconds.
pub mod purchase_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Midnight UTC of `date`.
    #[must_use]
    pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
        date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Parses any accepted representation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(start_of_day)
    }

    /// Canonical text form.
    #[must_use]
    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    #[allow(missing_docs)]
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    #[allow(missing_docs)]
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
    }

    /// Same codec for optional dates.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(missing_docs, clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match value {
                Some(date) => serializer.serialize_str(&super::format(date)),
                None => serializer.serialize_none(),
            }
        }

        #[allow(missing_docs)]
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    super::parse(&raw)
                        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
                })
                .transpose()
        }
    }
}

/// Latest purchase date in a list, used as the "version" of a dataset.
#[must_use]
pub fn latest_purchase(products: &[Product]) -> Option<NaiveDate> {
    products
        .iter()
        .map(|p| p.data_compra.date_naive())
        .max()
}

/// Today's date at midnight UTC.
#[must_use]
pub fn today() -> DateTime<Utc> {
    purchase_date::start_of_day(Utc::now().date_naive())
}
