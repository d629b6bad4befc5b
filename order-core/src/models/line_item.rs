use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lenient numeric coercion applied to every form-derived number.
///
/// Blank, unparseable or negative input becomes zero. This is deliberate:
/// the system never rejects a malformed quantity or price, it degrades to 0
/// so totals stay computable on every keystroke. Quantities and prices are
/// non-negative amounts, so a stray minus sign is treated the same as any
/// other bad input.
pub fn decimal_or_zero(raw: &str) -> Decimal {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|value| !value.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

/// One row of an order: a project/product description, quantity, unit and
/// unit price.
///
/// The row subtotal is derived, never stored — persisted records from older
/// exports may carry a `subtotal` field, which is ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub project_name: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub quantity: Decimal,

    #[serde(default)]
    pub unit: String,

    #[serde(default)]
    pub price: Decimal,
}

impl LineItem {
    /// `quantity * price`, exact.
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.price
    }

    /// True when the row carries no information at all: every text field is
    /// blank and both numbers are zero. Empty rows are excluded from totals
    /// and from rendering.
    pub fn is_empty(&self) -> bool {
        self.project_name.trim().is_empty()
            && self.name.trim().is_empty()
            && self.unit.trim().is_empty()
            && self.quantity.is_zero()
            && self.price.is_zero()
    }
}

/// A line-item row as it comes off a form: five raw strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub price: String,
}

impl RawLineItem {
    /// True when every field is blank after trimming. Blank rows are dropped
    /// during normalization.
    pub fn is_blank(&self) -> bool {
        [
            &self.project_name,
            &self.name,
            &self.quantity,
            &self.unit,
            &self.price,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Trim the text fields and coerce the numeric ones with the
    /// invalid-becomes-zero policy.
    pub fn normalize(&self) -> LineItem {
        LineItem {
            project_name: self.project_name.trim().to_string(),
            name: self.name.trim().to_string(),
            quantity: decimal_or_zero(&self.quantity),
            unit: self.unit.trim().to_string(),
            price: decimal_or_zero(&self.price),
        }
    }
}
