//! Line-item and order-total arithmetic.
//!
//! Totals are pure functions of their inputs: no rounding happens while
//! summing, only the tax amount passes through the configured
//! [`RoundingPolicy`]. The functions are cheap enough to rerun on every
//! keystroke, which is exactly how the form surface uses them.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::LineItem;

/// Strategy for converting a fractional tax amount to a whole currency unit.
///
/// The two deployed generations of the form disagreed — one rounded to
/// nearest, the other always rounded up — so the policy is explicit
/// configuration rather than a baked-in constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingPolicy {
    /// Round to the nearest whole unit, midpoints away from zero.
    #[default]
    Nearest,
    /// Always round up to the next whole unit.
    Ceiling,
}

impl RoundingPolicy {
    /// Applies the policy, yielding a whole currency amount.
    pub fn apply(
        self,
        value: Decimal,
    ) -> Decimal {
        match self {
            RoundingPolicy::Nearest => {
                value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            }
            RoundingPolicy::Ceiling => {
                value.round_dp_with_strategy(0, RoundingStrategy::ToPositiveInfinity)
            }
        }
    }
}

/// Subtotal for one row: `quantity * price`. Exact, never fails — inputs
/// have already been coerced through the invalid-becomes-zero policy.
pub fn item_subtotal(
    quantity: Decimal,
    price: Decimal,
) -> Decimal {
    quantity * price
}

/// Derived order-level amounts. Never persisted; recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    /// Exact sum of non-empty item subtotals.
    pub subtotal: Decimal,
    /// `policy(subtotal * tax_rate)`.
    pub tax: Decimal,
    /// `subtotal + tax`, always.
    pub total: Decimal,
}

/// Computes subtotal, tax and total for an order.
///
/// Empty items (see [`LineItem::is_empty`]) are excluded before summing, so
/// legacy records that persisted blank form rows total the same as clean
/// ones. The subtotal is an exact sum; only the tax is rounded.
pub fn order_totals(
    items: &[LineItem],
    tax_rate: Decimal,
    policy: RoundingPolicy,
) -> OrderTotals {
    let subtotal: Decimal = items
        .iter()
        .filter(|item| !item.is_empty())
        .map(LineItem::subtotal)
        .sum();

    let tax = policy.apply(subtotal * tax_rate);

    OrderTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}
