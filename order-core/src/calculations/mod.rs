//! Order arithmetic: per-row subtotals and order-level totals with a
//! configurable tax rounding policy.

pub mod totals;

pub use totals::{OrderTotals, RoundingPolicy, item_subtotal, order_totals};
