pub mod calculations;
pub mod models;
pub mod store;

pub use calculations::{OrderTotals, RoundingPolicy, item_subtotal, order_totals};
pub use models::*;
pub use store::repository::{OrderStore, StoreError};
