mod line_item;
mod order_number;
mod order_record;

pub use line_item::{LineItem, RawLineItem, decimal_or_zero};
pub use order_number::{generate_order_number, order_number_for};
pub use order_record::{OrderDraft, OrderRecord, ValidationError};
