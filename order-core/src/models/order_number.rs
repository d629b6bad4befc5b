use chrono::{Datelike, Local, NaiveDateTime, Timelike};

/// Builds a display order number of the form `PREFIX-YYYYMMDD-HMM`.
///
/// The trailing sequence is the hour (unpadded) followed by the zero-padded
/// minute, which keeps numbers unique enough for a single operator while
/// staying readable. Order numbers are display identifiers only — uniqueness
/// is guaranteed by the record id, not by this string.
pub fn order_number_for(
    prefix: &str,
    at: NaiveDateTime,
) -> String {
    format!(
        "{prefix}-{:04}{:02}{:02}-{}{:02}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
    )
}

/// [`order_number_for`] against the local clock.
pub fn generate_order_number(prefix: &str) -> String {
    order_number_for(prefix, Local::now().naive_local())
}
