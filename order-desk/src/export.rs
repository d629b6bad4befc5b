//! Export of the (filtered) order list: pretty-printed JSON matching the
//! persisted record shape, or a CSV summary with computed totals.

use std::io::Write;

use thiserror::Error;

use order_core::calculations::RoundingPolicy;
use order_core::models::OrderRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error during export: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the records as a pretty-printed JSON array — the same shape the
/// store persists, so an export can be re-imported or diffed against it.
pub fn write_json<W: Write>(
    records: &[&OrderRecord],
    mut writer: W,
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes a one-row-per-order CSV summary. Totals are recomputed with the
/// given rounding policy; they are never read from storage.
pub fn write_csv<W: Write>(
    records: &[&OrderRecord],
    policy: RoundingPolicy,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "orderNumber",
        "orderDate",
        "supplierName",
        "staffMember",
        "subtotal",
        "tax",
        "total",
    ])?;

    for record in records {
        let totals = record.totals(policy);
        csv.write_record([
            record.id.as_str(),
            record.order_number.as_str(),
            record.order_date.as_str(),
            record.supplier_name.as_str(),
            record.staff_member.as_str(),
            &totals.subtotal.to_string(),
            &totals.tax.to_string(),
            &totals.total.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use order_core::models::{LineItem, OrderDraft};

    use super::*;

    fn record(id: &str) -> OrderRecord {
        let mut record = OrderDraft {
            order_number: "MOR-20260307-905".to_string(),
            order_date: "2026-03-07".to_string(),
            supplier_name: "木材商事".to_string(),
            supplier_address: "栃木県".to_string(),
            staff_member: "諸鹿大介".to_string(),
            ..Default::default()
        }
        .normalize();
        record.id = id.to_string();
        record.items = vec![LineItem {
            project_name: String::new(),
            name: "羽目板".to_string(),
            quantity: dec!(2),
            unit: "枚".to_string(),
            price: dec!(1000),
        }];
        record
    }

    #[test]
    fn json_export_is_an_array_of_persisted_shapes() {
        let a = record("1");
        let b = record("2");
        let mut out = Vec::new();

        write_json(&[&a, &b], &mut out).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["orderNumber"], "MOR-20260307-905");
        assert_eq!(array[1]["id"], "2");
    }

    #[test]
    fn json_export_of_nothing_is_an_empty_array() {
        let mut out = Vec::new();

        write_json(&[], &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }

    #[test]
    fn csv_export_has_header_and_computed_totals() {
        let a = record("1");
        let mut out = Vec::new();

        write_csv(&[&a], RoundingPolicy::Nearest, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,orderNumber,orderDate,supplierName,staffMember,subtotal,tax,total"
        );
        // 2 × 1000 = 2000, tax 200, total 2200
        assert_eq!(
            lines.next().unwrap(),
            "1,MOR-20260307-905,2026-03-07,木材商事,諸鹿大介,2000,200,2200"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_totals_respect_the_rounding_policy() {
        let mut a = record("1");
        a.items[0].quantity = dec!(3);
        a.items[0].price = dec!(328); // subtotal 984, raw tax 98.4
        let mut out = Vec::new();

        write_csv(&[&a], RoundingPolicy::Ceiling, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(",984,99,1083"));
    }
}
