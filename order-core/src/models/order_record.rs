use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::{OrderTotals, RoundingPolicy, order_totals};
use crate::models::line_item::{LineItem, RawLineItem, decimal_or_zero};

fn default_tax_rate() -> Decimal {
    Decimal::new(1, 1) // 0.1
}

/// Fields that must be present before an order can be previewed or rendered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

/// A persisted purchase order.
///
/// The schema unifies two generations of the form: the baseline fields every
/// record carries, plus the optional ones only one generation wrote
/// (`delivery_date`, `delivery_location`, `bank_details`, `notes`,
/// `company_code`). Serialization uses camelCase keys so records exported by
/// the original browser tooling load unchanged.
///
/// `subtotal`, `tax` and `total` are never stored; they are recomputed from
/// `items` on every read so they cannot go stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Stable identifier, assigned once at creation, compared as a string.
    pub id: String,

    /// Display identifier (e.g. `MOR-20260307-905`); human-formatted, not
    /// guaranteed unique.
    #[serde(default)]
    pub order_number: String,

    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub order_date: String,

    /// `YYYY-MM`; the month the work is expected to complete.
    #[serde(default)]
    pub completion_month: String,

    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub payment_due_date: String,

    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_address: String,
    #[serde(default)]
    pub company_phone: String,
    #[serde(default)]
    pub company_email: String,

    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_address: String,

    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub staff_member: String,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub remarks: String,

    /// Invoice registration number; only the newer form variant collects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Insertion order is display order.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Order-level tax fraction; per-order override with a fixed 10% default.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,

    /// Creation timestamp; `None` for records written before it was tracked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    /// Recomputes subtotal/tax/total from the current items.
    pub fn totals(
        &self,
        policy: RoundingPolicy,
    ) -> OrderTotals {
        order_totals(&self.items, self.tax_rate, policy)
    }

    /// Items that carry information, in insertion order. Legacy records may
    /// have persisted fully blank rows; those are skipped here and in totals.
    pub fn renderable_items(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter().filter(|item| !item.is_empty())
    }

    /// Two records are the same order iff their ids match as strings.
    /// Guards against numeric/string id drift across serialization.
    pub fn is_same_order(
        &self,
        other: &OrderRecord,
    ) -> bool {
        self.id == other.id
    }

    pub fn matches_id(
        &self,
        id: &str,
    ) -> bool {
        self.id == id
    }

    /// Checks the fields the preview refuses to run without: the
    /// counterparty's name and address.
    pub fn validate_for_preview(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.supplier_name.trim().is_empty() {
            missing.push("supplier name");
        }
        if self.supplier_address.trim().is_empty() {
            missing.push("supplier address");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

/// Raw form-session output: every field as the string the user typed.
///
/// A draft becomes an [`OrderRecord`] through [`OrderDraft::normalize`],
/// which is the only place an id and creation timestamp are assigned.
/// Loading an existing record for edit never goes through a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub completion_month: String,
    #[serde(default)]
    pub payment_due_date: String,

    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_address: String,
    #[serde(default)]
    pub company_phone: String,
    #[serde(default)]
    pub company_email: String,

    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub supplier_address: String,

    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub staff_member: String,
    #[serde(default)]
    pub payment_terms: String,
    #[serde(default)]
    pub remarks: String,

    #[serde(default)]
    pub company_code: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<String>,
    #[serde(default)]
    pub delivery_location: Option<String>,
    #[serde(default)]
    pub bank_details: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub items: Vec<RawLineItem>,

    /// Raw tax-rate field; blank or unparseable falls back to 0.1.
    #[serde(default)]
    pub tax_rate: String,
}

impl OrderDraft {
    /// Builds a brand-new record with an explicit id and timestamp.
    ///
    /// All text fields are trimmed, numeric fields follow the
    /// invalid-becomes-zero policy, and fully blank item rows are dropped.
    /// Optional free-text fields that trim to nothing collapse to `None`.
    pub fn normalize_with(
        &self,
        id: String,
        created_at: DateTime<Utc>,
    ) -> OrderRecord {
        let tax_rate = if self.tax_rate.trim().is_empty() {
            default_tax_rate()
        } else {
            decimal_or_zero(&self.tax_rate)
        };

        OrderRecord {
            id,
            order_number: self.order_number.trim().to_string(),
            order_date: self.order_date.trim().to_string(),
            completion_month: self.completion_month.trim().to_string(),
            payment_due_date: self.payment_due_date.trim().to_string(),
            company_name: self.company_name.trim().to_string(),
            company_address: self.company_address.trim().to_string(),
            company_phone: self.company_phone.trim().to_string(),
            company_email: self.company_email.trim().to_string(),
            supplier_name: self.supplier_name.trim().to_string(),
            supplier_address: self.supplier_address.trim().to_string(),
            contact_person: self.contact_person.trim().to_string(),
            staff_member: self.staff_member.trim().to_string(),
            payment_terms: self.payment_terms.trim().to_string(),
            remarks: self.remarks.trim().to_string(),
            company_code: trimmed_option(&self.company_code),
            delivery_date: trimmed_option(&self.delivery_date),
            delivery_location: trimmed_option(&self.delivery_location),
            bank_details: trimmed_option(&self.bank_details),
            notes: trimmed_option(&self.notes),
            items: self
                .items
                .iter()
                .filter(|raw| !raw.is_blank())
                .map(RawLineItem::normalize)
                .collect(),
            tax_rate,
            created_at: Some(created_at),
        }
    }

    /// [`normalize_with`](Self::normalize_with) using the current time for
    /// both the millisecond-derived id and the creation timestamp.
    pub fn normalize(&self) -> OrderRecord {
        let now = Utc::now();
        self.normalize_with(now.timestamp_millis().to_string(), now)
    }
}

fn trimmed_option(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            order_number: " MOR-20260307-905 ".to_string(),
            order_date: "2026-03-07".to_string(),
            supplier_name: "  木材商事株式会社  ".to_string(),
            supplier_address: "栃木県宇都宮市1-2-3".to_string(),
            company_name: "株式会社諸鹿彩色".to_string(),
            items: vec![
                RawLineItem {
                    project_name: "外壁塗装".to_string(),
                    name: "シーラー".to_string(),
                    quantity: "2".to_string(),
                    unit: "缶".to_string(),
                    price: "1000".to_string(),
                },
                RawLineItem::default(), // blank row from the form
                RawLineItem {
                    name: "上塗り".to_string(),
                    quantity: "abc".to_string(),
                    price: "".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 0, 5, 0).unwrap()
    }

    #[test]
    fn normalize_trims_and_drops_blank_rows() {
        let record = draft().normalize_with("1770000000000".to_string(), fixed_now());

        assert_eq!(record.order_number, "MOR-20260307-905");
        assert_eq!(record.supplier_name, "木材商事株式会社");
        assert_eq!(record.items.len(), 2); // blank row dropped
        assert_eq!(record.items[1].quantity, Decimal::ZERO); // "abc" -> 0
        assert_eq!(record.created_at, Some(fixed_now()));
    }

    #[test]
    fn normalize_defaults_tax_rate_to_ten_percent() {
        let record = draft().normalize_with("1".to_string(), fixed_now());

        assert_eq!(record.tax_rate, dec!(0.1));
    }

    #[test]
    fn normalize_keeps_explicit_tax_rate() {
        let mut d = draft();
        d.tax_rate = "0.08".to_string();

        let record = d.normalize_with("1".to_string(), fixed_now());

        assert_eq!(record.tax_rate, dec!(0.08));
    }

    #[test]
    fn optional_fields_collapse_to_none_when_blank() {
        let mut d = draft();
        d.bank_details = Some("   ".to_string());
        d.delivery_location = Some(" 現場渡し ".to_string());

        let record = d.normalize_with("1".to_string(), fixed_now());

        assert_eq!(record.bank_details, None);
        assert_eq!(record.delivery_location, Some("現場渡し".to_string()));
    }

    #[test]
    fn validation_lists_every_missing_required_field() {
        let record = OrderDraft::default().normalize_with("1".to_string(), fixed_now());

        let err = record.validate_for_preview().unwrap_err();

        assert_eq!(err.missing, vec!["supplier name", "supplier address"]);
    }

    #[test]
    fn validation_passes_with_supplier_fields_present() {
        let record = draft().normalize_with("1".to_string(), fixed_now());

        assert_eq!(record.validate_for_preview(), Ok(()));
    }

    #[test]
    fn identity_is_string_id_comparison() {
        let a = draft().normalize_with("1770000000000".to_string(), fixed_now());
        let mut b = a.clone();
        b.supplier_name = "別会社".to_string();

        assert!(a.is_same_order(&b));
        assert!(a.matches_id("1770000000000"));
        assert!(!a.matches_id("1770000000001"));
    }

    #[test]
    fn legacy_browser_record_deserializes() {
        // Shape written by the original management tooling: numeric-looking
        // string id, stored subtotals, no optional fields, no createdAt.
        let json = r#"{
            "id": "1726000000000",
            "orderNumber": "ORD-20240910-123",
            "orderDate": "2024-09-10",
            "completionMonth": "2024-10",
            "supplierName": "木材商事株式会社",
            "supplierAddress": "栃木県",
            "companyName": "株式会社諸鹿彩色",
            "paymentTerms": "月末締め翌月末払い",
            "items": [
                {"projectName": "", "name": "羽目板", "quantity": 10, "unit": "枚", "price": 800, "subtotal": 8000}
            ]
        }"#;

        let record: OrderRecord = serde_json::from_str(json).expect("legacy record should load");

        assert_eq!(record.id, "1726000000000");
        assert_eq!(record.tax_rate, dec!(0.1)); // serde default
        assert_eq!(record.created_at, None);
        assert_eq!(record.items[0].subtotal(), dec!(8000));
    }

    #[test]
    fn serialization_uses_camel_case_and_omits_empty_options() {
        let record = draft().normalize_with("1".to_string(), fixed_now());

        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("orderNumber").is_some());
        assert!(json.get("supplierName").is_some());
        assert!(json.get("bankDetails").is_none());
        assert!(json.get("order_number").is_none());
    }
}
