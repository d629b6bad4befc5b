//! Read-side views over the order list: free-text search, month filtering,
//! and the pre-tax aggregates the management list displays.
//!
//! These are deliberately not store responsibilities — they operate on
//! whatever `load_all()` returned.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use thiserror::Error;

use order_core::models::OrderRecord;

/// A calendar month selector, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct MonthParseError(String);

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MonthParseError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Month { year, month })
    }
}

/// Composable list filter: case-insensitive substring search over supplier
/// name, order number and company name, plus an order-date month filter.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub month: Option<Month>,
}

impl OrderFilter {
    pub fn matches(
        &self,
        record: &OrderRecord,
    ) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let hit = [
                &record.supplier_name,
                &record.order_number,
                &record.company_name,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(month) = self.month {
            // An unparseable order date never matches a month filter.
            match order_date(record) {
                Some(date) if month.contains(date) => {}
                _ => return false,
            }
        }

        true
    }

    pub fn apply<'a>(
        &self,
        records: &'a [OrderRecord],
    ) -> Vec<&'a OrderRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

fn order_date(record: &OrderRecord) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(record.order_date.trim(), "%Y-%m-%d").ok()
}

/// The aggregates the management list shows: order count and the *pre-tax*
/// sum of item subtotals (the original list never added tax here).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderStats {
    pub order_count: usize,
    pub item_total: Decimal,
}

pub fn stats<'a>(records: impl IntoIterator<Item = &'a OrderRecord>) -> OrderStats {
    let mut order_count = 0;
    let mut item_total = Decimal::ZERO;
    for record in records {
        order_count += 1;
        item_total += record
            .items
            .iter()
            .map(|item| item.subtotal())
            .sum::<Decimal>();
    }
    OrderStats {
        order_count,
        item_total,
    }
}
