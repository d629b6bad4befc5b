//! Draft intake: the TOML file an operator fills in instead of the browser
//! form, plus the config-driven pre-fill the form used to hardcode.

use std::path::Path;

use chrono::Local;
use thiserror::Error;

use order_core::models::{OrderDraft, generate_order_number};

use crate::config::DeskConfig;

#[derive(Debug, Error)]
pub enum DraftError {
    #[error("cannot read draft file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid draft file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parses a draft from TOML text. Keys are the camelCase field names of the
/// persisted record; items are `[[items]]` tables. Every field is optional.
pub fn parse_draft(text: &str) -> Result<OrderDraft, DraftError> {
    Ok(toml::from_str(text)?)
}

pub fn read_draft(path: &Path) -> Result<OrderDraft, DraftError> {
    parse_draft(&std::fs::read_to_string(path)?)
}

/// Fills the blanks the browser form used to fill on load: today's date, a
/// generated order number, the configured tax rate, and the issuing-company
/// profile. Fields the operator set are left alone.
pub fn apply_defaults(
    draft: &mut OrderDraft,
    config: &DeskConfig,
) {
    if draft.order_date.trim().is_empty() {
        draft.order_date = Local::now().format("%Y-%m-%d").to_string();
    }
    if draft.order_number.trim().is_empty() {
        draft.order_number = generate_order_number(&config.order_number_prefix);
    }
    if draft.tax_rate.trim().is_empty() {
        draft.tax_rate = config.default_tax_rate.to_string();
    }

    let company = &config.company;
    if draft.company_name.trim().is_empty() {
        draft.company_name = company.name.clone();
    }
    if draft.company_address.trim().is_empty() {
        draft.company_address = company.address.clone();
    }
    if draft.company_phone.trim().is_empty() {
        draft.company_phone = company.phone.clone();
    }
    if draft.company_email.trim().is_empty() {
        draft.company_email = company.email.clone();
    }
    if draft.company_code.is_none() {
        draft.company_code = company.code.clone();
    }
}
