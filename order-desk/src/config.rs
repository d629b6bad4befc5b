//! Desk configuration: store backend and location, calculation defaults, and
//! the issuing-company profile used to pre-fill new drafts.
//!
//! Resolution order for the config file:
//! 1. **`ORDER_DESK_CONFIG`** — if set, use this path (override for custom
//!    layouts).
//! 2. **`./order-desk.toml`** — if the file exists in the current working
//!    directory.
//! 3. Built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use order_core::calculations::RoundingPolicy;
use order_core::store::StoreConfig;

pub const CONFIG_ENV: &str = "ORDER_DESK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "order-desk.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    pub store: StoreSection,

    /// Prefix for generated order numbers (`PREFIX-YYYYMMDD-HMM`).
    pub order_number_prefix: String,

    /// Tax rate seeded into new drafts that leave the field blank.
    /// Individual orders keep their own rate once saved.
    pub default_tax_rate: Decimal,

    /// How the fractional tax amount becomes a whole currency unit.
    /// The product owner has not settled on one; both are supported.
    pub rounding: RoundingPolicy,

    pub company: CompanySection,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            store: StoreSection::default(),
            order_number_prefix: "MOR".to_string(),
            default_tax_rate: Decimal::new(1, 1), // 0.1
            rounding: RoundingPolicy::default(),
            company: CompanySection::default(),
        }
    }
}

impl DeskConfig {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            backend: self.store.backend.clone(),
            location: self.store.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: String,
    pub location: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        let defaults = StoreConfig::default();
        Self {
            backend: defaults.backend,
            location: defaults.location,
        }
    }
}

/// Issuing-company profile. The original form hardcoded these in its HTML;
/// here they pre-fill any draft field the operator left blank.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanySection {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Invoice registration number.
    pub code: Option<String>,
}

/// Loads configuration following the resolution order above.
pub fn load() -> Result<DeskConfig> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(DeskConfig::default()),
    }
}

/// Loads configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<DeskConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let cwd_config = PathBuf::from(DEFAULT_CONFIG_FILE);
    cwd_config.exists().then_some(cwd_config)
}
