use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// A scraped price row exactly as captured (source-agnostic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObservation {
    pub source_id: String,
    pub date: NaiveDate,
    /// Product label without the unit part, e.g. "CONCOMBRE France"
    pub raw_label: String,
    /// Price cell, e.g. "1,85" or "0.8-2 €"
    pub raw_price_text: String,
    /// Unit descriptor, e.g. "la pièce", "le kg"
    pub raw_unit_text: String,
}

impl RawObservation {
    pub fn new(
        source_id: impl Into<String>,
        date: NaiveDate,
        raw_label: impl Into<String>,
        raw_price_text: impl Into<String>,
        raw_unit_text: impl Into<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            date,
            raw_label: raw_label.into(),
            raw_price_text: raw_price_text.into(),
            raw_unit_text: raw_unit_text.into(),
        }
    }
}

/// Canonical record: classified, unit-converted, price rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedObservation {
    pub date: NaiveDate,
    pub category: String,
    pub vegetable_name: String,
    pub price: f64,
    pub unit: Unit,
    pub source_id: String,
}

/// Why a raw row could not become a canonical one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no number in '{0}'")]
    NoNumber(String),
    #[error("negative price in '{0}'")]
    Negative(String),
    #[error("empty cell")]
    Empty,
}
