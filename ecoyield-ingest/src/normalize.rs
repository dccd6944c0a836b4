//! Raw scraped rows → canonical per-kg observations.
//!
//! Order of operations per row:
//! 1. classify the label
//! 2. resolve the unit descriptor; bundles are excluded
//! 3. parse the price text (comma decimals, ranges → mean)
//! 4. convert per-piece prices with the reference weights
//! 5. round to cents, last
//!
//! A row either becomes a complete `NormalizedObservation` or is dropped with a
//! `Warning`; there is no partially filled output.

use ecoyield_core::{Warning, round2};
use regex::Regex;
use tracing::{debug, info};

use crate::classify::{Classifier, capitalize};
use crate::numeric::parse_price_text;
use crate::types::{NormalizedObservation, RawObservation};
use crate::units::{ReferenceWeights, Unit, convert_to_kg, parse_unit_descriptor};

/// Origin / label noise removed from vegetable names.
const NAME_NOISE: &str = r"(?i) France biologique|France|biologique";

/// Rows kept plus the reason for every row dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeReport {
    pub observations: Vec<NormalizedObservation>,
    pub warnings: Vec<Warning>,
}

impl NormalizeReport {
    pub fn dropped(&self) -> usize {
        self.warnings.len()
    }
}

pub struct Normalizer<'a> {
    classifier: &'a Classifier,
    weights: &'a ReferenceWeights,
    name_noise: Regex,
}

impl<'a> Normalizer<'a> {
    pub fn new(classifier: &'a Classifier, weights: &'a ReferenceWeights) -> anyhow::Result<Self> {
        Ok(Self {
            classifier,
            weights,
            name_noise: Regex::new(NAME_NOISE)?,
        })
    }

    /// "CAROTTE France biologique" → "Carotte".
    pub fn clean_vegetable_name(&self, label: &str) -> String {
        let base = label.split('(').next().unwrap_or(label);
        let stripped = self.name_noise.replace_all(base, "");
        capitalize(stripped.trim())
    }

    /// Normalize one row, or explain why it was dropped.
    pub fn normalize(&self, raw: &RawObservation) -> Result<NormalizedObservation, Warning> {
        let category = self.classifier.classify(&raw.raw_label).category;

        let unit = parse_unit_descriptor(&raw.raw_unit_text);
        if !unit.is_convertible() {
            return Err(Warning::UnitExclusion {
                source_id: raw.source_id.clone(),
                label: raw.raw_label.clone(),
                unit: unit.to_string(),
            });
        }

        let price = parse_price_text(&raw.raw_price_text).map_err(|_| Warning::ParseFailure {
            source_id: raw.source_id.clone(),
            label: raw.raw_label.clone(),
            field: "price".to_string(),
            text: raw.raw_price_text.clone(),
        })?;

        let (price, unit): (f64, Unit) = convert_to_kg(price, unit, &category, self.weights);

        Ok(NormalizedObservation {
            date: raw.date,
            category,
            vegetable_name: self.clean_vegetable_name(&raw.raw_label),
            price: round2(price),
            unit,
            source_id: raw.source_id.clone(),
        })
    }

    /// Normalize a table, keeping input order for the rows that survive.
    pub fn normalize_all(&self, raws: &[RawObservation]) -> NormalizeReport {
        let mut report = NormalizeReport::default();

        for raw in raws {
            match self.normalize(raw) {
                Ok(obs) => report.observations.push(obs),
                Err(w) => {
                    debug!(%w, "dropped raw row");
                    report.warnings.push(w);
                }
            }
        }

        info!(
            kept = report.observations.len(),
            dropped = report.dropped(),
            "normalized raw observations"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw(label: &str, price: &str, unit: &str) -> RawObservation {
        RawObservation::new(
            "rnm",
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            label,
            price,
            unit,
        )
    }

    fn fixtures() -> (Classifier, ReferenceWeights) {
        (Classifier::default(), ReferenceWeights::recent_quotes())
    }

    #[test]
    fn test_piece_price_converted_then_rounded() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        let obs = n.normalize(&raw("CONCOMBRE France", "100", "la pièce")).unwrap();
        assert_eq!(obs.price, 250.00);
        assert_eq!(obs.unit, Unit::Kg);
        assert_eq!(obs.category, "Concombre");
        assert_eq!(obs.vegetable_name, "Concombre");
    }

    #[test]
    fn test_rounding_happens_after_conversion() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        // 0.555 €/piece → 1.2333 €/kg; rounding first would give 0.56 → 1.2444
        let obs = n.normalize(&raw("LAITUE batavia", "0,555", "la pièce")).unwrap();
        assert_eq!(obs.price, 1.23);
    }

    #[test]
    fn test_bundle_excluded() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        let err = n.normalize(&raw("RADIS rose", "1,20", "la botte")).unwrap_err();
        assert_eq!(err.kind(), "unit-exclusion");
    }

    #[test]
    fn test_other_unit_kept_unconverted() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        let obs = n.normalize(&raw("CAROTTE France", "12,00", "le colis 10kg")).unwrap();
        assert_eq!(obs.unit, Unit::Other("colis 10kg".to_string()));
        assert_eq!(obs.price, 12.0);
        assert_eq!(obs.category, "Carotte");

        let report = n.normalize_all(&[raw("CAROTTE France", "12,00", "le colis 10kg")]);
        assert_eq!(report.observations.len(), 1);
        assert_eq!(report.dropped(), 0);
    }

    #[test]
    fn test_unparseable_price_dropped() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        let err = n.normalize(&raw("CAROTTE France", "n.c.", "le kg")).unwrap_err();
        assert!(matches!(err, Warning::ParseFailure { ref field, .. } if field == "price"));
    }

    #[test]
    fn test_clean_vegetable_name() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        assert_eq!(n.clean_vegetable_name("CAROTTE France biologique"), "Carotte");
        assert_eq!(n.clean_vegetable_name("POIREAU france (le kg)"), "Poireau");
        assert_eq!(n.clean_vegetable_name("TOMATE grappe biologique"), "Tomate grappe");
    }

    #[test]
    fn test_normalize_all_is_idempotent() {
        let (c, w) = fixtures();
        let n = Normalizer::new(&c, &w).unwrap();
        let table = vec![
            raw("CAROTTE France", "1,10", "le kg"),
            raw("RADIS", "0,90", "la botte"),
            raw("LAITUE France", "0,80", "la pièce"),
            raw("POIREAU", "", "le kg"),
        ];
        let first = n.normalize_all(&table);
        let second = n.normalize_all(&table);
        assert_eq!(first, second);
        assert_eq!(first.observations.len(), 2);
        assert_eq!(first.dropped(), 2);
        assert_eq!(first.observations[1].price, 1.78);
    }
}
