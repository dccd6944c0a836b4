//! Pricing units and the per-piece → per-kg conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::classify::fold_accents;

/// Pricing unit of a quote after descriptor cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Unit {
    Kg,
    Piece,
    /// Bunch / bundle: no conversion factor exists, rows are excluded
    Bundle,
    /// Anything else, kept verbatim (lower-cased)
    Other(String),
}

impl Unit {
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Kg => "kg",
            Unit::Piece => "pièce",
            Unit::Bundle => "botte",
            Unit::Other(s) => s,
        }
    }

    pub fn is_convertible(&self) -> bool {
        !matches!(self, Unit::Bundle)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_str().to_string()
    }
}

impl From<String> for Unit {
    fn from(s: String) -> Self {
        parse_unit_descriptor(&s)
    }
}

const ARTICLES: [&str; 4] = ["les ", "la ", "le ", "l'"];

/// Strip one leading and one trailing French article ("la", "le", "l'", "les").
pub fn strip_article(descriptor: &str) -> String {
    let mut s = descriptor.trim().to_lowercase();

    for article in ARTICLES {
        if let Some(rest) = s.strip_prefix(article) {
            s = rest.trim_start().to_string();
            break;
        }
    }

    for article in ["les", "la", "le"] {
        if let Some(rest) = s.strip_suffix(article) {
            if rest.ends_with(' ') {
                s = rest.trim_end().to_string();
                break;
            }
        }
    }

    s
}

/// Resolve a unit descriptor like "la pièce", "le kg", "LA BOTTE".
///
/// Comparison is case-insensitive and accent-insensitive after article removal.
/// An empty descriptor means the quote is per kg.
pub fn parse_unit_descriptor(descriptor: &str) -> Unit {
    let cleaned = strip_article(descriptor);
    match fold_accents(&cleaned).as_str() {
        "" | "kg" | "kilo" | "kilogramme" | "kilogram" => Unit::Kg,
        "piece" | "unite" => Unit::Piece,
        "botte" | "bouquet" => Unit::Bundle,
        _ => Unit::Other(cleaned),
    }
}

/// Average weight of one piece, in grams, per category.
///
/// Callers supply the table; nothing is inferred. Keys are compared
/// accent- and case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceWeights {
    grams: BTreeMap<String, f64>,
}

impl ReferenceWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weights used for the recent wholesale quotes.
    pub fn recent_quotes() -> Self {
        Self::new().with("Concombre", 400.0).with("Laitue", 450.0)
    }

    /// Weights used for the yearly historical extracts (adds tomato).
    pub fn historical() -> Self {
        Self::recent_quotes().with("Tomate", 150.0)
    }

    pub fn with(mut self, category: &str, grams: f64) -> Self {
        self.insert(category, grams);
        self
    }

    pub fn insert(&mut self, category: &str, grams: f64) {
        self.grams.insert(fold_accents(category), grams);
    }

    pub fn grams(&self, category: &str) -> Option<f64> {
        self.grams.get(&fold_accents(category)).copied()
    }

    pub fn len(&self) -> usize {
        self.grams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }
}

impl FromIterator<(String, f64)> for ReferenceWeights {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut weights = Self::new();
        for (category, grams) in iter {
            weights.insert(&category, grams);
        }
        weights
    }
}

/// `price_per_kg = price_per_piece * 1000 / reference_weight_g`.
pub fn piece_to_kg(price_per_piece: f64, reference_weight_g: f64) -> f64 {
    price_per_piece * 1000.0 / reference_weight_g
}

/// Convert a per-piece price to per-kg when the category has a reference weight.
/// Every other (price, unit) pair passes through unchanged. No rounding here.
pub fn convert_to_kg(
    price: f64,
    unit: Unit,
    category: &str,
    weights: &ReferenceWeights,
) -> (f64, Unit) {
    match (&unit, weights.grams(category)) {
        (Unit::Piece, Some(grams)) if grams > 0.0 => (piece_to_kg(price, grams), Unit::Kg),
        _ => (price, unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_strip_article() {
        assert_eq!(strip_article("la pièce"), "pièce");
        assert_eq!(strip_article("Le kg"), "kg");
        assert_eq!(strip_article("l'unité"), "unité");
        assert_eq!(strip_article("les 500g"), "500g");
        assert_eq!(strip_article("botte la"), "botte");
        // Only whole-word articles
        assert_eq!(strip_article("lentille"), "lentille");
        assert_eq!(strip_article("colis de 10 le"), "colis de 10");
    }

    #[test]
    fn test_parse_unit_descriptor() {
        assert_eq!(parse_unit_descriptor("la pièce"), Unit::Piece);
        assert_eq!(parse_unit_descriptor("LA PIECE"), Unit::Piece);
        assert_eq!(parse_unit_descriptor("le kg"), Unit::Kg);
        assert_eq!(parse_unit_descriptor(""), Unit::Kg);
        assert_eq!(parse_unit_descriptor("la botte"), Unit::Bundle);
        assert_eq!(
            parse_unit_descriptor("le colis 10kg"),
            Unit::Other("colis 10kg".into())
        );
    }

    #[test]
    fn test_piece_to_kg() {
        assert_relative_eq!(piece_to_kg(100.0, 400.0), 250.0);
    }

    #[test]
    fn test_convert_with_reference_weight() {
        let weights = ReferenceWeights::recent_quotes();
        let (price, unit) = convert_to_kg(0.9, Unit::Piece, "Laitue", &weights);
        assert_relative_eq!(price, 2.0);
        assert_eq!(unit, Unit::Kg);
    }

    #[test]
    fn test_pass_through() {
        let weights = ReferenceWeights::recent_quotes();
        // Piece without reference weight
        assert_eq!(
            convert_to_kg(0.5, Unit::Piece, "Tomate", &weights),
            (0.5, Unit::Piece)
        );
        // Already per kg
        assert_eq!(
            convert_to_kg(1.2, Unit::Kg, "Concombre", &weights),
            (1.2, Unit::Kg)
        );
        // Historical table knows tomatoes
        let (price, unit) = convert_to_kg(0.3, Unit::Piece, "Tomate", &ReferenceWeights::historical());
        assert_relative_eq!(price, 2.0);
        assert_eq!(unit, Unit::Kg);
    }

    #[test]
    fn test_weights_lookup_ignores_case_and_accents() {
        let weights = ReferenceWeights::new().with("Échalote", 30.0);
        assert_eq!(weights.grams("ECHALOTE"), Some(30.0));
    }

    #[test]
    fn test_unit_serde_round_trips_as_token() {
        assert_eq!(String::from(Unit::Piece), "pièce");
        assert_eq!(Unit::from("pièce".to_string()), Unit::Piece);
        assert!(!Unit::Bundle.is_convertible());
    }
}
