//! ecoyield-ingest: raw price rows, number parsing, unit conversion, category rules
//! and the per-source parsers (market quotes, yearly extracts, seeds, water, carbon, yields, rates).

pub mod classify;
pub mod normalize;
pub mod numeric;
pub mod parsers;
pub mod types;
pub mod units;

pub use classify::{Classification, ClassificationRule, Classifier, LabelPredicate, fold_accents};
pub use normalize::{NormalizeReport, Normalizer};
pub use numeric::{extract_numbers, mean_of_numbers, parse_price_text};
pub use types::{NormalizedObservation, ParseError, RawObservation};
pub use units::{ReferenceWeights, Unit, convert_to_kg, parse_unit_descriptor};
