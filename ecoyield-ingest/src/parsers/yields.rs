//! Gardening yield tables: yield, planting density, emergence and harvest delays,
//! and the yearly quantity a household eats.
//!
//! Cells are free text ("0,8-2 kg / pied", "10 à 20", "–"). Ranges become their
//! mean; a dash or an empty cell is unknown.

use ecoyield_core::round2;
use serde::{Deserialize, Serialize};

use crate::numeric::{mean_of_numbers, normalize_decimal};

/// One scraped row, cells as published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YieldRow {
    pub vegetable: String,
    pub yield_text: String,
    pub density_text: String,
    pub emergence_text: String,
    pub harvest_text: String,
    /// Quantity for a household of two.
    pub quantity_two_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRecord {
    pub vegetable: String,
    pub yield_kg_m2: Option<f64>,
    pub density_per_m2: Option<f64>,
    pub emergence_days: Option<f64>,
    pub harvest_days: Option<f64>,
    pub quantity_one_person: Option<f64>,
}

fn cell_mean(text: &str) -> Option<f64> {
    let t = text.trim();
    if t.is_empty() || t == "–" || t == "-" {
        return None;
    }
    mean_of_numbers(t)
}

/// Yield in kg/m².
///
/// Per-plant figures ("kg / pied", "fruits / pied") are multiplied by the
/// planting density and are unknown without one. Anything else is taken as
/// already per m².
pub fn yield_kg_per_m2(text: &str, density_per_m2: Option<f64>) -> Option<f64> {
    let mean = cell_mean(text)?;
    let normalized = normalize_decimal(text);
    let per_plant = ["kg / pied", "kg/pied", "fruits / pied", "fruits/pied"]
        .iter()
        .any(|marker| normalized.contains(marker));

    if per_plant {
        density_per_m2.map(|d| round2(mean * d))
    } else {
        Some(round2(mean))
    }
}

pub fn parse_yield_row(row: &YieldRow) -> YieldRecord {
    let density = cell_mean(&row.density_text);
    YieldRecord {
        vegetable: row.vegetable.trim().to_string(),
        yield_kg_m2: yield_kg_per_m2(&row.yield_text, density),
        density_per_m2: density,
        emergence_days: cell_mean(&row.emergence_text),
        harvest_days: cell_mean(&row.harvest_text),
        quantity_one_person: cell_mean(&row.quantity_two_text).map(|q| q / 2.0),
    }
}

/// Parse every row that names a vegetable.
pub fn parse_yield_rows(rows: &[YieldRow]) -> Vec<YieldRecord> {
    rows.iter()
        .filter(|r| !r.vegetable.trim().is_empty())
        .map(parse_yield_row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_units() {
        assert_eq!(yield_kg_per_m2("3-5 kg/m²", None), Some(4.0));
        assert_eq!(yield_kg_per_m2("0,8-2 kg / pied", Some(2.5)), Some(3.5));
        assert_eq!(yield_kg_per_m2("2-4 fruits / pied", Some(1.0)), Some(3.0));
        assert_eq!(yield_kg_per_m2("1 kg / pied", None), None);
        assert_eq!(yield_kg_per_m2("–", Some(4.0)), None);
        // No unit marker: taken as per m²
        assert_eq!(yield_kg_per_m2("2,345", None), Some(2.35));
    }

    #[test]
    fn test_parse_yield_rows() {
        let rows = vec![
            YieldRow {
                vegetable: " Tomate ".to_string(),
                yield_text: "3-5 kg / pied".to_string(),
                density_text: "2-3".to_string(),
                emergence_text: "6 à 10".to_string(),
                harvest_text: "90-120".to_string(),
                quantity_two_text: "30 kg".to_string(),
            },
            YieldRow {
                vegetable: "Radis".to_string(),
                yield_text: "–".to_string(),
                density_text: String::new(),
                ..Default::default()
            },
            YieldRow::default(),
        ];

        let records = parse_yield_rows(&rows);
        assert_eq!(records.len(), 2);

        let tomato = &records[0];
        assert_eq!(tomato.vegetable, "Tomate");
        assert_eq!(tomato.density_per_m2, Some(2.5));
        assert_eq!(tomato.yield_kg_m2, Some(10.0));
        assert_eq!(tomato.emergence_days, Some(8.0));
        assert_eq!(tomato.harvest_days, Some(105.0));
        assert_eq!(tomato.quantity_one_person, Some(15.0));

        assert_eq!(records[1].yield_kg_m2, None);
        assert_eq!(records[1].quantity_one_person, None);
    }
}
