//! Tap water price (€/m³, national average on January 1st) and garden water needs.

use ecoyield_core::round2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::fold_accents;
use crate::numeric::parse_price_text;

/// Water a square metre of garden takes over a season when nothing more specific is known (m³).
pub const DEFAULT_M3_PER_M2: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterPrice {
    pub year: i32,
    pub price_m3: f64,
    pub price_m2: f64,
}

/// "4,34 €/m3" → 4.34. The unit suffix after the currency sign is ignored.
pub fn parse_water_price(text: &str) -> Option<f64> {
    parse_price_text(text).ok()
}

/// Deduplicate by year (last entry wins), sort by year, derive the per-m² price.
pub fn finalize_water_prices(entries: &[(i32, f64)]) -> Vec<WaterPrice> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for (year, price_m3) in entries {
        by_year.insert(*year, *price_m3);
    }
    by_year
        .into_iter()
        .map(|(year, price_m3)| WaterPrice {
            year,
            price_m3,
            price_m2: round2(price_m3 * DEFAULT_M3_PER_M2),
        })
        .collect()
}

/// Season water needs per vegetable (litres per m²).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterNeed {
    pub category: String,
    pub weekly_l_per_m2: f64,
    pub cycle_l_per_m2: f64,
}

pub fn default_water_needs() -> Vec<WaterNeed> {
    let table: [(&str, f64, f64); 15] = [
        ("Tomate", 25.0, 400.0),
        ("Carotte", 15.0, 200.0),
        ("Courgette", 30.0, 350.0),
        ("Concombre", 30.0, 380.0),
        ("Poireau", 18.0, 250.0),
        ("Pomme de terre", 15.0, 250.0),
        ("Laitue", 20.0, 150.0),
        ("Potimarron", 25.0, 350.0),
        ("Butternut", 25.0, 350.0),
        ("Haricots verts", 22.0, 180.0),
        ("Radis", 12.0, 80.0),
        ("Ail", 10.0, 100.0),
        ("Oignon", 10.0, 100.0),
        ("Poivron", 20.0, 380.0),
        ("Aubergine", 25.0, 400.0),
    ];
    table
        .into_iter()
        .map(|(category, weekly, cycle)| WaterNeed {
            category: category.to_string(),
            weekly_l_per_m2: weekly,
            cycle_l_per_m2: cycle,
        })
        .collect()
}

/// Yearly water cost per m² for a vegetable: its cycle need at `price_m3`,
/// or the flat `DEFAULT_M3_PER_M2` when the vegetable has no entry.
pub fn water_cost_per_m2(needs: &[WaterNeed], vegetable: &str, price_m3: f64) -> f64 {
    let key = fold_accents(vegetable);
    let m3 = needs
        .iter()
        .find(|n| fold_accents(&n.category) == key)
        .map(|n| n.cycle_l_per_m2 / 1000.0)
        .unwrap_or(DEFAULT_M3_PER_M2);
    round2(m3 * price_m3)
}
