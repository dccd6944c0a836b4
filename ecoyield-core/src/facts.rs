//! Per-vegetable economic and ecological coefficients consumed by the simulation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the fact table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VegetableFact {
    /// Canonical vegetable name (also the table key)
    pub name: String,
    /// Harvest per cultivated square metre per year (> 0)
    pub yield_kg_per_m2: f64,
    /// Market price (€/kg)
    pub price_per_kg: f64,
    /// CO₂ avoided per kg grown at home instead of bought
    pub co2_saved_kg_per_kg: f64,
    /// Yearly water bill per m² (€)
    pub water_cost_per_m2: f64,
    /// Yearly seed spend per m² (€)
    pub seed_cost_per_m2: f64,
}

impl VegetableFact {
    pub fn new(
        name: impl Into<String>,
        yield_kg_per_m2: f64,
        price_per_kg: f64,
        co2_saved_kg_per_kg: f64,
        water_cost_per_m2: f64,
        seed_cost_per_m2: f64,
    ) -> Self {
        Self {
            name: name.into(),
            yield_kg_per_m2,
            price_per_kg,
            co2_saved_kg_per_kg,
            water_cost_per_m2,
            seed_cost_per_m2,
        }
    }

    /// Yield must be positive; every other coefficient non-negative.
    pub fn is_valid(&self) -> bool {
        let non_negative = [
            self.price_per_kg,
            self.co2_saved_kg_per_kg,
            self.water_cost_per_m2,
            self.seed_cost_per_m2,
        ];
        self.yield_kg_per_m2.is_finite()
            && self.yield_kg_per_m2 > 0.0
            && non_negative.iter().all(|v| v.is_finite() && *v >= 0.0)
    }

    /// CO₂ saved per m², in grams (the unit the persisted fact file uses).
    pub fn co2_saved_g_per_m2(&self) -> f64 {
        self.co2_saved_kg_per_kg * self.yield_kg_per_m2 * 1000.0
    }

    /// Recurring yearly cost per m² (water + seeds).
    pub fn cost_per_m2(&self) -> f64 {
        self.water_cost_per_m2 + self.seed_cost_per_m2
    }
}

/// The fact table: one row per distinct vegetable, ordered by name.
///
/// Rebuilt wholesale by each pipeline run and read-only during simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FactTable {
    rows: BTreeMap<String, VegetableFact>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small built-in table used when no fact file has been produced yet.
    pub fn fallback() -> Self {
        Self::from_rows([
            VegetableFact::new("Carotte", 6.0, 3.0, 2.0 / 6.0, 1.0, 2.0),
            VegetableFact::new("Courgette", 15.0, 4.0, 5.0 / 15.0, 2.0, 2.0),
            VegetableFact::new("Tomate", 9.0, 6.0, 4.0 / 9.0, 2.0, 2.0),
        ])
    }

    /// Build from rows; a later row with the same name replaces an earlier one.
    pub fn from_rows(rows: impl IntoIterator<Item = VegetableFact>) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.insert(row);
        }
        table
    }

    /// Insert or replace the row for `fact.name`, returning the replaced row.
    pub fn insert(&mut self, fact: VegetableFact) -> Option<VegetableFact> {
        self.rows.insert(fact.name.clone(), fact)
    }

    pub fn get(&self, name: &str) -> Option<&VegetableFact> {
        self.rows.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VegetableFact> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fact_validation() {
        let ok = VegetableFact::new("Tomate", 9.0, 6.0, 0.4, 2.0, 2.0);
        assert!(ok.is_valid());

        let zero_yield = VegetableFact::new("Tomate", 0.0, 6.0, 0.4, 2.0, 2.0);
        assert!(!zero_yield.is_valid());

        let negative_price = VegetableFact::new("Tomate", 9.0, -1.0, 0.4, 2.0, 2.0);
        assert!(!negative_price.is_valid());
    }

    #[test]
    fn test_co2_grams_per_m2() {
        let f = VegetableFact::new("Tomate", 9.0, 6.0, 0.5, 2.0, 2.0);
        assert_relative_eq!(f.co2_saved_g_per_m2(), 4500.0);
        assert_relative_eq!(f.cost_per_m2(), 4.0);
    }

    #[test]
    fn test_insert_replaces_wholesale() {
        let mut table = FactTable::new();
        table.insert(VegetableFact::new("Laitue", 4.0, 2.0, 0.1, 1.0, 1.0));
        let previous = table.insert(VegetableFact::new("Laitue", 5.0, 2.5, 0.2, 1.0, 1.0));
        assert_eq!(previous.map(|f| f.yield_kg_per_m2), Some(4.0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Laitue").map(|f| f.price_per_kg), Some(2.5));
    }

    #[test]
    fn test_fallback_is_sorted_and_valid() {
        let table = FactTable::fallback();
        let names: Vec<_> = table.names().collect();
        assert_eq!(names, vec!["Carotte", "Courgette", "Tomate"]);
        assert!(table.iter().all(VegetableFact::is_valid));
    }
}
