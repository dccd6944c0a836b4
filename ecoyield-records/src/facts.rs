//! Collapse the per-source tables into the per-vegetable fact table.
//!
//! Each source sets one or more attributes of a vegetable. Names are matched
//! accent- and case-insensitively; the first spelling seen is the one kept.
//! Setting an attribute twice keeps the last value.

use ecoyield_core::{FactTable, VegetableFact, Warning};
use ecoyield_ingest::fold_accents;
use ecoyield_ingest::parsers::carbon::CarbonImpact;
use ecoyield_ingest::parsers::yields::YieldRecord;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::history::CategoryPrice;

#[derive(Debug, Clone, Default)]
struct PartialFact {
    name: String,
    yield_kg_per_m2: Option<f64>,
    price_per_kg: Option<f64>,
    co2_saved_kg_per_kg: Option<f64>,
    water_cost_per_m2: Option<f64>,
    seed_cost_per_m2: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct FactBuilder {
    entries: BTreeMap<String, PartialFact>,
}

impl FactBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, name: &str) -> &mut PartialFact {
        let name = name.trim();
        self.entries
            .entry(fold_accents(name))
            .or_insert_with(|| PartialFact {
                name: name.to_string(),
                ..Default::default()
            })
    }

    pub fn set_yield(&mut self, name: &str, kg_per_m2: f64) -> &mut Self {
        self.entry(name).yield_kg_per_m2 = Some(kg_per_m2);
        self
    }

    pub fn set_price(&mut self, name: &str, per_kg: f64) -> &mut Self {
        self.entry(name).price_per_kg = Some(per_kg);
        self
    }

    pub fn set_co2(&mut self, name: &str, kg_per_kg: f64) -> &mut Self {
        self.entry(name).co2_saved_kg_per_kg = Some(kg_per_kg);
        self
    }

    pub fn set_water_cost(&mut self, name: &str, per_m2: f64) -> &mut Self {
        self.entry(name).water_cost_per_m2 = Some(per_m2);
        self
    }

    pub fn set_seed_cost(&mut self, name: &str, per_m2: f64) -> &mut Self {
        self.entry(name).seed_cost_per_m2 = Some(per_m2);
        self
    }

    /// Yields from the gardening tables; unknown yields are left unset.
    pub fn add_yields(&mut self, records: &[YieldRecord]) -> &mut Self {
        for r in records {
            if let Some(y) = r.yield_kg_m2 {
                self.set_yield(&r.vegetable, y);
            }
        }
        self
    }

    /// Latest mean market price per category.
    pub fn add_prices<'p>(&mut self, prices: impl IntoIterator<Item = &'p CategoryPrice>) -> &mut Self {
        for p in prices {
            self.set_price(&p.category, p.price);
        }
        self
    }

    /// Store-bought footprint totals, grams per kg → kg per kg.
    pub fn add_carbon(&mut self, impacts: &[CarbonImpact]) -> &mut Self {
        for impact in impacts {
            if let Some(kg) = impact.total_kg_per_kg() {
                self.set_co2(&impact.vegetable, kg);
            }
        }
        self
    }

    pub fn add_water_costs<'w>(&mut self, costs: impl IntoIterator<Item = (&'w String, &'w f64)>) -> &mut Self {
        for (name, cost) in costs {
            self.set_water_cost(name, *cost);
        }
        self
    }

    pub fn add_seed_costs<'s>(&mut self, costs: impl IntoIterator<Item = (&'s String, &'s f64)>) -> &mut Self {
        for (name, cost) in costs {
            self.set_seed_cost(name, *cost);
        }
        self
    }

    /// Assemble the table.
    ///
    /// A vegetable without a positive yield or without a price cannot be
    /// simulated and is dropped. Missing CO₂, water or seed figures count as 0.
    /// Every gap is reported as `IncompleteFact`.
    pub fn build(&self) -> (FactTable, Vec<Warning>) {
        let mut table = FactTable::new();
        let mut warnings = Vec::new();

        for partial in self.entries.values() {
            let incomplete = |attribute: &str, outcome: &str| Warning::IncompleteFact {
                vegetable: partial.name.clone(),
                attribute: attribute.to_string(),
                outcome: outcome.to_string(),
            };

            let Some(yield_kg) = partial.yield_kg_per_m2.filter(|y| y.is_finite() && *y > 0.0) else {
                warnings.push(incomplete("yield", "row dropped"));
                continue;
            };
            let Some(price) = partial.price_per_kg else {
                warnings.push(incomplete("price", "row dropped"));
                continue;
            };

            let mut or_zero = |value: Option<f64>, attribute: &str| {
                value.unwrap_or_else(|| {
                    warnings.push(incomplete(attribute, "assumed 0"));
                    0.0
                })
            };
            let co2 = or_zero(partial.co2_saved_kg_per_kg, "co2");
            let water = or_zero(partial.water_cost_per_m2, "water cost");
            let seeds = or_zero(partial.seed_cost_per_m2, "seed cost");

            let fact = VegetableFact::new(partial.name.clone(), yield_kg, price, co2, water, seeds);
            if !fact.is_valid() {
                debug!(vegetable = fact.name.as_str(), "dropping invalid fact row");
                warnings.push(incomplete("valid coefficients", "row dropped"));
                continue;
            }
            table.insert(fact);
        }

        info!(rows = table.len(), warnings = warnings.len(), "built fact table");
        (table, warnings)
    }
}
