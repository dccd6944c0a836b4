//! Carbon footprint of store-bought vegetables, per life-cycle stage.
//!
//! The source publishes one small table per vegetable: (stage, "123,4 g CO₂e").
//! Rows are pivoted into one `CarbonImpact` per vegetable. Values are grams of
//! CO₂e per kg of produce.

use ecoyield_core::{Warning, round_to};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::classify::{capitalize, fold_accents};
use crate::numeric::mean_of_numbers;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonImpact {
    pub vegetable: String,
    pub agriculture: Option<f64>,
    pub transformation: Option<f64>,
    pub transport: Option<f64>,
    pub distribution: Option<f64>,
    pub consumption: Option<f64>,
    pub total: Option<f64>,
}

impl CarbonImpact {
    fn empty(vegetable: String) -> Self {
        Self {
            vegetable,
            agriculture: None,
            transformation: None,
            transport: None,
            distribution: None,
            consumption: None,
            total: None,
        }
    }

    fn slot(&mut self, stage: &str) -> Option<&mut Option<f64>> {
        match fold_accents(stage).as_str() {
            "agriculture" => Some(&mut self.agriculture),
            "transformation" => Some(&mut self.transformation),
            "transport" => Some(&mut self.transport),
            "supermarche et distribution" | "distribution" => Some(&mut self.distribution),
            "consommation" => Some(&mut self.consumption),
            "total" => Some(&mut self.total),
            _ => None,
        }
    }

    /// Total footprint in kg CO₂e per kg (what growing at home avoids).
    pub fn total_kg_per_kg(&self) -> Option<f64> {
        self.total.map(|g| g / 1000.0)
    }
}

/// Source page names → canonical vegetable names.
pub fn canonical_vegetable(name: &str) -> String {
    match fold_accents(name).as_str() {
        "potiron" => "Potimarron".to_string(),
        "pomme-de-terre" | "pommedeterre" => "Pomme de terre".to_string(),
        "courge" => "Butternut".to_string(),
        _ => capitalize(name),
    }
}

/// Pivot (vegetable, stage, value text) rows.
///
/// The first value for a (vegetable, stage) pair wins. Unknown stages are
/// ignored; unreadable values are reported and left empty. Missing
/// transformation / consumption values are filled with the mean of the other
/// vegetables, rounded to one decimal.
pub fn pivot_impacts(
    source_id: &str,
    rows: &[(String, String, String)],
) -> (Vec<CarbonImpact>, Vec<Warning>) {
    let mut by_vegetable: BTreeMap<String, CarbonImpact> = BTreeMap::new();
    let mut warnings = Vec::new();

    for (vegetable, stage, value_text) in rows {
        let name = canonical_vegetable(vegetable);
        let impact = by_vegetable
            .entry(name.clone())
            .or_insert_with(|| CarbonImpact::empty(name.clone()));

        let Some(slot) = impact.slot(stage) else {
            debug!(stage = stage.as_str(), "ignoring unknown carbon stage");
            continue;
        };
        if slot.is_some() {
            continue;
        }

        match mean_of_numbers(value_text) {
            Some(v) => *slot = Some(v),
            None => warnings.push(Warning::ParseFailure {
                source_id: source_id.to_string(),
                label: format!("{name} / {stage}"),
                field: "co2".to_string(),
                text: value_text.clone(),
            }),
        }
    }

    let mut impacts: Vec<CarbonImpact> = by_vegetable.into_values().collect();
    fill_with_mean(&mut impacts, |i| &mut i.transformation);
    fill_with_mean(&mut impacts, |i| &mut i.consumption);

    (impacts, warnings)
}

fn fill_with_mean(impacts: &mut [CarbonImpact], field: impl Fn(&mut CarbonImpact) -> &mut Option<f64>) {
    let known: Vec<f64> = impacts.iter_mut().filter_map(|i| *field(i)).collect();
    if known.is_empty() {
        return;
    }
    let mean = known.iter().sum::<f64>() / known.len() as f64;

    for impact in impacts.iter_mut() {
        let slot = field(impact);
        *slot = Some(round_to(slot.unwrap_or(mean), 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(v: &str, s: &str, x: &str) -> (String, String, String) {
        (v.to_string(), s.to_string(), x.to_string())
    }

    #[test]
    fn test_canonical_vegetable() {
        assert_eq!(canonical_vegetable("potiron"), "Potimarron");
        assert_eq!(canonical_vegetable("Pomme-de-terre"), "Pomme de terre");
        assert_eq!(canonical_vegetable("courge"), "Butternut");
        assert_eq!(canonical_vegetable("tomate"), "Tomate");
    }

    #[test]
    fn test_pivot_and_fill() {
        let rows = vec![
            row("tomate", "Agriculture", "420,5 g CO₂e"),
            row("tomate", "Transformation", "10 g CO₂e"),
            row("tomate", "Supermarché et distribution", "30 g CO₂e"),
            row("tomate", "Total", "600 g CO₂e"),
            row("tomate", "Total", "999 g CO₂e"),
            row("carotte", "Agriculture", "120 g CO₂e"),
            row("carotte", "Transformation", "20,04 g CO₂e"),
            row("carotte", "Consommation", "?"),
            row("carotte", "Emballage", "5 g CO₂e"),
            row("potiron", "Total", "300 g CO₂e"),
        ];

        let (impacts, warnings) = pivot_impacts("impactco2", &rows);
        assert_eq!(impacts.len(), 3);
        assert_eq!(warnings.len(), 1);

        let tomato = impacts.iter().find(|i| i.vegetable == "Tomate").unwrap();
        assert_eq!(tomato.agriculture, Some(420.5));
        assert_eq!(tomato.distribution, Some(30.0));
        // First value wins
        assert_eq!(tomato.total, Some(600.0));
        assert_eq!(tomato.total_kg_per_kg(), Some(0.6));

        let pumpkin = impacts.iter().find(|i| i.vegetable == "Potimarron").unwrap();
        // Mean of 10 and 20.04, one decimal
        assert_eq!(pumpkin.transformation, Some(15.0));

        let carrot = impacts.iter().find(|i| i.vegetable == "Carotte").unwrap();
        assert_eq!(carrot.transformation, Some(20.0));
        // Nobody has a consumption value: nothing to fill from
        assert_eq!(carrot.consumption, None);
    }
}
