//! Year-by-year projection: cultivating a garden vs. leaving the same sum in a bank account.
//!
//! State machine over years 0..=N:
//! - year 0: the garden is down by the initial investment, the bank holds it in full
//! - each following year: the allocated surfaces produce, sell and cost the same
//!   amount again (costs recur, nothing is capitalized) while the bank compounds once
//!
//! Snapshot figures are rounded to cents; the running state is kept unrounded so
//! rounding never accumulates across years.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::facts::{FactTable, VegetableFact};
use crate::plan::SimulationRequest;
use crate::round2;
use crate::warnings::Warning;

/// How the CO₂ figure of a snapshot is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Co2Mode {
    /// The latest year's savings multiplied by the number of elapsed years.
    #[default]
    ElapsedYears,
    /// True running total of each year's savings.
    Accumulated,
}

impl Co2Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Co2Mode::ElapsedYears => "elapsed-years",
            Co2Mode::Accumulated => "accumulated",
        }
    }
}

impl fmt::Display for Co2Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Co2Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "elapsed-years" | "elapsed" => Ok(Co2Mode::ElapsedYears),
            "accumulated" | "cumulative" => Ok(Co2Mode::Accumulated),
            other => anyhow::bail!("unknown CO₂ mode '{other}' (expected elapsed-years or accumulated)"),
        }
    }
}

/// One year of the trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub year: u32,
    /// Cumulative garden result net of the initial outlay (€)
    pub garden_net_profit: f64,
    /// Value of the investment left in the bank (€)
    pub bank_value: f64,
    /// Harvest of this year (kg)
    pub production_kg: f64,
    /// CO₂ saved so far, per the request's `Co2Mode` (kg)
    pub co2_saved_kg: f64,
    /// Market value of this year's harvest (€)
    pub annual_revenue: f64,
}

/// Per-vegetable breakdown for the reference year (year 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetableDetail {
    pub vegetable: String,
    pub surface_m2: f64,
    pub production_kg: f64,
    pub value_eur: f64,
    pub co2_saved_kg: f64,
}

/// Result of a run: the N + 1 snapshots, the detail rows and every warning raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub snapshots: Vec<SimulationSnapshot>,
    pub details: Vec<VegetableDetail>,
    pub warnings: Vec<Warning>,
}

impl SimulationOutcome {
    /// Last snapshot of the trajectory (year N).
    pub fn final_snapshot(&self) -> Option<&SimulationSnapshot> {
        self.snapshots.last()
    }

    pub fn snapshot(&self, year: u32) -> Option<&SimulationSnapshot> {
        self.snapshots.iter().find(|s| s.year == year)
    }

    /// First year in which the garden has paid back the investment.
    pub fn break_even_year(&self) -> Option<u32> {
        self.snapshots
            .iter()
            .find(|s| s.year > 0 && s.garden_net_profit >= 0.0)
            .map(|s| s.year)
    }
}

/// Yearly aggregates over the active part of the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct YearFigures {
    production_kg: f64,
    revenue: f64,
    cost: f64,
    co2_kg: f64,
}

#[derive(Debug, Clone, Copy)]
struct EngineState {
    year: u32,
    /// Sum of yearly (revenue - cost), before subtracting the investment
    cumulative_garden_profit: f64,
    bank_value: f64,
    co2_total_kg: f64,
}

impl EngineState {
    fn initial(initial_investment: f64) -> Self {
        Self {
            year: 0,
            cumulative_garden_profit: 0.0,
            bank_value: initial_investment,
            co2_total_kg: 0.0,
        }
    }

    fn step(&mut self, figures: &YearFigures, annual_rate: f64, mode: Co2Mode) {
        self.year += 1;
        self.cumulative_garden_profit += figures.revenue - figures.cost;
        self.bank_value *= 1.0 + annual_rate;
        self.co2_total_kg = match mode {
            Co2Mode::ElapsedYears => figures.co2_kg * f64::from(self.year),
            Co2Mode::Accumulated => self.co2_total_kg + figures.co2_kg,
        };
    }

    fn snapshot(&self, initial_investment: f64, figures: &YearFigures) -> SimulationSnapshot {
        SimulationSnapshot {
            year: self.year,
            garden_net_profit: round2(self.cumulative_garden_profit - initial_investment),
            bank_value: round2(self.bank_value),
            production_kg: round2(figures.production_kg),
            co2_saved_kg: round2(self.co2_total_kg),
            annual_revenue: round2(figures.revenue),
        }
    }
}

/// Figures for a single allocated vegetable over one year.
fn vegetable_year(fact: &VegetableFact, surface_m2: f64) -> YearFigures {
    let production_kg = surface_m2 * fact.yield_kg_per_m2;
    YearFigures {
        production_kg,
        revenue: production_kg * fact.price_per_kg,
        cost: surface_m2 * fact.cost_per_m2(),
        co2_kg: production_kg * fact.co2_saved_kg_per_kg,
    }
}

/// Resolve the plan against the fact table: (fact, surface) pairs for surfaces > 0,
/// plus a `MissingFactRow` warning per vegetable the table does not know.
fn active_rows<'a>(
    request: &SimulationRequest,
    facts: &'a FactTable,
    warnings: &mut Vec<Warning>,
) -> Vec<(&'a VegetableFact, f64)> {
    let mut out = Vec::new();
    for (vegetable, surface_m2) in request.allocation.iter() {
        if !(surface_m2.is_finite() && surface_m2 > 0.0) {
            continue;
        }
        match facts.get(vegetable) {
            Some(fact) => out.push((fact, surface_m2)),
            None => {
                warn!(vegetable, "allocated vegetable has no fact row");
                warnings.push(Warning::MissingFactRow {
                    vegetable: vegetable.to_string(),
                });
            }
        }
    }
    out
}

/// Run the projection for `request.years` years.
///
/// Never fails: over-subscribed plans, unusable surfaces and unknown vegetables
/// only add warnings, and the trajectory always has `years + 1` snapshots.
pub fn simulate(request: &SimulationRequest, facts: &FactTable) -> SimulationOutcome {
    let mut warnings = request.plan_warnings();
    for w in &warnings {
        warn!(%w, "allocation plan");
    }

    let active = active_rows(request, facts, &mut warnings);

    let details = active
        .iter()
        .map(|(fact, surface_m2)| {
            let f = vegetable_year(fact, *surface_m2);
            VegetableDetail {
                vegetable: fact.name.clone(),
                surface_m2: *surface_m2,
                production_kg: round2(f.production_kg),
                value_eur: round2(f.revenue),
                co2_saved_kg: round2(f.co2_kg),
            }
        })
        .collect();

    let annual_rate = request.annual_rate();
    let mut state = EngineState::initial(request.initial_investment);
    let mut snapshots = Vec::with_capacity(request.years as usize + 1);
    snapshots.push(state.snapshot(request.initial_investment, &YearFigures::default()));

    for _ in 0..request.years {
        let mut figures = YearFigures::default();
        for (fact, surface_m2) in &active {
            let f = vegetable_year(fact, *surface_m2);
            figures.production_kg += f.production_kg;
            figures.revenue += f.revenue;
            figures.cost += f.cost;
            figures.co2_kg += f.co2_kg;
        }

        state.step(&figures, annual_rate, request.co2_mode);
        snapshots.push(state.snapshot(request.initial_investment, &figures));
    }

    debug!(
        years = request.years,
        vegetables = active.len(),
        warnings = warnings.len(),
        "simulation complete"
    );

    SimulationOutcome {
        snapshots,
        details,
        warnings,
    }
}
