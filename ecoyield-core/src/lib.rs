//! ecoyield-core: fact table, allocation plans and the garden-vs-bank simulation engine

pub mod facts;
pub mod investment;
pub mod memo;
pub mod plan;
pub mod simulation;
pub mod warnings;

pub use facts::{FactTable, VegetableFact};
pub use investment::{CostKind, EquipmentItem, default_catalog, suggested_investment};
pub use memo::SimulationCache;
pub use plan::{AllocationPlan, SimulationRequest};
pub use simulation::{Co2Mode, SimulationOutcome, SimulationSnapshot, VegetableDetail, simulate};
pub use warnings::Warning;

/// Canonical unit token for normalized prices.
pub const CANONICAL_UNIT: &str = "kg";

/// Round to `places` decimals, half away from zero.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    // Avoid emitting -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Round to cents. All published prices and snapshot figures use this.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}
