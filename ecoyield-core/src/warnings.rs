//! Non-fatal conditions reported alongside pipeline and simulation results.
//!
//! Nothing in the core aborts: a dropped row or an odd allocation becomes a
//! `Warning` and the caller decides what to show.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// Malformed numeric or unit text; the row was dropped.
    #[error("[{source_id}] could not parse {field} from '{text}' ({label})")]
    ParseFailure {
        source_id: String,
        label: String,
        field: String,
        text: String,
    },

    /// Bulk unit with no conversion factor (e.g. a bundle); the row was dropped.
    #[error("[{source_id}] '{label}' priced per '{unit}' has no kg conversion")]
    UnitExclusion {
        source_id: String,
        label: String,
        unit: String,
    },

    /// Allocated surfaces exceed the declared total; the plan is used as given.
    #[error("allocated {allocated_m2} m² exceeds the declared {total_m2} m² by {excess_m2} m²")]
    AllocationOverflow {
        allocated_m2: f64,
        total_m2: f64,
        excess_m2: f64,
    },

    /// Allocated vegetable absent from the fact table; it contributes nothing.
    #[error("no fact row for '{vegetable}', excluded from the simulation")]
    MissingFactRow { vegetable: String },

    /// Fact row assembled without one of its attributes.
    #[error("'{vegetable}' has no {attribute}: {outcome}")]
    IncompleteFact {
        vegetable: String,
        attribute: String,
        outcome: String,
    },

    /// Negative or non-finite surface in an allocation plan; ignored.
    #[error("surface {surface_m2} m² for '{vegetable}' is not usable, ignored")]
    InvalidSurface { vegetable: String, surface_m2: f64 },
}

impl Warning {
    /// Short machine-friendly label, stable across releases.
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::ParseFailure { .. } => "parse-failure",
            Warning::UnitExclusion { .. } => "unit-exclusion",
            Warning::AllocationOverflow { .. } => "allocation-overflow",
            Warning::MissingFactRow { .. } => "missing-fact-row",
            Warning::IncompleteFact { .. } => "incomplete-fact",
            Warning::InvalidSurface { .. } => "invalid-surface",
        }
    }

    /// True for warnings produced while normalizing scraped rows.
    pub fn is_row_drop(&self) -> bool {
        matches!(self, Warning::ParseFailure { .. } | Warning::UnitExclusion { .. })
    }
}
