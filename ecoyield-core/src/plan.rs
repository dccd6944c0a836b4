//! Simulation requests: surface allocation plus financial parameters.
//!
//! A request is a plain value passed into the engine. It carries everything a
//! run depends on, so two equal requests over the same fact table always give
//! the same outcome and can share a cache entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::simulation::Co2Mode;
use crate::warnings::Warning;

/// Vegetable name → cultivated surface (m²).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    surfaces: BTreeMap<String, f64>,
}

impl AllocationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, vegetable: impl Into<String>, surface_m2: f64) -> Self {
        self.set(vegetable, surface_m2);
        self
    }

    /// Set the surface for a vegetable, replacing any previous value.
    pub fn set(&mut self, vegetable: impl Into<String>, surface_m2: f64) {
        self.surfaces.insert(vegetable.into(), surface_m2);
    }

    pub fn surface(&self, vegetable: &str) -> Option<f64> {
        self.surfaces.get(vegetable).copied()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.surfaces.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    /// Sum of the usable (finite, non-negative) surfaces.
    pub fn allocated_m2(&self) -> f64 {
        self.surfaces
            .values()
            .filter(|s| s.is_finite() && **s >= 0.0)
            .sum()
    }

    /// Same plan with every surface multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            surfaces: self
                .surfaces
                .iter()
                .map(|(k, v)| (k.clone(), v * factor))
                .collect(),
        }
    }
}

impl FromIterator<(String, f64)> for AllocationPlan {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut plan = Self::new();
        for (k, v) in iter {
            plan.set(k, v);
        }
        plan
    }
}

/// Everything one simulation run needs besides the fact table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub total_surface_m2: f64,
    /// Horizon N; the trajectory has N + 1 snapshots (years 0..=N).
    pub years: u32,
    /// Annual savings rate in percent (1.7 means 1.7 %).
    pub bank_annual_rate_percent: f64,
    pub initial_investment: f64,
    pub allocation: AllocationPlan,
    #[serde(default)]
    pub co2_mode: Co2Mode,
}

impl SimulationRequest {
    pub fn new(
        total_surface_m2: f64,
        years: u32,
        bank_annual_rate_percent: f64,
        initial_investment: f64,
        allocation: AllocationPlan,
    ) -> Self {
        Self {
            total_surface_m2,
            years,
            bank_annual_rate_percent,
            initial_investment,
            allocation,
            co2_mode: Co2Mode::default(),
        }
    }

    pub fn with_co2_mode(mut self, mode: Co2Mode) -> Self {
        self.co2_mode = mode;
        self
    }

    /// Annual rate as a fraction (0.017 for 1.7 %).
    pub fn annual_rate(&self) -> f64 {
        self.bank_annual_rate_percent / 100.0
    }

    /// Surface left after the allocation (negative when over-subscribed).
    pub fn remaining_m2(&self) -> f64 {
        self.total_surface_m2 - self.allocation.allocated_m2()
    }

    /// Non-fatal problems with the plan itself: over-subscription and unusable surfaces.
    pub fn plan_warnings(&self) -> Vec<Warning> {
        let mut out = Vec::new();

        for (vegetable, surface_m2) in self.allocation.iter() {
            if !surface_m2.is_finite() || surface_m2 < 0.0 {
                out.push(Warning::InvalidSurface {
                    vegetable: vegetable.to_string(),
                    surface_m2,
                });
            }
        }

        let allocated_m2 = self.allocation.allocated_m2();
        if allocated_m2 > self.total_surface_m2 {
            out.push(Warning::AllocationOverflow {
                allocated_m2,
                total_m2: self.total_surface_m2,
                excess_m2: allocated_m2 - self.total_surface_m2,
            });
        }

        out
    }

    /// Memoization key: total surface, years, rate, investment, plan contents and CO₂ mode.
    ///
    /// Floats are keyed by their bit pattern so that distinct inputs never collide.
    pub fn cache_key(&self) -> String {
        let mut key = format!(
            "s={:016x};y={};r={:016x};i={:016x};co2={}",
            self.total_surface_m2.to_bits(),
            self.years,
            self.bank_annual_rate_percent.to_bits(),
            self.initial_investment.to_bits(),
            self.co2_mode.as_str(),
        );
        for (vegetable, surface_m2) in self.allocation.iter() {
            key.push_str(&format!(";{}={:016x}", vegetable, surface_m2.to_bits()));
        }
        key
    }
}
