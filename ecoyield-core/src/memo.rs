//! Memoized simulation runs for one fact table.
//!
//! The engine is a pure function of (request, facts), so a cache bound to a
//! single fact table can key purely on `SimulationRequest::cache_key`.

use std::collections::HashMap;
use tracing::debug;

use crate::facts::FactTable;
use crate::plan::SimulationRequest;
use crate::simulation::{SimulationOutcome, simulate};

pub struct SimulationCache {
    facts: FactTable,
    entries: HashMap<String, SimulationOutcome>,
    hits: usize,
}

impl SimulationCache {
    pub fn new(facts: FactTable) -> Self {
        Self {
            facts,
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn facts(&self) -> &FactTable {
        &self.facts
    }

    /// Return the cached outcome for `request`, running the simulation on a miss.
    pub fn get_or_run(&mut self, request: &SimulationRequest) -> &SimulationOutcome {
        let key = request.cache_key();
        if self.entries.contains_key(&key) {
            self.hits += 1;
            debug!(%key, "simulation cache hit");
        }
        let facts = &self.facts;
        self.entries
            .entry(key)
            .or_insert_with(|| simulate(request, facts))
    }

    /// Swap in a rebuilt fact table; every cached outcome is discarded.
    pub fn replace_facts(&mut self, facts: FactTable) {
        self.facts = facts;
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}
