//! Date-aligned table of named series (savings rates, inflation).

use chrono::NaiveDate;
use ecoyield_ingest::parsers::bank_rates::RateObservation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub date: NaiveDate,
    /// One entry per series of the table; `None` where that series has no value on `date`.
    pub values: BTreeMap<String, Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesTable {
    pub names: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

impl SeriesTable {
    /// Outer join on date. A date present in any series gets a row; a series
    /// with two values on one date keeps the later one.
    pub fn outer_join(series: &[(&str, &[RateObservation])]) -> Self {
        let names: Vec<String> = series.iter().map(|(name, _)| name.to_string()).collect();
        let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, Option<f64>>> = BTreeMap::new();

        for (name, observations) in series {
            for obs in observations.iter() {
                let row = by_date.entry(obs.date).or_insert_with(|| {
                    names.iter().map(|n| (n.clone(), None)).collect()
                });
                row.insert(name.to_string(), Some(obs.value));
            }
        }

        let rows = by_date
            .into_iter()
            .map(|(date, values)| SeriesRow { date, values })
            .collect();
        Self { names, rows }
    }

    /// Rows dated on or after `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        Self {
            names: self.names.clone(),
            rows: self.rows.iter().filter(|r| r.date >= start).cloned().collect(),
        }
    }

    /// Most recent known value of one series.
    pub fn latest(&self, name: &str) -> Option<(NaiveDate, f64)> {
        self.rows
            .iter()
            .rev()
            .find_map(|r| r.values.get(name).copied().flatten().map(|v| (r.date, v)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
