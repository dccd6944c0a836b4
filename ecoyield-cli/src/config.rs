use anyhow::{Context, Result};
use ecoyield_core::Co2Mode;
use ecoyield_ingest::ReferenceWeights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::state::{default_facts_path, default_history_path, ecoyield_home, ensure_ecoyield_home};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub simulation: SimulationSection,
    #[serde(default)]
    pub data: DataSection,
    /// Category → grams per piece
    #[serde(default = "default_reference_weights")]
    pub reference_weights: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    pub total_surface_m2: f64,
    pub years: u32,
    pub bank_rate_percent: f64,
    #[serde(default)]
    pub co2_mode: Co2Mode,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            total_surface_m2: 30.0,
            years: 3,
            bank_rate_percent: 1.7,
            co2_mode: Co2Mode::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataSection {
    pub facts_file: Option<PathBuf>,
    pub price_history_file: Option<PathBuf>,
}

fn default_reference_weights() -> BTreeMap<String, f64> {
    [("Concombre", 400.0), ("Laitue", 450.0), ("Tomate", 150.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulation: SimulationSection::default(),
            data: DataSection::default(),
            reference_weights: default_reference_weights(),
        }
    }
}

impl Config {
    pub fn facts_path(&self) -> Result<PathBuf> {
        match &self.data.facts_file {
            Some(p) => Ok(p.clone()),
            None => default_facts_path(),
        }
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.data.price_history_file {
            Some(p) => Ok(p.clone()),
            None => default_history_path(),
        }
    }

    pub fn reference_weights(&self) -> ReferenceWeights {
        self.reference_weights
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ecoyield_home()?.join("config.toml"))
}

/// Missing file → defaults.
pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    ensure_ecoyield_home()?;
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
