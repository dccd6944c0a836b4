use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$ECOYIELD_HOME`, or `~/.ecoyield`.
pub fn ecoyield_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("ECOYIELD_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ecoyield"))
}

pub fn ensure_ecoyield_home() -> Result<PathBuf> {
    let dir = ecoyield_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_facts_path() -> Result<PathBuf> {
    Ok(ecoyield_home()?.join("facts.csv"))
}

pub fn default_history_path() -> Result<PathBuf> {
    Ok(ecoyield_home()?.join("prix_legumes.csv"))
}

pub fn default_averages_path() -> Result<PathBuf> {
    Ok(ecoyield_home()?.join("prix_legumes_moyen.csv"))
}
