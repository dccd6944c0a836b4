//! CSV files exchanged with the scraping side and the dashboard.
//!
//! Fact table (comma separated):
//!   Nom_Legume,Rendement_kg_m2,Prix_Marche_kg,CO2_Economise_m2,Cout_Eau_m2,Prix_graine
//! where CO2_Economise_m2 is grams of CO₂ per m².
//!
//! Price history (semicolon separated):
//!   Date;Categorie;Legume;Prix;Unite
//!
//! Mean price table (comma separated):
//!   Date,Categorie,Prix
//!
//! Scraped quotes (semicolon separated, product title carries the unit):
//!   Date;Produit;Prix

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ecoyield_core::{FactTable, VegetableFact, Warning, round2};
use ecoyield_ingest::parsers::market::split_product_label;
use ecoyield_ingest::{NormalizedObservation, RawObservation, Unit};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use crate::history::CategoryPrice;

/// Source id given to rows read back from the history file.
pub const HISTORY_SOURCE_ID: &str = "history";

#[derive(Debug, Serialize, Deserialize)]
struct FactCsvRow {
    #[serde(rename = "Nom_Legume")]
    name: String,
    #[serde(rename = "Rendement_kg_m2", deserialize_with = "csv::invalid_option")]
    yield_kg_m2: Option<f64>,
    #[serde(rename = "Prix_Marche_kg", deserialize_with = "csv::invalid_option")]
    price_kg: Option<f64>,
    #[serde(rename = "CO2_Economise_m2", deserialize_with = "csv::invalid_option")]
    co2_g_m2: Option<f64>,
    #[serde(rename = "Cout_Eau_m2", deserialize_with = "csv::invalid_option")]
    water_m2: Option<f64>,
    #[serde(rename = "Prix_graine", deserialize_with = "csv::invalid_option")]
    seed: Option<f64>,
}

/// Read a fact table.
///
/// Rows without a usable yield or price are dropped; other missing figures
/// count as 0. Both are reported as `IncompleteFact`.
pub fn read_facts<R: Read>(reader: R) -> Result<(FactTable, Vec<Warning>)> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut table = FactTable::new();
    let mut warnings = Vec::new();

    for result in rdr.deserialize::<FactCsvRow>() {
        let row = result.context("Failed to read fact row")?;
        let incomplete = |attribute: &str, outcome: &str| Warning::IncompleteFact {
            vegetable: row.name.clone(),
            attribute: attribute.to_string(),
            outcome: outcome.to_string(),
        };

        let Some(yield_kg) = row.yield_kg_m2.filter(|y| *y > 0.0) else {
            warnings.push(incomplete("yield", "row dropped"));
            continue;
        };
        let Some(price) = row.price_kg else {
            warnings.push(incomplete("price", "row dropped"));
            continue;
        };

        let mut or_zero = |value: Option<f64>, attribute: &str| {
            value.unwrap_or_else(|| {
                warnings.push(incomplete(attribute, "assumed 0"));
                0.0
            })
        };
        let co2_g_m2 = or_zero(row.co2_g_m2, "co2");
        let water = or_zero(row.water_m2, "water cost");
        let seed = or_zero(row.seed, "seed cost");

        let fact = VegetableFact::new(
            row.name.clone(),
            yield_kg,
            price,
            co2_g_m2 / 1000.0 / yield_kg,
            water,
            seed,
        );
        if !fact.is_valid() {
            debug!(vegetable = fact.name.as_str(), "dropping invalid fact row");
            warnings.push(incomplete("valid coefficients", "row dropped"));
            continue;
        }
        table.insert(fact);
    }

    Ok((table, warnings))
}

pub fn read_facts_file(path: impl AsRef<Path>) -> Result<(FactTable, Vec<Warning>)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_facts(file).with_context(|| format!("reading {}", path.display()))
}

pub fn write_facts<W: Write>(writer: W, table: &FactTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for fact in table.iter() {
        wtr.serialize(FactCsvRow {
            name: fact.name.clone(),
            yield_kg_m2: Some(fact.yield_kg_per_m2),
            price_kg: Some(fact.price_per_kg),
            co2_g_m2: Some(round2(fact.co2_saved_g_per_m2())),
            water_m2: Some(fact.water_cost_per_m2),
            seed: Some(fact.seed_cost_per_m2),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_facts_file(path: impl AsRef<Path>, table: &FactTable) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_facts(file, table)
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryCsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Categorie")]
    category: String,
    #[serde(rename = "Legume")]
    vegetable: String,
    #[serde(rename = "Prix")]
    price: f64,
    #[serde(rename = "Unite")]
    unit: Unit,
}

pub fn read_history<R: Read>(reader: R) -> Result<Vec<NormalizedObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for result in rdr.deserialize::<HistoryCsvRow>() {
        let row = result.context("Failed to read price history row")?;
        out.push(NormalizedObservation {
            date: row.date,
            category: row.category,
            vegetable_name: row.vegetable,
            price: row.price,
            unit: row.unit,
            source_id: HISTORY_SOURCE_ID.to_string(),
        });
    }
    Ok(out)
}

/// Missing history file → empty history.
pub fn read_history_file(path: impl AsRef<Path>) -> Result<Vec<NormalizedObservation>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_history(file).with_context(|| format!("reading {}", path.display()))
}

pub fn write_history<W: Write>(writer: W, history: &[NormalizedObservation]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    for obs in history {
        wtr.serialize(HistoryCsvRow {
            date: obs.date,
            category: obs.category.clone(),
            vegetable: obs.vegetable_name.clone(),
            price: obs.price,
            unit: obs.unit.clone(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_history_file(path: impl AsRef<Path>, history: &[NormalizedObservation]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_history(file, history)
}

#[derive(Debug, Serialize)]
struct AverageCsvRow<'a> {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Categorie")]
    category: &'a str,
    #[serde(rename = "Prix")]
    price: f64,
}

pub fn write_averages<W: Write>(writer: W, averages: &[CategoryPrice]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in averages {
        wtr.serialize(AverageCsvRow {
            date: row.date,
            category: &row.category,
            price: row.price,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_averages_file(path: impl AsRef<Path>, averages: &[CategoryPrice]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_averages(file, averages)
}

fn parse_scraped_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .ok()
}

/// Read a scraped quote file into raw observations. Rows with an unreadable
/// date are skipped; price text is kept as scraped.
pub fn read_scraped_quotes<R: Read>(source_id: &str, reader: R) -> Result<Vec<RawObservation>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = Vec::new();
    for result in rdr.records() {
        let record = result.context("Failed to read scraped quote row")?;
        let date_str = record.get(0).unwrap_or("");
        let Some(date) = parse_scraped_date(date_str) else {
            debug!(date = date_str, "skipping scraped row with invalid date");
            continue;
        };
        let (label, unit) = split_product_label(record.get(1).unwrap_or(""));
        let price = record.get(2).unwrap_or("");
        out.push(RawObservation::new(source_id, date, label, price, unit));
    }
    Ok(out)
}

pub fn read_scraped_quotes_file(source_id: &str, path: impl AsRef<Path>) -> Result<Vec<RawObservation>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_scraped_quotes(source_id, file).with_context(|| format!("reading {}", path.display()))
}
