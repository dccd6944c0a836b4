use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ecoyield_core::{
    AllocationPlan, Co2Mode, FactTable, SimulationRequest, Warning, default_catalog, simulate,
    suggested_investment,
};
use ecoyield_ingest::parsers::bank_rates::{LIVRET_A, parse_series_export};
use ecoyield_ingest::{Classifier, Normalizer, fold_accents};
use ecoyield_records::csv_store::{
    read_facts_file, read_history_file, read_scraped_quotes_file, write_averages_file,
    write_history_file,
};
use ecoyield_records::{SeriesTable, average_by_date_category, merge_histories};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "ecoyield",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("ECOYIELD_BUILD_SHA"), ")"),
    about = "Home garden vs savings account projection"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Project a garden plan against leaving the investment in the bank
    Simulate {
        /// Fact table CSV (default: config [data].facts_file, then ~/.ecoyield/facts.csv)
        #[arg(long)]
        facts: Option<PathBuf>,

        /// Total garden surface in m²
        #[arg(long)]
        surface: Option<f64>,

        /// Horizon in years
        #[arg(long)]
        years: Option<u32>,

        /// Savings account rate in percent
        #[arg(long)]
        rate: Option<f64>,

        /// Initial investment in € (default: suggested from the equipment catalog)
        #[arg(long)]
        investment: Option<f64>,

        /// Allocation, repeatable: --plant Tomate=5
        #[arg(long = "plant", value_parser = parse_plant)]
        plants: Vec<(String, f64)>,

        /// How the CO₂ total is derived: elapsed-years | accumulated
        #[arg(long)]
        co2_mode: Option<Co2Mode>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Market price history
    Prices {
        #[command(subcommand)]
        command: PricesCommand,
    },

    /// Fact table commands
    Facts {
        #[command(subcommand)]
        command: FactsCommand,
    },

    /// Suggested starting budget for a surface
    Investment {
        /// Garden surface in m² (default: config)
        #[arg(long)]
        surface: Option<f64>,
    },

    /// Join savings rate exports on date
    Rates {
        /// Series export, repeatable: --series Livret_A=livret_a.json
        #[arg(long = "series", value_parser = parse_series_arg, required = true)]
        series: Vec<(String, PathBuf)>,

        /// Keep rows from this date on
        #[arg(long, default_value = "2020-01-01")]
        since: NaiveDate,
    },

    /// Configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum PricesCommand {
    /// Normalize a scraped Date;Produit;Prix file and merge it into the history
    Update {
        /// Scraped quotes file
        #[arg(long)]
        raw: PathBuf,

        /// Price history file (default: config, then ~/.ecoyield/prix_legumes.csv)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Mean price per (date, category) output (default: ~/.ecoyield/prix_legumes_moyen.csv)
        #[arg(long)]
        averages: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum FactsCommand {
    /// Print the fact table
    Show {
        #[arg(long)]
        facts: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.ecoyield/config.toml with defaults
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("ECOYIELD_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            facts,
            surface,
            years,
            rate,
            investment,
            plants,
            co2_mode,
            json,
        } => {
            let cfg = config::load_config()?;
            let (table, fact_warnings) = load_facts(facts, &cfg)?;

            let total_surface_m2 = surface.unwrap_or(cfg.simulation.total_surface_m2);
            if !total_surface_m2.is_finite() || total_surface_m2 <= 0.0 {
                bail!("surface must be positive (got {total_surface_m2})");
            }
            let years = years.unwrap_or(cfg.simulation.years);
            if years == 0 {
                bail!("years must be at least 1");
            }

            let allocation: AllocationPlan = if plants.is_empty() {
                // Two first vegetables, 1 m² each
                table.names().take(2).map(|n| (n.to_string(), 1.0)).collect()
            } else {
                plan_from_flags(plants, &table)
            };

            let initial_investment = investment
                .unwrap_or_else(|| suggested_investment(&default_catalog(), total_surface_m2));

            let request = SimulationRequest::new(
                total_surface_m2,
                years,
                rate.unwrap_or(cfg.simulation.bank_rate_percent),
                initial_investment,
                allocation,
            )
            .with_co2_mode(co2_mode.unwrap_or(cfg.simulation.co2_mode));

            let mut outcome = simulate(&request, &table);
            outcome.warnings.extend(fact_warnings);

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                render::print_outcome(&request, &outcome);
            }
        }

        Command::Prices { command } => match command {
            PricesCommand::Update { raw, history, averages } => {
                let cfg = config::load_config()?;
                update_prices(&cfg, &raw, history, averages)?;
            }
        },

        Command::Facts { command } => match command {
            FactsCommand::Show { facts } => {
                let cfg = config::load_config()?;
                let (table, warnings) = load_facts(facts, &cfg)?;
                render::print_facts(&table);
                render::print_warnings(&warnings);
            }
        },

        Command::Investment { surface } => {
            let cfg = config::load_config()?;
            let surface = surface.unwrap_or(cfg.simulation.total_surface_m2);
            let catalog = default_catalog();

            for item in &catalog {
                println!(
                    "- {:<34} {:>7.2} € ({:?}, {} yrs, {:.2} €/yr)",
                    item.item, item.estimated_price, item.cost_kind, item.lifespan_years, item.annual_depreciation
                );
            }
            println!(
                "\nSuggested investment for {} m²: {:.0} €",
                surface,
                suggested_investment(&catalog, surface)
            );
        }

        Command::Rates { series, since } => {
            let mut parsed = Vec::with_capacity(series.len());
            for (name, path) in &series {
                let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
                let observations =
                    parse_series_export(&json).with_context(|| format!("parsing {}", path.display()))?;
                parsed.push((name.as_str(), observations));
            }

            let borrowed: Vec<(&str, &[_])> = parsed.iter().map(|(n, o)| (*n, o.as_slice())).collect();
            let table = SeriesTable::outer_join(&borrowed).since(since);
            render::print_series(&table);

            if let Some((date, value)) = table.latest(LIVRET_A) {
                println!("\nLatest {LIVRET_A}: {value:.2}% ({date})");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}

/// "Tomate=5" → ("Tomate", 5.0)
fn parse_plant(s: &str) -> std::result::Result<(String, f64), String> {
    let (name, m2) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=M2, got '{s}'"))?;
    let m2: f64 = m2
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("invalid surface in '{s}'"))?;
    Ok((name.trim().to_string(), m2))
}

fn parse_series_arg(s: &str) -> std::result::Result<(String, PathBuf), String> {
    let (name, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=FILE, got '{s}'"))?;
    Ok((name.trim().to_string(), PathBuf::from(path.trim())))
}

/// `--plant` entries keyed by the fact table's spelling of each name, matched
/// without regard to case or accents. Unknown names are kept as typed.
fn plan_from_flags(plants: Vec<(String, f64)>, table: &FactTable) -> AllocationPlan {
    plants
        .into_iter()
        .map(|(name, m2)| {
            let key = fold_accents(&name);
            let canonical = table
                .names()
                .find(|known| fold_accents(known) == key)
                .map(str::to_string)
                .unwrap_or(name);
            (canonical, m2)
        })
        .collect()
}

/// Fact table from the flag, the config, or the default location; the built-in
/// table when none of them exists. An empty table is fatal.
fn load_facts(flag: Option<PathBuf>, cfg: &config::Config) -> Result<(FactTable, Vec<Warning>)> {
    let path = match flag {
        Some(p) => {
            if !p.exists() {
                bail!("facts file not found: {} (pass --facts <path>)", p.display());
            }
            Some(p)
        }
        None => Some(cfg.facts_path()?).filter(|p| p.exists()),
    };

    let (table, warnings) = match path {
        Some(p) => {
            info!(path = %p.display(), "loading fact table");
            read_facts_file(&p)?
        }
        None => {
            info!("no fact file found, using the built-in table");
            (FactTable::fallback(), Vec::new())
        }
    };

    if table.is_empty() {
        bail!("fact table is empty");
    }
    Ok((table, warnings))
}

fn update_prices(
    cfg: &config::Config,
    raw: &Path,
    history: Option<PathBuf>,
    averages: Option<PathBuf>,
) -> Result<()> {
    if !raw.exists() {
        bail!("scraped file not found: {}", raw.display());
    }
    let source_id = raw
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "scraped".to_string());

    let raws = read_scraped_quotes_file(&source_id, raw)?;
    let classifier = Classifier::default();
    let weights = cfg.reference_weights();
    let normalizer = Normalizer::new(&classifier, &weights)?;
    let report = normalizer.normalize_all(&raws);

    let history_path = match history {
        Some(p) => p,
        None => cfg.history_path()?,
    };
    let averages_path = match averages {
        Some(p) => p,
        None => state::default_averages_path()?,
    };
    for p in [&history_path, &averages_path] {
        if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
    }

    let stored = read_history_file(&history_path)?;
    let merged = merge_histories(&[&stored[..], &report.observations[..]]);
    write_history_file(&history_path, &merged)?;

    let means = average_by_date_category(&merged);
    write_averages_file(&averages_path, &means)?;

    println!("Read {} scraped rows from {}", raws.len(), raw.display());
    println!(
        "Kept {} rows, dropped {}",
        report.observations.len(),
        report.dropped()
    );
    println!("History: {} rows → {}", merged.len(), history_path.display());
    println!("Averages: {} rows → {}", means.len(), averages_path.display());
    render::print_warnings(&report.warnings);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plant() {
        assert_eq!(parse_plant("Tomate=5"), Ok(("Tomate".to_string(), 5.0)));
        assert_eq!(parse_plant("Pomme de terre = 2,5"), Ok(("Pomme de terre".to_string(), 2.5)));
        assert!(parse_plant("Tomate").is_err());
        assert!(parse_plant("Tomate=beaucoup").is_err());
    }

    #[test]
    fn test_parse_series_arg() {
        assert_eq!(
            parse_series_arg("LEP=data/lep.json"),
            Ok(("LEP".to_string(), PathBuf::from("data/lep.json")))
        );
    }

    #[test]
    fn test_plant_names_match_fact_table_spelling() {
        let mut table = FactTable::fallback();
        table.insert(ecoyield_core::VegetableFact::new("Épinard", 2.0, 5.0, 0.1, 1.0, 1.0));

        let plan = plan_from_flags(
            vec![
                ("tomate".to_string(), 5.0),
                ("EPINARD".to_string(), 2.0),
                ("Fenouil".to_string(), 1.0),
            ],
            &table,
        );
        assert_eq!(plan.surface("Tomate"), Some(5.0));
        assert_eq!(plan.surface("Épinard"), Some(2.0));
        assert_eq!(plan.surface("Fenouil"), Some(1.0));
        assert_eq!(plan.surface("tomate"), None);

        let request = SimulationRequest::new(30.0, 1, 1.7, 100.0, plan);
        let outcome = simulate(&request, &table);
        let missing: Vec<_> = outcome
            .warnings
            .iter()
            .filter(|w| w.kind() == "missing-fact-row")
            .collect();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].to_string().contains("Fenouil"));
    }

    #[test]
    fn test_cli_parses_repeated_plants() {
        let cli = Cli::try_parse_from([
            "ecoyield", "simulate", "--plant", "Tomate=5", "--plant", "Carotte=3", "--co2-mode", "accumulated",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate { plants, co2_mode, .. } => {
                assert_eq!(plants.len(), 2);
                assert_eq!(co2_mode, Some(Co2Mode::Accumulated));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
