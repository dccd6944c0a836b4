//! Savings account rates and inflation from the central bank statistics export.
//!
//! Each series is exported as a JSON array:
//!   [{"time_period_end": "2024-01-31", "obs_value": 3.0}, ...]

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const LIVRET_A: &str = "Livret_A";
pub const LDDS: &str = "LDDS";
pub const LEP: &str = "LEP";
pub const INFLATION: &str = "Inflation";

/// (column name, series key) for every tracked series.
pub const SERIES_KEYS: [(&str, &str); 4] = [
    (LIVRET_A, "MIR1.M.FR.B.L23FRLA.D.R.A.2230U6.EUR.O"),
    (LDDS, "MIR1.M.FR.B.L22FRSP.H.R.A.2250U6.EUR.N"),
    (LEP, "MIR1.M.FR.B.L23FRLP.H.R.A.2250U6.EUR.O"),
    (INFLATION, "ICP.M.FR.N.000000.4.ANR"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub date: NaiveDate,
    /// Percent per year.
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    time_period_end: String,
    obs_value: Option<f64>,
}

/// Parse one series export. Rows without a value or with an unreadable date are skipped.
pub fn parse_series_export(json: &str) -> Result<Vec<RateObservation>> {
    let rows: Vec<ExportRow> =
        serde_json::from_str(json).context("Failed to parse rate series export")?;

    let mut out: Vec<RateObservation> = rows
        .into_iter()
        .filter_map(|row| {
            // Timestamps ("2024-01-31T00:00:00+00:00") keep their date part
            let day = row.time_period_end.get(..10).unwrap_or(&row.time_period_end);
            let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") else {
                debug!(date = row.time_period_end.as_str(), "skipping rate row with invalid date");
                return None;
            };
            row.obs_value.map(|value| RateObservation { date, value })
        })
        .collect();

    out.sort_by_key(|o| o.date);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_export() {
        let json = r#"[
            {"time_period_end": "2024-02-29", "obs_value": 3.0},
            {"time_period_end": "2023-08-31T00:00:00+00:00", "obs_value": 3.0},
            {"time_period_end": "2024-03-31", "obs_value": null},
            {"time_period_end": "bientôt", "obs_value": 2.5}
        ]"#;

        let rows = parse_series_export(json).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2023, 8, 31).unwrap());
        assert_eq!(rows[1].value, 3.0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_series_export("{not json").is_err());
    }
}
