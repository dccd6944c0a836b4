//! Recent wholesale quotes (12-month market price pages).
//!
//! Each product page is titled with the product and its pricing unit, e.g.
//!   CONCOMBRE France (la pièce)
//! and lists one quote per row, cells separated by tabs (or runs of spaces):
//!   Date        Marché         Prix
//!   02/06/25    Rungis         0,85

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::types::RawObservation;

/// Split a product title on its first "(" into (label, unit descriptor).
/// Titles without a unit part are per kg.
pub fn split_product_label(product: &str) -> (String, String) {
    match product.split_once('(') {
        Some((label, unit)) => (
            label.trim().to_string(),
            unit.replace(')', "").trim().to_string(),
        ),
        None => (product.trim().to_string(), "kg".to_string()),
    }
}

/// Quote table reader; the cell and date patterns are compiled once and reused
/// across product pages.
pub struct QuoteTableParser {
    cell_sep: Regex,
    date_re: Regex,
}

impl QuoteTableParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cell_sep: Regex::new(r"\t|\s{2,}")?,
            date_re: Regex::new(r"^\d{2}/\d{2}/\d{2}$")?,
        })
    }

    /// Parse the quote table of one product page.
    ///
    /// Rows need at least three cells: date (dd/mm/yy), anything, price. The header
    /// and every row whose first cell is not a date are skipped.
    pub fn parse(&self, source_id: &str, product: &str, text: &str) -> Vec<RawObservation> {
        let (label, unit) = split_product_label(product);

        let mut out = Vec::new();
        for line in text.lines() {
            let cells: Vec<&str> = self.cell_sep.split(line.trim()).map(str::trim).collect();
            if cells.len() < 3 || !self.date_re.is_match(cells[0]) {
                continue;
            }

            let date = match NaiveDate::parse_from_str(cells[0], "%d/%m/%y") {
                Ok(d) => d,
                Err(_) => {
                    debug!(line, "skipping quote row with invalid date");
                    continue;
                }
            };

            out.push(RawObservation::new(source_id, date, &label, cells[2], &unit));
        }

        out
    }
}
