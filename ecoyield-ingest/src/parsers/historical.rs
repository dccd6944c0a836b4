//! Yearly historical price extracts (one text file per year).
//!
//! Tab-separated lines: product label, then up to twelve monthly prices
//! (January..December). Empty cells mean "no quote that month". Trailing
//! empty cells are significant, so lines are split before any trimming.

use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::classify::fold_accents;
use crate::parsers::market::split_product_label;
use crate::types::RawObservation;

/// Products tracked by default (matched accent-insensitively, anywhere in the label).
pub const DEFAULT_SEARCH_TERMS: [&str; 9] = [
    "CAROTTE",
    "TOMATE",
    "COURGETTE",
    "CONCOMBRE",
    "POIREAU",
    "POMME DE TERRE",
    "LAITUE",
    "COURGE",
    "HARICOTS VERTS",
];

/// True when the folded label contains one of the folded search terms.
pub fn is_tracked(label: &str, search_terms: &[&str]) -> bool {
    let folded = fold_accents(label);
    search_terms
        .iter()
        .any(|term| folded.contains(fold_accents(term).as_str()))
}

/// Parse one year's extract into raw monthly observations (dated the 1st of the month).
pub fn parse_yearly_extract(
    source_id: &str,
    year: i32,
    text: &str,
    search_terms: &[&str],
) -> Result<Vec<RawObservation>> {
    if NaiveDate::from_ymd_opt(year, 1, 1).is_none() {
        bail!("invalid extract year: {year}");
    }

    let mut out = Vec::new();
    for line in text.lines() {
        let cells: Vec<&str> = line.split('\t').collect();
        let Some((product, months)) = cells.split_first() else {
            continue;
        };
        if !is_tracked(product, search_terms) {
            continue;
        }

        let (label, unit) = split_product_label(product);
        for (i, cell) in months.iter().take(12).enumerate() {
            let price = cell.replace('\u{a0}', "");
            let price = price.trim();
            if price.is_empty() {
                continue;
            }
            let Some(date) = NaiveDate::from_ymd_opt(year, i as u32 + 1, 1) else {
                continue;
            };
            out.push(RawObservation::new(source_id, date, &label, price, &unit));
        }
    }

    Ok(out)
}

/// Year from an extract file stem such as "2023" or "2023.txt".
pub fn year_from_file_name(name: &str) -> Option<i32> {
    name.trim_end_matches(".txt").trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tracked_is_accent_insensitive() {
        assert!(is_tracked("Pomme de terre (le kg)", &DEFAULT_SEARCH_TERMS));
        assert!(is_tracked("LAITUE batavia", &DEFAULT_SEARCH_TERMS));
        assert!(is_tracked("Céleri", &["CELERI"]));
        assert!(!is_tracked("RADIS rose", &DEFAULT_SEARCH_TERMS));
    }

    #[test]
    fn test_parse_yearly_extract() {
        let text = "Produit\tjanv\tfévr\n\
                    TOMATE ronde France (le kg)\t2,10\t\t1,95\n\
                    RADIS (la botte)\t0,90\t0,95\n\
                    LAITUE France (la pièce)\t0,80\u{a0}\t0,85\t\t\t\t\t\t\t\t\t\t\t0,99\n";

        let rows = parse_yearly_extract("hist-2023", 2023, text, &DEFAULT_SEARCH_TERMS).unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].raw_label, "TOMATE ronde France");
        assert_eq!(rows[0].raw_unit_text, "le kg");
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        // The empty February cell is skipped, March keeps its position
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(rows[1].raw_price_text, "1,95");

        // NBSP stripped; the 13th price cell is ignored
        assert_eq!(rows[2].raw_price_text, "0,80");
        assert_eq!(rows[3].date, NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
    }

    #[test]
    fn test_year_from_file_name() {
        assert_eq!(year_from_file_name("2021.txt"), Some(2021));
        assert_eq!(year_from_file_name("notes.txt"), None);
    }
}
