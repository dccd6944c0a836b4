//! Merged price history and the per-(date, category) mean table.

use chrono::NaiveDate;
use ecoyield_core::round2;
use ecoyield_ingest::NormalizedObservation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Merge observation tables in the given order.
///
/// A (date, vegetable) pair seen again replaces the earlier row: the table
/// merged last wins. Every other pair is kept. Output is sorted by
/// (category, date, vegetable).
pub fn merge_histories(sources: &[&[NormalizedObservation]]) -> Vec<NormalizedObservation> {
    let mut by_key: BTreeMap<(NaiveDate, String), NormalizedObservation> = BTreeMap::new();
    let mut total = 0usize;

    for source in sources {
        for obs in source.iter() {
            total += 1;
            by_key.insert((obs.date, obs.vegetable_name.clone()), obs.clone());
        }
    }

    let mut merged: Vec<NormalizedObservation> = by_key.into_values().collect();
    merged.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then(a.date.cmp(&b.date))
            .then(a.vegetable_name.cmp(&b.vegetable_name))
    });

    info!(
        input = total,
        merged = merged.len(),
        collapsed = total - merged.len(),
        "merged price histories"
    );
    merged
}

/// Mean price of one category on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrice {
    pub date: NaiveDate,
    pub category: String,
    pub price: f64,
}

/// Unweighted mean per (date, category), rounded to cents, sorted by (date, category).
pub fn average_by_date_category(history: &[NormalizedObservation]) -> Vec<CategoryPrice> {
    let mut sums: BTreeMap<(NaiveDate, &str), (f64, usize)> = BTreeMap::new();
    for obs in history {
        let entry = sums.entry((obs.date, obs.category.as_str())).or_insert((0.0, 0));
        entry.0 += obs.price;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|((date, category), (sum, n))| CategoryPrice {
            date,
            category: category.to_string(),
            price: round2(sum / n as f64),
        })
        .collect()
}

/// Most recent mean price per category.
pub fn latest_price_by_category(averages: &[CategoryPrice]) -> BTreeMap<String, CategoryPrice> {
    let mut latest: BTreeMap<String, CategoryPrice> = BTreeMap::new();
    for row in averages {
        let newer = latest.get(&row.category).is_none_or(|cur| row.date >= cur.date);
        if newer {
            latest.insert(row.category.clone(), row.clone());
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecoyield_ingest::Unit;

    fn obs(date: (i32, u32, u32), category: &str, name: &str, price: f64, source: &str) -> NormalizedObservation {
        NormalizedObservation {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: category.to_string(),
            vegetable_name: name.to_string(),
            price,
            unit: Unit::Kg,
            source_id: source.to_string(),
        }
    }

    #[test]
    fn test_merge_last_source_wins() {
        let old = vec![
            obs((2024, 1, 1), "Tomate", "Tomate ronde", 2.10, "hist"),
            obs((2024, 2, 1), "Tomate", "Tomate ronde", 2.30, "hist"),
        ];
        let new = vec![obs((2024, 1, 1), "Tomate", "Tomate ronde", 2.50, "rnm")];

        let merged = merge_histories(&[&old[..], &new[..]]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].price, 2.50);
        assert_eq!(merged[0].source_id, "rnm");

        // Reversed order: the historical value wins instead
        let merged = merge_histories(&[&new[..], &old[..]]);
        assert_eq!(merged[0].price, 2.10);
    }

    #[test]
    fn test_merge_keeps_distinct_pairs_sorted() {
        let a = vec![
            obs((2024, 3, 1), "Tomate", "Tomate cerise", 4.0, "a"),
            obs((2024, 1, 1), "Carotte", "Carotte", 1.2, "a"),
        ];
        let b = vec![obs((2024, 3, 1), "Tomate", "Tomate ronde", 2.0, "b")];

        let merged = merge_histories(&[&a[..], &b[..]]);
        let names: Vec<&str> = merged.iter().map(|o| o.vegetable_name.as_str()).collect();
        assert_eq!(names, vec!["Carotte", "Tomate cerise", "Tomate ronde"]);
    }

    #[test]
    fn test_average_by_date_category() {
        let history = vec![
            obs((2024, 3, 1), "Tomate", "Tomate cerise", 4.0, "a"),
            obs((2024, 3, 1), "Tomate", "Tomate ronde", 2.25, "a"),
            obs((2024, 3, 1), "Carotte", "Carotte", 1.2, "a"),
        ];
        let averages = average_by_date_category(&history);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].category, "Carotte");
        // (4.0 + 2.25) / 2 = 3.125
        assert_eq!(averages[1].price, 3.13);
    }

    #[test]
    fn test_latest_price_by_category() {
        let averages = vec![
            CategoryPrice { date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), category: "Tomate".into(), price: 3.0 },
            CategoryPrice { date: NaiveDate::from_ymd_opt(2023, 5, 1).unwrap(), category: "Tomate".into(), price: 2.0 },
        ];
        let latest = latest_price_by_category(&averages);
        assert_eq!(latest["Tomate"].price, 3.0);
    }
}
