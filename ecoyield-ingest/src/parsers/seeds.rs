//! Seed packet prices from an online seed shop search.
//!
//! Each scraped row is (search term, product title, price text).
//! Packets at or above `SEED_PRICE_CEILING` are bulk or gift items, not a
//! garden's seed budget, and are dropped.

use ecoyield_core::{Warning, round2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::capitalize;
use crate::numeric::parse_price_text;

pub const SEED_PRICE_CEILING: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOffer {
    pub category: String,
    pub product: String,
    pub price: f64,
}

/// Clean scraped rows: parse prices, capitalize names, drop duplicates and outliers.
/// Unparseable prices become `ParseFailure` warnings.
pub fn clean_seed_offers(source_id: &str, rows: &[(String, String, String)]) -> (Vec<SeedOffer>, Vec<Warning>) {
    let mut offers: Vec<SeedOffer> = Vec::new();
    let mut warnings = Vec::new();

    for (category, product, price_text) in rows {
        let price = match parse_price_text(price_text) {
            Ok(p) => p,
            Err(_) => {
                warnings.push(Warning::ParseFailure {
                    source_id: source_id.to_string(),
                    label: product.clone(),
                    field: "price".to_string(),
                    text: price_text.clone(),
                });
                continue;
            }
        };

        let offer = SeedOffer {
            category: capitalize(category),
            product: capitalize(product),
            price,
        };
        if offer.price < SEED_PRICE_CEILING && !offers.contains(&offer) {
            offers.push(offer);
        }
    }

    (offers, warnings)
}

/// Mean packet price per category, rounded to cents.
pub fn mean_price_by_category(offers: &[SeedOffer]) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for o in offers {
        let entry = sums.entry(o.category.clone()).or_insert((0.0, 0));
        entry.0 += o.price;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(category, (sum, n))| (category, round2(sum / n as f64)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(c: &str, p: &str, price: &str) -> (String, String, String) {
        (c.to_string(), p.to_string(), price.to_string())
    }

    #[test]
    fn test_clean_and_average() {
        let rows = vec![
            row("CAROTTE", "Carotte nantaise 2", "2,50 €"),
            row("CAROTTE", "Carotte de Colmar", "3,10 €"),
            row("CAROTTE", "Carotte de Colmar", "3,10 €"),
            row("CAROTTE", "Coffret carottes", "12,90 €"),
            row("TOMATE", "Tomate cerise", "N/A"),
            row("TOMATE", "Tomate coeur de boeuf", "2,95 €"),
        ];

        let (offers, warnings) = clean_seed_offers("seeds", &rows);
        assert_eq!(offers.len(), 3);
        assert_eq!(offers[0].category, "Carotte");
        assert_eq!(offers[1].product, "Carotte de colmar");
        assert_eq!(warnings.len(), 1);

        let means = mean_price_by_category(&offers);
        assert_eq!(means.get("Carotte"), Some(&2.8));
        assert_eq!(means.get("Tomate"), Some(&2.95));
    }
}
