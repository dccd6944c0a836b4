//! Equipment catalog and the suggested initial investment for a garden surface.

use serde::{Deserialize, Serialize};

/// Whether an item is bought once or scales with the cultivated surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostKind {
    /// One-off purchase (tools, hose, ...)
    #[serde(rename = "Fixe")]
    Fixed,
    /// Priced per 10 m² of garden (raised beds, potting soil)
    #[serde(rename = "Variable")]
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub item: String,
    pub category: String,
    pub estimated_price: f64,
    pub lifespan_years: u32,
    pub annual_depreciation: f64,
    pub cost_kind: CostKind,
}

impl EquipmentItem {
    pub fn new(
        item: &str,
        category: &str,
        estimated_price: f64,
        lifespan_years: u32,
        cost_kind: CostKind,
    ) -> Self {
        let annual_depreciation = if lifespan_years == 0 {
            estimated_price
        } else {
            estimated_price / f64::from(lifespan_years)
        };
        Self {
            item: item.to_string(),
            category: category.to_string(),
            estimated_price,
            lifespan_years,
            annual_depreciation,
            cost_kind,
        }
    }
}

/// Starter kit for a small vegetable garden.
pub fn default_catalog() -> Vec<EquipmentItem> {
    use CostKind::{Fixed, Variable};
    vec![
        EquipmentItem::new("Bêche / Fourche-bêche", "Outil", 25.0, 10, Fixed),
        EquipmentItem::new("Râteau", "Outil", 20.0, 10, Fixed),
        EquipmentItem::new("Sécateur", "Outil", 15.0, 5, Fixed),
        EquipmentItem::new("Transplantoir", "Outil", 10.0, 10, Fixed),
        EquipmentItem::new("Arrosoir (10L)", "Arrosage", 12.0, 10, Fixed),
        EquipmentItem::new("Tuyau d'arrosage (20m)", "Arrosage", 30.0, 8, Fixed),
        EquipmentItem::new("Terreau de démarrage (100L)", "Consommable", 20.0, 1, Variable),
        EquipmentItem::new("Carré potager bois (1m2)", "Structure", 35.0, 5, Variable),
        EquipmentItem::new("Gants de jardinage", "Protection", 8.0, 2, Fixed),
        EquipmentItem::new("Récupérateur eau de pluie (300L)", "Optimisation", 60.0, 10, Fixed),
        EquipmentItem::new("Serre de semis", "Structure", 60.0, 8, Fixed),
    ]
}

/// Suggested initial investment (€, whole euros) for `surface_m2`.
///
/// Fixed items are bought once; variable items are priced per 10 m². With no
/// variable items the surface part falls back to 5 €/m², and an empty catalog
/// gives 150 € + 5 €/m².
pub fn suggested_investment(catalog: &[EquipmentItem], surface_m2: f64) -> f64 {
    if catalog.is_empty() {
        return (150.0 + surface_m2 * 5.0).round();
    }

    let fixed: f64 = catalog
        .iter()
        .filter(|i| i.cost_kind == CostKind::Fixed)
        .map(|i| i.estimated_price)
        .sum();

    let variable_items: Vec<_> = catalog
        .iter()
        .filter(|i| i.cost_kind == CostKind::Variable)
        .collect();
    let variable = if variable_items.is_empty() {
        surface_m2 * 5.0
    } else {
        variable_items.iter().map(|i| i.estimated_price).sum::<f64>() * (surface_m2 / 10.0)
    };

    (fixed + variable).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_investment() {
        // fixed = 240, variable = 55 per 10 m²
        let catalog = default_catalog();
        assert_eq!(suggested_investment(&catalog, 30.0), 240.0 + 165.0);
        assert_eq!(suggested_investment(&catalog, 10.0), 295.0);
    }

    #[test]
    fn test_empty_catalog_fallback() {
        assert_eq!(suggested_investment(&[], 30.0), 300.0);
    }

    #[test]
    fn test_only_fixed_items() {
        let catalog = vec![EquipmentItem::new("Râteau", "Outil", 20.0, 10, CostKind::Fixed)];
        assert_eq!(suggested_investment(&catalog, 4.0), 40.0);
    }

    #[test]
    fn test_depreciation() {
        let item = EquipmentItem::new("Tuyau d'arrosage (20m)", "Arrosage", 30.0, 8, CostKind::Fixed);
        assert_eq!(item.annual_depreciation, 3.75);
    }
}
