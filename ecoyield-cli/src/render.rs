//! Plain-text tables for the terminal.

use ecoyield_core::{FactTable, SimulationOutcome, SimulationRequest, Warning};
use ecoyield_records::SeriesTable;

pub fn print_outcome(request: &SimulationRequest, outcome: &SimulationOutcome) {
    println!(
        "# Garden vs bank over {} years ({} m², {:.2} € invested at {}%)\n",
        request.years, request.total_surface_m2, request.initial_investment, request.bank_annual_rate_percent
    );

    if let Some(last) = outcome.final_snapshot() {
        println!("Harvest value / year : {:.2} €", last.annual_revenue);
        println!("CO₂ saved (total)    : {:.2} kg ({})", last.co2_saved_kg, request.co2_mode);
        println!("Production / year    : {:.2} kg", last.production_kg);
        match outcome.break_even_year() {
            Some(y) => println!("Break-even           : year {y}"),
            None => println!("Break-even           : not within {} years", request.years),
        }
        println!();
    }

    println!("{:>4}  {:>14}  {:>12}  {:>10}  {:>10}  {:>12}", "year", "garden net €", "bank €", "kg", "CO₂ kg", "revenue €");
    for s in &outcome.snapshots {
        println!(
            "{:>4}  {:>14.2}  {:>12.2}  {:>10.2}  {:>10.2}  {:>12.2}",
            s.year, s.garden_net_profit, s.bank_value, s.production_kg, s.co2_saved_kg, s.annual_revenue
        );
    }

    if !outcome.details.is_empty() {
        println!("\n## Per vegetable (one year)\n");
        for d in &outcome.details {
            println!(
                "- {}: {} m² → {:.2} kg, {:.2} €, {:.2} kg CO₂",
                d.vegetable, d.surface_m2, d.production_kg, d.value_eur, d.co2_saved_kg
            );
        }
    }

    let remaining = request.remaining_m2();
    if remaining >= 0.0 {
        println!("\nFree surface: {remaining} m²");
    }

    print_warnings(&outcome.warnings);
}

pub fn print_facts(facts: &FactTable) {
    println!(
        "{:<18} {:>10} {:>8} {:>12} {:>10} {:>10}",
        "vegetable", "kg/m²", "€/kg", "CO₂ kg/kg", "water €/m²", "seeds €"
    );
    for f in facts.iter() {
        println!(
            "{:<18} {:>10.2} {:>8.2} {:>12.3} {:>10.2} {:>10.2}",
            f.name, f.yield_kg_per_m2, f.price_per_kg, f.co2_saved_kg_per_kg, f.water_cost_per_m2, f.seed_cost_per_m2
        );
    }
}

pub fn print_series(table: &SeriesTable) {
    print!("{:<12}", "date");
    for name in &table.names {
        print!(" {:>10}", name);
    }
    println!();
    for row in &table.rows {
        print!("{:<12}", row.date);
        for name in &table.names {
            match row.values.get(name).copied().flatten() {
                Some(v) => print!(" {:>10.2}", v),
                None => print!(" {:>10}", "-"),
            }
        }
        println!();
    }
}

pub fn print_warnings(warnings: &[Warning]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n## Warnings ({})\n", warnings.len());
    for w in warnings {
        println!("- [{}] {}", w.kind(), w);
    }
}
