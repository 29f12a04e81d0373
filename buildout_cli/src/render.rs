//! Plain-text output for the terminal.

use buildout_core::calculations::sliders::default_position;
use buildout_core::comparison::{ComparisonRow, EstimateComparison};
use buildout_core::units::{Dollars, DollarsPerRsf, Rsf};
use buildout_core::{CostConfig, Project, ProjectInput, ProjectOutput};

const RULE: &str = "═══════════════════════════════════════════════════════════════";

fn header(title: &str) {
    println!("{RULE}");
    println!("  {title}");
    println!("{RULE}");
}

pub fn print_estimate(input: &ProjectInput, output: &ProjectOutput) {
    header(&format!("BUILD-OUT ESTIMATE: {}", input.project_name));
    println!();
    println!("Project:");
    println!("  Size:      {}", Rsf(input.project_size));
    println!("  Floors:    {}", input.floors);
    println!("  Location:  {}", input.location);
    println!(
        "  Factor:    {:.3} (size {:.2}, floors {:.2}, location {:.2})",
        output.unique_project_factor, output.size_factor, output.floor_factor, output.location_factor
    );
    println!();
    println!("{:<18} {:>8} {:>10} {:>14} {:>16}", "Category", "Factor", "Adjusted", "$/RSF", "Total");
    for category in &output.categories {
        println!(
            "{:<18} {:>8.3} {:>10.3} {:>14} {:>16}",
            category.category,
            category.factor,
            category.adjusted_factor,
            format!("{:.2}", category.cost_per_rsf),
            Dollars(category.total_cost).to_string()
        );
    }
    println!();
    println!("  Subtotal:           {:>16}", Dollars(output.subtotal).to_string());
    println!(
        "  Contingency ({:>4.1}%): {:>15}",
        output.contingency_percent * 100.0,
        Dollars(output.contingency).to_string()
    );
    println!("  Grand Total:        {:>16}", Dollars(output.grand_total).to_string());
    println!("                      {:>16}", DollarsPerRsf(output.grand_total_per_rsf).to_string());
    if output.ti_allowance_per_sf != 0.0 {
        println!(
            "  TI Allowance:       {:>16}  ({})",
            Dollars(-output.ti_allowance_total).to_string(),
            DollarsPerRsf(output.ti_allowance_per_sf)
        );
        println!("  Client Total:       {:>16}", Dollars(output.client_total).to_string());
        println!("                      {:>16}", DollarsPerRsf(output.client_total_per_rsf).to_string());
    }
    println!("{RULE}");
}

pub fn print_sliders(config: &CostConfig) {
    header("SLIDERS");
    let mut current = None;
    for (category, slider) in config.sliders.iter() {
        if current != Some(category) {
            println!();
            println!("{}:", category.display_name());
            current = Some(category);
        }
        println!(
            "  {:<24} weight {:.2}  factor {:.2}-{:.2}  default {:.2} @ {:.0}",
            slider.id,
            slider.weight,
            slider.low_factor,
            slider.high_factor,
            slider.default_value,
            default_position(slider)
        );
    }
}

pub fn print_locations(config: &CostConfig) {
    header("LOCATION FACTORS");
    for (name, factor) in &config.location_factors {
        println!("  {name:<24} {factor:.2}");
    }
    println!();
    println!("  Unlisted locations use 1.00");
}

pub fn print_estimate_list(project: &Project) {
    header(&format!("PROJECT: {}", project.meta.name));
    if project.estimate_count() == 0 {
        println!("  No saved estimates");
        return;
    }
    for (id, estimate) in project.estimates_sorted() {
        println!(
            "  {}  {:<28} {:>16}  {}",
            id,
            estimate.name,
            Dollars(estimate.summary.grand_total).to_string(),
            estimate.saved_at.format("%Y-%m-%d %H:%M")
        );
    }
}

pub fn print_comparison(comparison: &EstimateComparison) {
    header(&format!("{} vs {}", comparison.left_name, comparison.right_name));
    println!();
    println!("{:<18} {:>16} {:>16} {:>16} {:>9}", "", "Left", "Right", "Difference", "Change");
    for row in &comparison.categories {
        print_row(row, |v| Dollars(v).to_string());
    }
    println!();
    for row in &comparison.totals {
        if row.label.ends_with("/ RSF") {
            print_row(row, |v| format!("{v:.2}"));
        } else {
            print_row(row, |v| Dollars(v).to_string());
        }
    }

    let diff = &comparison.input_differences;
    if diff.is_empty() {
        println!();
        println!("  Inputs identical");
        return;
    }
    let mut changed = Vec::new();
    for (flag, label) in [
        (diff.project_size, "project size"),
        (diff.floors, "floors"),
        (diff.location, "location"),
        (diff.ti_allowance, "TI allowance"),
        (diff.contingency, "contingency"),
        (diff.base_values, "base rates"),
    ] {
        if flag {
            changed.push(label.to_string());
        }
    }
    changed.extend(diff.sliders.iter().map(|id| format!("slider {id}")));
    println!();
    println!("  Changed inputs: {}", changed.join(", "));
}

fn print_row(row: &ComparisonRow, money: impl Fn(f64) -> String) {
    let change = row
        .percent_change
        .map_or_else(|| "n/a".to_string(), |p| format!("{p:+.1}%"));
    println!(
        "{:<18} {:>16} {:>16} {:>16} {:>9}",
        row.label,
        money(row.left),
        money(row.right),
        money(row.difference),
        change
    );
}
