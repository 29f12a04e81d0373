//! # Estimate Comparison
//!
//! Side-by-side comparison of two saved estimates. Works entirely from the
//! stored snapshots; nothing is recomputed, so a comparison reflects exactly
//! what each estimate showed when it was saved.
//!
//! `difference` is always `right - left` and `percent_change` is relative to
//! the left value (`None` when the left value is zero).

use serde::{Deserialize, Serialize};

use crate::project::SavedEstimate;

/// One compared figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub label: String,
    pub left: f64,
    pub right: f64,
    pub difference: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
}

impl ComparisonRow {
    pub fn new(label: impl Into<String>, left: f64, right: f64) -> Self {
        let difference = right - left;
        let percent_change = if left == 0.0 { None } else { Some(difference / left * 100.0) };
        ComparisonRow {
            label: label.into(),
            left,
            right,
            difference,
            percent_change,
        }
    }
}

/// Inputs that differ between the two estimates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDifferences {
    pub project_size: bool,
    pub floors: bool,
    pub location: bool,
    pub ti_allowance: bool,
    pub contingency: bool,
    pub base_values: bool,
    /// Slider ids whose supplied positions differ (present on one side only
    /// counts as different)
    pub sliders: Vec<String>,
}

impl InputDifferences {
    pub fn is_empty(&self) -> bool {
        !(self.project_size
            || self.floors
            || self.location
            || self.ti_allowance
            || self.contingency
            || self.base_values)
            && self.sliders.is_empty()
    }
}

/// Full side-by-side comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateComparison {
    pub left_name: String,
    pub right_name: String,
    /// Per-category totals in output order
    pub categories: Vec<ComparisonRow>,
    /// Subtotal, contingency, grand total, client total, grand total per RSF
    pub totals: Vec<ComparisonRow>,
    pub input_differences: InputDifferences,
}

/// Compare two saved estimates.
pub fn compare_estimates(left: &SavedEstimate, right: &SavedEstimate) -> EstimateComparison {
    let categories = left
        .summary
        .category_totals
        .iter()
        .map(|(name, left_total)| {
            let right_total = right
                .summary
                .category_totals
                .iter()
                .find(|(other, _)| other == name)
                .map_or(0.0, |(_, total)| *total);
            ComparisonRow::new(name.clone(), *left_total, right_total)
        })
        .collect();

    let (l, r) = (&left.summary, &right.summary);
    let totals = vec![
        ComparisonRow::new("Subtotal", l.subtotal, r.subtotal),
        ComparisonRow::new("Contingency", l.contingency, r.contingency),
        ComparisonRow::new("Grand Total", l.grand_total, r.grand_total),
        ComparisonRow::new("Client Total", l.client_total, r.client_total),
        ComparisonRow::new("Grand Total / RSF", l.grand_total_per_rsf, r.grand_total_per_rsf),
    ];

    EstimateComparison {
        left_name: left.name.clone(),
        right_name: right.name.clone(),
        categories,
        totals,
        input_differences: input_differences(left, right),
    }
}

fn input_differences(left: &SavedEstimate, right: &SavedEstimate) -> InputDifferences {
    let (a, b) = (&left.input, &right.input);

    let mut sliders: Vec<String> = left
        .slider_values
        .iter()
        .filter(|(id, value)| right.slider_values.get(*id) != Some(*value))
        .map(|(id, _)| id.clone())
        .collect();
    sliders.extend(
        right
            .slider_values
            .keys()
            .filter(|id| !left.slider_values.contains_key(*id))
            .cloned(),
    );
    sliders.sort();

    InputDifferences {
        project_size: a.project_size != b.project_size,
        floors: a.floors != b.floors,
        location: a.location != b.location,
        ti_allowance: a.ti_allowance() != b.ti_allowance(),
        contingency: a.contingency_percent != b.contingency_percent,
        base_values: left.base_values != right.base_values,
        sliders,
    }
}
