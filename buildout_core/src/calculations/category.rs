//! # Category Factors
//!
//! Each standard category combines its sliders into a weighted factor:
//!
//! ```text
//! raw      = Σ slider_factor × weight
//! adjusted = raw × UPF
//! $/RSF    = base_rate × adjusted
//! total    = $/RSF × project_size
//! ```
//!
//! Design Fees is the exception. Its raw factor blends the construction raw
//! factor (before the project factor is applied) with the permitting slider:
//!
//! ```text
//! design_raw = construction_raw × 0.70 + permitting × 0.30
//! ```

use serde::{Deserialize, Serialize};

use super::sliders::slider_factor;
use super::{CostCategory, SliderValues};
use crate::config::{BaseValues, SliderConfig};
use crate::units::{DollarsPerRsf, Rsf};

/// Share of the construction factor in the Design Fees blend
pub const DESIGN_CONSTRUCTION_WEIGHT: f64 = 0.70;
/// Share of the permitting slider in the Design Fees blend
pub const DESIGN_PERMITTING_WEIGHT: f64 = 0.30;

/// Computed cost for one category.
///
/// ## JSON Example
///
/// ```json
/// {
///   "category": "Construction",
///   "factor": 1.0,
///   "adjustedFactor": 1.033,
///   "costPerRSF": 154.95,
///   "totalCost": 3873750.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    /// Display name
    pub category: String,

    /// Raw weighted factor (not multiplied by the project factor)
    pub factor: f64,

    /// `factor × unique_project_factor`
    pub adjusted_factor: f64,

    /// `adjusted_factor × base rate`
    #[serde(rename = "costPerRSF")]
    pub cost_per_rsf: f64,

    /// `cost_per_rsf × project_size`
    pub total_cost: f64,
}

impl CategoryResult {
    /// Apply the project factor, base rate and area to a raw factor.
    fn priced(category: CostCategory, factor: f64, unique_project_factor: f64, base_rate: f64, project_size: f64) -> Self {
        let adjusted_factor = factor * unique_project_factor;
        let cost_per_rsf = DollarsPerRsf(base_rate * adjusted_factor);
        let total_cost = cost_per_rsf * Rsf(project_size);
        CategoryResult {
            category: category.display_name().to_string(),
            factor,
            adjusted_factor,
            cost_per_rsf: cost_per_rsf.value(),
            total_cost: total_cost.value(),
        }
    }

    /// Result for a category with nothing configured: factor 1.0, no cost.
    fn unpriced(category: CostCategory) -> Self {
        CategoryResult {
            category: category.display_name().to_string(),
            factor: 1.0,
            adjusted_factor: 0.0,
            cost_per_rsf: 0.0,
            total_cost: 0.0,
        }
    }
}

/// Weighted sum of slider factors, or `None` when no sliders are configured.
pub fn weighted_factor(sliders: &[SliderConfig], values: &SliderValues) -> Option<f64> {
    if sliders.is_empty() {
        return None;
    }
    Some(
        sliders
            .iter()
            .map(|slider| slider_factor(slider, values.get(&slider.id).copied()) * slider.weight)
            .sum(),
    )
}

/// Price one of the five standard categories.
pub fn calculate_category(
    category: CostCategory,
    sliders: &[SliderConfig],
    values: &SliderValues,
    unique_project_factor: f64,
    base: &BaseValues,
    project_size: f64,
) -> CategoryResult {
    match weighted_factor(sliders, values) {
        Some(factor) => CategoryResult::priced(
            category,
            factor,
            unique_project_factor,
            category.base_rate(base),
            project_size,
        ),
        None => {
            tracing::warn!(category = %category, "No sliders configured, category left unpriced");
            CategoryResult::unpriced(category)
        }
    }
}

/// Raw Design Fees factor from the construction raw factor and the
/// permitting slider.
pub fn design_fees_factor(construction_factor: f64, permitting: &SliderConfig, values: &SliderValues) -> f64 {
    let permitting_factor = slider_factor(permitting, values.get(&permitting.id).copied());
    construction_factor * DESIGN_CONSTRUCTION_WEIGHT + permitting_factor * DESIGN_PERMITTING_WEIGHT
}

/// Price Design Fees. `construction` must already be computed in the same
/// invocation; its raw `factor` feeds the blend.
pub fn calculate_design_fees(
    construction: &CategoryResult,
    permitting: &SliderConfig,
    values: &SliderValues,
    unique_project_factor: f64,
    base: &BaseValues,
    project_size: f64,
) -> CategoryResult {
    let factor = design_fees_factor(construction.factor, permitting, values);
    CategoryResult::priced(
        CostCategory::DesignFees,
        factor,
        unique_project_factor,
        base.design_fees,
        project_size,
    )
}
