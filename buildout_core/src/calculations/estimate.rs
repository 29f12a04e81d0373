//! # Project Estimate
//!
//! Top-level entry point: project inputs, slider positions and base rates in,
//! a fully itemized [`ProjectOutput`] out.
//!
//! ## Calculation Order
//!
//! 1. Unique Project Factor from size, floors and location
//! 2. The five standard categories (Construction first)
//! 3. Design Fees, from Construction's raw factor and the permitting slider
//! 4. Subtotal, contingency, grand total, TI allowance, client total
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::calculations::{compute_project_costs, ProjectInput, SliderValues};
//! use buildout_core::config::CostConfig;
//!
//! let config = CostConfig::default();
//! let input = ProjectInput::new("Suite 400", 25_000.0, 1, "New York, NY")
//!     .with_ti_allowance(10.0);
//!
//! let mut sliders = SliderValues::new();
//! sliders.insert("finish_level".to_string(), 75.0);
//!
//! let output = compute_project_costs(&config, &input, &sliders, None).unwrap();
//! assert!((output.grand_total - output.client_total - 250_000.0).abs() < 1e-6);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::{calculate_category, calculate_design_fees, CategoryResult};
use super::project_factor;
use super::CostCategory;
use crate::config::{BaseValues, CostConfig};
use crate::errors::{CostError, CostResult};
use crate::units::{Dollars, DollarsPerRsf, Rsf};

/// Slider id to 0-100 position. Positions are not clamped.
pub type SliderValues = BTreeMap<String, f64>;

/// Project inputs for one calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "projectName": "Suite 400",
///   "projectSize": 25000,
///   "floors": 1,
///   "location": "New York, NY",
///   "tiAllowancePerSF": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    /// Display only
    pub project_name: String,

    /// Rentable area (RSF), must be positive
    pub project_size: f64,

    /// Floor count, must be at least 1
    pub floors: u32,

    /// Location key; unknown keys are priced neutrally
    pub location: String,

    /// Tenant-improvement credit per RSF (defaults to 0)
    #[serde(rename = "tiAllowancePerSF", default, skip_serializing_if = "Option::is_none")]
    pub ti_allowance_per_sf: Option<f64>,

    /// Contingency override as a decimal fraction; the configured default
    /// applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contingency_percent: Option<f64>,
}

impl ProjectInput {
    pub fn new(project_name: impl Into<String>, project_size: f64, floors: u32, location: impl Into<String>) -> Self {
        ProjectInput {
            project_name: project_name.into(),
            project_size,
            floors,
            location: location.into(),
            ti_allowance_per_sf: None,
            contingency_percent: None,
        }
    }

    /// Set the TI allowance ($/RSF)
    pub fn with_ti_allowance(mut self, per_sf: f64) -> Self {
        self.ti_allowance_per_sf = Some(per_sf);
        self
    }

    /// Override the contingency (decimal fraction)
    pub fn with_contingency(mut self, percent: f64) -> Self {
        self.contingency_percent = Some(percent);
        self
    }

    /// Validate input parameters.
    ///
    /// Per-area results divide by `project_size`, so zero, negative and
    /// non-finite sizes are rejected here rather than producing infinities.
    pub fn validate(&self) -> CostResult<()> {
        if !self.project_size.is_finite() || self.project_size <= 0.0 {
            return Err(CostError::invalid_input(
                "projectSize",
                self.project_size.to_string(),
                "Project size must be a positive number of RSF",
            ));
        }
        if self.floors == 0 {
            return Err(CostError::invalid_input(
                "floors",
                "0",
                "A project occupies at least one floor",
            ));
        }
        if let Some(ti) = self.ti_allowance_per_sf {
            if !ti.is_finite() || ti < 0.0 {
                return Err(CostError::invalid_input(
                    "tiAllowancePerSF",
                    ti.to_string(),
                    "TI allowance must be finite and non-negative",
                ));
            }
        }
        if let Some(percent) = self.contingency_percent {
            if !(0.0..=1.0).contains(&percent) {
                return Err(CostError::invalid_input(
                    "contingencyPercent",
                    percent.to_string(),
                    "Contingency is a decimal fraction between 0 and 1 (0.05 = 5%)",
                ));
            }
        }
        Ok(())
    }

    /// TI allowance per RSF, 0 when absent
    pub fn ti_allowance(&self) -> f64 {
        self.ti_allowance_per_sf.unwrap_or(0.0)
    }
}

/// The full computed estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOutput {
    pub unique_project_factor: f64,

    /// Sub-factors behind the unique project factor (informational)
    pub size_factor: f64,
    pub floor_factor: f64,
    pub location_factor: f64,

    /// Category results in fixed order: Construction, FF&E/Appliances,
    /// Signage, Technology, Other, Design Fees
    pub categories: Vec<CategoryResult>,

    /// Sum of all category totals
    pub subtotal: f64,

    /// Decimal fraction applied to the subtotal
    pub contingency_percent: f64,
    pub contingency: f64,

    /// `subtotal + contingency`
    pub grand_total: f64,

    /// Sum of all six base rates (informational)
    #[serde(rename = "baseTotalPerRSF")]
    pub base_total_per_rsf: f64,

    #[serde(rename = "grandTotalPerRSF")]
    pub grand_total_per_rsf: f64,

    #[serde(rename = "tiAllowancePerSF")]
    pub ti_allowance_per_sf: f64,
    pub ti_allowance_total: f64,

    /// `grand_total - ti_allowance_total`; may be negative
    pub client_total: f64,

    #[serde(rename = "clientTotalPerRSF")]
    pub client_total_per_rsf: f64,
}

impl ProjectOutput {
    /// Result for a category
    pub fn category(&self, category: CostCategory) -> Option<&CategoryResult> {
        CostCategory::ALL
            .iter()
            .position(|c| *c == category)
            .and_then(|index| self.categories.get(index))
    }
}

/// Compute a full cost breakdown.
///
/// `base_values` overrides the configuration's default rates when given.
///
/// # Returns
///
/// * `Ok(ProjectOutput)` - The itemized estimate
/// * `Err(CostError::InvalidInput)` - Non-positive size, zero floors,
///   negative TI allowance, contingency outside 0-1, negative base rates or
///   non-finite slider positions
pub fn compute_project_costs(
    config: &CostConfig,
    input: &ProjectInput,
    slider_values: &SliderValues,
    base_values: Option<&BaseValues>,
) -> CostResult<ProjectOutput> {
    input.validate()?;
    for (id, position) in slider_values {
        if !position.is_finite() {
            return Err(CostError::invalid_input(
                format!("sliderValues.{}", id),
                position.to_string(),
                "Slider positions must be finite",
            ));
        }
    }
    let base = base_values.unwrap_or(&config.base_values);
    base.validate()?;

    let project_size = input.project_size;
    let factors = project_factor::resolve(config, project_size, input.floors, &input.location);
    let upf = factors.unique_project_factor;

    let mut categories: Vec<CategoryResult> = CostCategory::STANDARD
        .iter()
        .map(|&category| {
            calculate_category(
                category,
                config.sliders.for_category(category),
                slider_values,
                upf,
                base,
                project_size,
            )
        })
        .collect();

    let design_fees = calculate_design_fees(
        &categories[0],
        &config.sliders.permitting,
        slider_values,
        upf,
        base,
        project_size,
    );
    categories.push(design_fees);

    let area = Rsf(project_size);
    let subtotal = categories
        .iter()
        .fold(Dollars(0.0), |sum, c| sum + Dollars(c.total_cost));
    let contingency_percent = input.contingency_percent.unwrap_or(config.contingency_percent);
    let contingency = subtotal * contingency_percent;
    let grand_total = subtotal + contingency;

    let ti_allowance_per_sf = input.ti_allowance();
    let ti_allowance_total = DollarsPerRsf(ti_allowance_per_sf) * area;
    let client_total = grand_total - ti_allowance_total;

    let output = ProjectOutput {
        unique_project_factor: upf,
        size_factor: factors.size_factor,
        floor_factor: factors.floor_factor,
        location_factor: factors.location_factor,
        categories,
        subtotal: subtotal.value(),
        contingency_percent,
        contingency: contingency.value(),
        grand_total: grand_total.value(),
        base_total_per_rsf: base.total_per_rsf(),
        grand_total_per_rsf: (grand_total / area).value(),
        ti_allowance_per_sf,
        ti_allowance_total: ti_allowance_total.value(),
        client_total: client_total.value(),
        client_total_per_rsf: (client_total / area).value(),
    };

    tracing::debug!(
        project = %input.project_name,
        upf,
        grand_total = output.grand_total,
        client_total = output.client_total,
        "Computed project costs"
    );

    Ok(output)
}
