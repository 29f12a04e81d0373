//! # Cost Calculations
//!
//! The parametric cost engine. Each stage follows the same pattern as the
//! rest of the crate: plain serializable inputs in, plain serializable
//! results out, no I/O.
//!
//! - [`project_factor`] - Unique Project Factor from size, floors, location
//! - [`sliders`] - Slider position <-> factor interpolation
//! - [`category`] - Weighted category factors and the Design Fees blend
//! - [`estimate`] - Top-level [`compute_project_costs`] and aggregation
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::calculations::{compute_project_costs, ProjectInput, SliderValues, CostCategory};
//! use buildout_core::config::CostConfig;
//!
//! let config = CostConfig::default();
//! let input = ProjectInput::new("HQ Fit-Out", 25_000.0, 1, "New York, NY");
//! let output = compute_project_costs(&config, &input, &SliderValues::new(), None).unwrap();
//!
//! assert_eq!(output.categories[0].category, CostCategory::Construction.display_name());
//! assert!((output.grand_total - (output.subtotal + output.contingency)).abs() < 1e-6);
//! ```

pub mod category;
pub mod estimate;
pub mod project_factor;
pub mod sliders;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::BaseValues;

// Re-export commonly used types
pub use category::CategoryResult;
pub use estimate::{compute_project_costs, ProjectInput, ProjectOutput, SliderValues};
pub use project_factor::ProjectFactors;

/// The six cost categories, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostCategory {
    Construction,
    FfeAppliances,
    Signage,
    Technology,
    Other,
    /// Blended from the construction factor and the permitting slider
    DesignFees,
}

impl CostCategory {
    /// All categories in the fixed output order
    pub const ALL: [CostCategory; 6] = [
        CostCategory::Construction,
        CostCategory::FfeAppliances,
        CostCategory::Signage,
        CostCategory::Technology,
        CostCategory::Other,
        CostCategory::DesignFees,
    ];

    /// Categories priced by a plain weighted slider sum
    pub const STANDARD: [CostCategory; 5] = [
        CostCategory::Construction,
        CostCategory::FfeAppliances,
        CostCategory::Signage,
        CostCategory::Technology,
        CostCategory::Other,
    ];

    /// Display name used in results and reports
    pub fn display_name(&self) -> &'static str {
        match self {
            CostCategory::Construction => "Construction",
            CostCategory::FfeAppliances => "FF&E/Appliances",
            CostCategory::Signage => "Signage",
            CostCategory::Technology => "Technology",
            CostCategory::Other => "Other",
            CostCategory::DesignFees => "Design Fees",
        }
    }

    /// Base $/RSF rate for this category. Technology sums its sub-rates.
    pub fn base_rate(&self, base: &BaseValues) -> f64 {
        match self {
            CostCategory::Construction => base.construction_costs,
            CostCategory::FfeAppliances => base.ffe_appliances,
            CostCategory::Signage => base.signage,
            CostCategory::Technology => base.technology.total(),
            CostCategory::Other => base.other,
            CostCategory::DesignFees => base.design_fees,
        }
    }
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
