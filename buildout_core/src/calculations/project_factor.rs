//! # Unique Project Factor
//!
//! A single multiplier capturing how a project's scale and location shift
//! costs, applied uniformly to every category:
//!
//! ```text
//! UPF = size_factor × 0.33 + floor_factor × 0.34 + location_factor × 0.33
//! ```
//!
//! Lookups never fail. A size in a gap between ranges and an unknown
//! location both resolve to 1.0; floor counts past the table reuse the
//! tallest entry.

use serde::{Deserialize, Serialize};

use crate::config::CostConfig;

/// Weight of the size factor in the blend
pub const SIZE_WEIGHT: f64 = 0.33;
/// Weight of the floor factor in the blend
pub const FLOOR_WEIGHT: f64 = 0.34;
/// Weight of the location factor in the blend
pub const LOCATION_WEIGHT: f64 = 0.33;

/// The three sub-factors and their blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFactors {
    pub size_factor: f64,
    pub floor_factor: f64,
    pub location_factor: f64,
    pub unique_project_factor: f64,
}

/// Resolve the sub-factors from the configuration tables and blend them.
pub fn resolve(config: &CostConfig, project_size: f64, floors: u32, location: &str) -> ProjectFactors {
    let size_factor = config.size_factor(project_size);
    let floor_factor = config.floor_factor(floors);
    let location_factor = config.location_factor(location);

    if !config.is_known_location(location) {
        tracing::warn!(location, "Unknown location, using neutral factor 1.0");
    }

    ProjectFactors {
        size_factor,
        floor_factor,
        location_factor,
        unique_project_factor: blend(size_factor, floor_factor, location_factor),
    }
}

/// Weighted blend of the three sub-factors.
pub fn blend(size_factor: f64, floor_factor: f64, location_factor: f64) -> f64 {
    size_factor * SIZE_WEIGHT + floor_factor * FLOOR_WEIGHT + location_factor * LOCATION_WEIGHT
}
