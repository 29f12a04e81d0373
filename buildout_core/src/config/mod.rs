//! # Cost Configuration Tables
//!
//! Every table the engine reads lives in a single immutable [`CostConfig`]
//! value: size-range factors, floor factors, location factors, slider
//! definitions per category, default base rates and the default contingency.
//! The engine never reaches for globals; callers build a config once (from a
//! [`MarketTier`] preset or a JSON file) and pass it by reference.
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::config::{CostConfig, MarketTier};
//!
//! let medium = CostConfig::default();
//! let high = CostConfig::for_tier(MarketTier::High);
//! assert!(high.base_values.construction_costs > medium.base_values.construction_costs);
//! assert_eq!(medium.location_factor("New York, NY"), 1.0);
//! ```

pub mod tables;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::calculations::CostCategory;
use crate::errors::{CostError, CostResult};

// ============================================================================
// Slider Definitions
// ============================================================================

/// Static definition of one quality slider.
///
/// `default_value` is a factor, not a 0-100 position. The position a UI
/// should show initially is derived by
/// [`default_position`](crate::calculations::sliders::default_position).
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "finish_level",
///   "label": "Finish Level",
///   "weight": 0.4,
///   "lowFactor": 0.8,
///   "highFactor": 1.4,
///   "defaultValue": 1.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderConfig {
    /// Unique slider id (slider values are keyed by it)
    pub id: String,

    /// Display label
    pub label: String,

    /// Contribution to the category's weighted factor (0-1)
    pub weight: f64,

    /// Factor at position 0
    pub low_factor: f64,

    /// Factor at position 100
    pub high_factor: f64,

    /// Factor used when no position is supplied
    pub default_value: f64,
}

impl SliderConfig {
    /// Convenience constructor used by the preset tables.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        weight: f64,
        low_factor: f64,
        high_factor: f64,
        default_value: f64,
    ) -> Self {
        SliderConfig {
            id: id.into(),
            label: label.into(),
            weight,
            low_factor,
            high_factor,
            default_value,
        }
    }
}

/// Slider definitions grouped by category.
///
/// Design Fees has no weighted sliders of its own; its single
/// `permitting` slider is blended with the construction factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySliders {
    pub construction: Vec<SliderConfig>,
    pub ffe_appliances: Vec<SliderConfig>,
    pub signage: Vec<SliderConfig>,
    pub technology: Vec<SliderConfig>,
    pub other: Vec<SliderConfig>,
    /// Permitting complexity, consumed by the Design Fees blend
    pub permitting: SliderConfig,
}

impl CategorySliders {
    /// Sliders that feed a category.
    ///
    /// For [`CostCategory::DesignFees`] this is the permitting slider alone.
    pub fn for_category(&self, category: CostCategory) -> &[SliderConfig] {
        match category {
            CostCategory::Construction => &self.construction,
            CostCategory::FfeAppliances => &self.ffe_appliances,
            CostCategory::Signage => &self.signage,
            CostCategory::Technology => &self.technology,
            CostCategory::Other => &self.other,
            CostCategory::DesignFees => std::slice::from_ref(&self.permitting),
        }
    }

    /// Every slider, in category output order.
    pub fn iter(&self) -> impl Iterator<Item = (CostCategory, &SliderConfig)> {
        CostCategory::ALL
            .into_iter()
            .flat_map(move |category| self.for_category(category).iter().map(move |s| (category, s)))
    }
}

// ============================================================================
// Base Rates
// ============================================================================

/// Technology sub-rates ($/RSF). Technology has no single top-level rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnologyRates {
    /// Audio-visual
    pub av: f64,
    /// IT / network cabling
    pub it: f64,
    /// Security / access control
    pub sec: f64,
}

impl TechnologyRates {
    pub fn total(&self) -> f64 {
        self.av + self.it + self.sec
    }
}

/// Per-area dollar rates for the six cost domains ($/RSF).
///
/// The engine always receives a complete object; partial overrides are
/// applied by the caller before handing it over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseValues {
    pub construction_costs: f64,
    pub design_fees: f64,
    pub ffe_appliances: f64,
    pub signage: f64,
    pub technology: TechnologyRates,
    pub other: f64,
}

impl BaseValues {
    /// Sum of all six rates. Informational; not used in the totals.
    pub fn total_per_rsf(&self) -> f64 {
        self.construction_costs
            + self.design_fees
            + self.ffe_appliances
            + self.signage
            + self.technology.total()
            + self.other
    }

    /// Apply a partial JSON override on top of these rates.
    ///
    /// Keys absent from `overrides` keep their current value, so
    /// `{"technology": {"av": 20}}` changes only the AV rate.
    pub fn with_overrides(&self, overrides: &serde_json::Value) -> CostResult<BaseValues> {
        let mut merged = serde_json::to_value(self).map_err(CostError::serialization)?;
        merge_json(&mut merged, overrides);
        let base: BaseValues = serde_json::from_value(merged).map_err(CostError::serialization)?;
        base.validate()?;
        Ok(base)
    }

    /// Check that every rate is finite and non-negative.
    pub fn validate(&self) -> CostResult<()> {
        let rates = [
            ("constructionCosts", self.construction_costs),
            ("designFees", self.design_fees),
            ("ffeAppliances", self.ffe_appliances),
            ("signage", self.signage),
            ("technology.av", self.technology.av),
            ("technology.it", self.technology.it),
            ("technology.sec", self.technology.sec),
            ("other", self.other),
        ];
        for (field, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                return Err(CostError::invalid_input(
                    format!("baseValues.{}", field),
                    rate.to_string(),
                    "Base rates must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

impl Default for BaseValues {
    fn default() -> Self {
        tables::base_values(MarketTier::Medium)
    }
}

// ============================================================================
// Project Factor Tables
// ============================================================================

/// One row of the size-factor table. `max: None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRange {
    /// Inclusive lower bound (RSF)
    pub min: f64,
    /// Inclusive upper bound (RSF), unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub factor: f64,
}

impl SizeRange {
    pub fn contains(&self, project_size: f64) -> bool {
        project_size >= self.min && self.max.map_or(true, |max| project_size <= max)
    }
}

// ============================================================================
// Market Tiers
// ============================================================================

/// Market-tier preset selecting a default base-rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTier {
    Low,
    #[default]
    Medium,
    High,
}

impl MarketTier {
    pub const ALL: [MarketTier; 3] = [MarketTier::Low, MarketTier::Medium, MarketTier::High];

    pub fn display_name(&self) -> &'static str {
        match self {
            MarketTier::Low => "Low",
            MarketTier::Medium => "Medium",
            MarketTier::High => "High",
        }
    }
}

impl fmt::Display for MarketTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// CostConfig
// ============================================================================

/// The complete, immutable set of tables consumed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostConfig {
    /// Ordered size ranges; the first containing range wins
    pub size_ranges: Vec<SizeRange>,

    /// Floor count to factor
    pub floor_factors: BTreeMap<u32, f64>,

    /// Location name to factor (exact match)
    pub location_factors: BTreeMap<String, f64>,

    /// Slider definitions per category
    pub sliders: CategorySliders,

    /// Default base rates when the caller supplies none
    pub base_values: BaseValues,

    /// Default contingency as a decimal fraction (0.05 = 5%)
    pub contingency_percent: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        CostConfig::for_tier(MarketTier::Medium)
    }
}

impl CostConfig {
    /// Build the preset tables for a market tier.
    pub fn for_tier(tier: MarketTier) -> Self {
        CostConfig {
            size_ranges: tables::size_ranges(),
            floor_factors: tables::floor_factors(),
            location_factors: tables::location_factors(),
            sliders: tables::sliders(),
            base_values: tables::base_values(tier),
            contingency_percent: tables::DEFAULT_CONTINGENCY_PERCENT,
        }
    }

    /// Parse and validate a complete configuration from JSON.
    pub fn from_json(json: &str) -> CostResult<Self> {
        let config: CostConfig = serde_json::from_str(json).map_err(CostError::serialization)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn from_json_file(path: &Path) -> CostResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CostError::file_error("read config", path.display().to_string(), e.to_string()))?;
        let config = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded cost configuration");
        Ok(config)
    }

    /// Size factor for a project size, 1.0 when no range matches.
    pub fn size_factor(&self, project_size: f64) -> f64 {
        self.size_ranges
            .iter()
            .find(|range| range.contains(project_size))
            .map_or(1.0, |range| range.factor)
    }

    /// Floor factor; counts above the table use the highest key's factor.
    pub fn floor_factor(&self, floors: u32) -> f64 {
        if let Some(factor) = self.floor_factors.get(&floors) {
            return *factor;
        }
        match self.floor_factors.last_key_value() {
            Some((max_floors, factor)) if floors > *max_floors => *factor,
            _ => 1.0,
        }
    }

    /// Location factor, 1.0 for unknown locations.
    pub fn location_factor(&self, location: &str) -> f64 {
        self.location_factors.get(location).copied().unwrap_or(1.0)
    }

    pub fn is_known_location(&self, location: &str) -> bool {
        self.location_factors.contains_key(location)
    }

    /// Known location names in sorted order.
    pub fn location_names(&self) -> impl Iterator<Item = &str> {
        self.location_factors.keys().map(String::as_str)
    }

    /// Find a slider by id in any category.
    pub fn slider(&self, id: &str) -> Option<(CostCategory, &SliderConfig)> {
        self.sliders.iter().find(|(_, slider)| slider.id == id)
    }

    /// The initial 0-100 position of every slider, keyed by id.
    pub fn default_positions(&self) -> BTreeMap<String, f64> {
        self.sliders
            .iter()
            .map(|(_, slider)| (slider.id.clone(), crate::calculations::sliders::default_position(slider)))
            .collect()
    }

    /// Check the tables for shape errors.
    pub fn validate(&self) -> CostResult<()> {
        if self.size_ranges.is_empty() {
            return Err(CostError::invalid_config("sizeRanges", "At least one size range is required"));
        }
        for range in &self.size_ranges {
            check_factor("sizeRanges", range.factor)?;
            if let Some(max) = range.max {
                if max < range.min {
                    return Err(CostError::invalid_config(
                        "sizeRanges",
                        format!("Range max {} is below min {}", max, range.min),
                    ));
                }
            }
        }

        if self.floor_factors.is_empty() {
            return Err(CostError::invalid_config("floorFactors", "At least one floor entry is required"));
        }
        if self.floor_factors.contains_key(&0) {
            return Err(CostError::invalid_config("floorFactors", "Floor counts start at 1"));
        }
        for factor in self.floor_factors.values() {
            check_factor("floorFactors", *factor)?;
        }

        for factor in self.location_factors.values() {
            check_factor("locationFactors", *factor)?;
        }

        let mut seen = HashSet::new();
        for (category, slider) in self.sliders.iter() {
            if !seen.insert(slider.id.as_str()) {
                return Err(CostError::invalid_config(
                    "sliders",
                    format!("Duplicate slider id '{}' ({})", slider.id, category),
                ));
            }
            if !(0.0..=1.0).contains(&slider.weight) {
                return Err(CostError::invalid_config(
                    "sliders",
                    format!("Weight {} of '{}' is outside 0-1", slider.weight, slider.id),
                ));
            }
            for value in [slider.low_factor, slider.high_factor, slider.default_value] {
                check_factor("sliders", value)?;
            }
        }

        self.base_values
            .validate()
            .map_err(|e| CostError::invalid_config("baseValues", e.to_string()))?;

        if !(0.0..=1.0).contains(&self.contingency_percent) {
            return Err(CostError::invalid_config(
                "contingencyPercent",
                format!("{} is outside 0-1 (use 0.05 for 5%)", self.contingency_percent),
            ));
        }

        Ok(())
    }
}

/// Recursively overlay `patch` objects onto `target`; non-objects replace.
fn merge_json(target: &mut serde_json::Value, patch: &serde_json::Value) {
    match (target, patch) {
        (serde_json::Value::Object(target), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

fn check_factor(table: &str, factor: f64) -> CostResult<()> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(CostError::invalid_config(
            table,
            format!("Factor {} must be finite and non-negative", factor),
        ));
    }
    Ok(())
}
