//! # Project Data Structures
//!
//! A `Project` groups the saved estimates for one client engagement.
//! Projects serialize to `.bce` (build-out cost estimate) files as
//! human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, name, client, timestamps)
//! ├── settings: ProjectSettings (market tier)
//! └── estimates: HashMap<Uuid, SavedEstimate> (snapshots)
//! ```
//!
//! A saved estimate is a snapshot: the inputs, slider positions and base
//! rates that produced it plus a summary of the output. It is stored and
//! returned verbatim, never recomputed on load.
//!
//! ## Example
//!
//! ```rust
//! use buildout_core::project::Project;
//! use buildout_core::calculations::{compute_project_costs, ProjectInput, SliderValues};
//! use buildout_core::config::CostConfig;
//!
//! let config = CostConfig::default();
//! let input = ProjectInput::new("Suite 400", 25_000.0, 1, "New York, NY");
//! let sliders = SliderValues::new();
//! let output = compute_project_costs(&config, &input, &sliders, None).unwrap();
//!
//! let mut project = Project::new("ACME HQ", "ACME Corp", "Jane Estimator");
//! let id = project.save_estimate("Option A", &input, &sliders, &config.base_values, &output);
//! assert!(project.get_estimate(&id).is_some());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::{ProjectInput, ProjectOutput, SliderValues};
use crate::config::{BaseValues, MarketTier};
use crate::errors::{CostError, CostResult};

/// Current schema version for .bce files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// Estimates are stored in a flat UUID-keyed map so they can be referenced
/// from comparisons and share links without depending on list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, name, client)
    pub meta: ProjectMetadata,

    /// Project-wide settings
    pub settings: ProjectSettings,

    /// Saved estimates, keyed by UUID
    pub estimates: HashMap<Uuid, SavedEstimate>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Arguments
    ///
    /// * `name` - Project name (e.g., "ACME HQ Fit-Out")
    /// * `client` - Client name
    /// * `prepared_by` - Person responsible for the estimates
    pub fn new(name: impl Into<String>, client: impl Into<String>, prepared_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                client: client.into(),
                prepared_by: prepared_by.into(),
                created: now,
                modified: now,
            },
            settings: ProjectSettings::default(),
            estimates: HashMap::new(),
        }
    }

    /// Snapshot a computed estimate into the project.
    ///
    /// Returns the UUID assigned to the snapshot.
    pub fn save_estimate(
        &mut self,
        name: impl Into<String>,
        input: &ProjectInput,
        slider_values: &SliderValues,
        base_values: &BaseValues,
        output: &ProjectOutput,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let estimate = SavedEstimate {
            name: name.into(),
            saved_at: Utc::now(),
            input: input.clone(),
            slider_values: slider_values.clone(),
            base_values: *base_values,
            summary: EstimateSummary::from_output(output),
        };
        tracing::debug!(%id, name = %estimate.name, "Saved estimate");
        self.estimates.insert(id, estimate);
        self.touch();
        id
    }

    /// Remove a saved estimate by UUID.
    ///
    /// Returns the removed estimate if it existed.
    pub fn remove_estimate(&mut self, id: &Uuid) -> Option<SavedEstimate> {
        let estimate = self.estimates.remove(id);
        if estimate.is_some() {
            self.touch();
        }
        estimate
    }

    /// Get a saved estimate by UUID.
    pub fn get_estimate(&self, id: &Uuid) -> Option<&SavedEstimate> {
        self.estimates.get(id)
    }

    /// Find an estimate by UUID string or by exact name.
    ///
    /// Names are not unique; when several match, the most recently saved
    /// one wins.
    pub fn find_estimate(&self, key: &str) -> CostResult<(Uuid, &SavedEstimate)> {
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(estimate) = self.estimates.get(&id) {
                return Ok((id, estimate));
            }
        }
        self.estimates
            .iter()
            .filter(|(_, estimate)| estimate.name == key)
            .max_by_key(|(_, estimate)| estimate.saved_at)
            .map(|(id, estimate)| (*id, estimate))
            .ok_or_else(|| CostError::estimate_not_found(key))
    }

    /// All estimates, oldest first.
    pub fn estimates_sorted(&self) -> Vec<(Uuid, &SavedEstimate)> {
        let mut estimates: Vec<_> = self.estimates.iter().map(|(id, e)| (*id, e)).collect();
        estimates.sort_by(|a, b| a.1.saved_at.cmp(&b.1.saved_at).then_with(|| a.1.name.cmp(&b.1.name)));
        estimates
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn estimate_count(&self) -> usize {
        self.estimates.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Project name
    pub name: String,

    /// Client name
    pub client: String,

    /// Person responsible for the estimates
    pub prepared_by: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Project-wide settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Market tier used for default base rates
    pub market_tier: MarketTier,
}

/// A stored estimate snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEstimate {
    /// User label (e.g., "Option A - Premium Finishes")
    pub name: String,

    pub saved_at: DateTime<Utc>,

    /// Inputs that produced the estimate
    pub input: ProjectInput,
    pub slider_values: SliderValues,
    pub base_values: BaseValues,

    /// Output summary at save time
    pub summary: EstimateSummary,
}

/// The headline numbers of a computed estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateSummary {
    pub unique_project_factor: f64,
    pub subtotal: f64,
    pub contingency: f64,
    pub grand_total: f64,
    #[serde(rename = "grandTotalPerRSF")]
    pub grand_total_per_rsf: f64,
    pub client_total: f64,
    #[serde(rename = "clientTotalPerRSF")]
    pub client_total_per_rsf: f64,
    /// Category name and total cost, in output order
    pub category_totals: Vec<(String, f64)>,
}

impl EstimateSummary {
    pub fn from_output(output: &ProjectOutput) -> Self {
        EstimateSummary {
            unique_project_factor: output.unique_project_factor,
            subtotal: output.subtotal,
            contingency: output.contingency,
            grand_total: output.grand_total,
            grand_total_per_rsf: output.grand_total_per_rsf,
            client_total: output.client_total,
            client_total_per_rsf: output.client_total_per_rsf,
            category_totals: output
                .categories
                .iter()
                .map(|c| (c.category.clone(), c.total_cost))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::compute_project_costs;
    use crate::config::CostConfig;

    fn add_estimate(project: &mut Project, name: &str, size: f64) -> Uuid {
        let config = CostConfig::default();
        let input = ProjectInput::new(name, size, 2, "Chicago, IL");
        let sliders = SliderValues::new();
        let output = compute_project_costs(&config, &input, &sliders, None).unwrap();
        project.save_estimate(name, &input, &sliders, &config.base_values, &output)
    }

    #[test]
    fn test_project_creation() {
        let project = Project::new("HQ", "Acme Corp", "Jane");
        assert_eq!(project.meta.name, "HQ");
        assert_eq!(project.meta.client, "Acme Corp");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.settings.market_tier, MarketTier::Medium);
    }

    #[test]
    fn test_save_and_remove_estimate() {
        let mut project = Project::new("HQ", "Acme", "Jane");
        let id = add_estimate(&mut project, "Option A", 20_000.0);
        assert_eq!(project.estimate_count(), 1);

        let saved = project.get_estimate(&id).unwrap();
        assert_eq!(saved.summary.category_totals.len(), 6);
        assert_eq!(saved.summary.category_totals[0].0, "Construction");

        assert!(project.remove_estimate(&id).is_some());
        assert_eq!(project.estimate_count(), 0);
        assert!(project.remove_estimate(&id).is_none());
    }

    #[test]
    fn test_find_by_id_or_name() {
        let mut project = Project::new("HQ", "Acme", "Jane");
        let a = add_estimate(&mut project, "Option A", 20_000.0);
        let b = add_estimate(&mut project, "Option B", 30_000.0);

        assert_eq!(project.find_estimate("Option B").unwrap().0, b);
        assert_eq!(project.find_estimate(&a.to_string()).unwrap().0, a);

        let err = project.find_estimate("Option C").unwrap_err();
        assert_eq!(err.error_code(), "ESTIMATE_NOT_FOUND");
    }

    #[test]
    fn test_estimates_sorted_oldest_first() {
        let mut project = Project::new("HQ", "Acme", "Jane");
        add_estimate(&mut project, "First", 10_000.0);
        add_estimate(&mut project, "Second", 10_000.0);
        let sorted = project.estimates_sorted();
        assert_eq!(sorted.len(), 2);
        assert!(sorted[0].1.saved_at <= sorted[1].1.saved_at);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("HQ", "Test Client", "Jane");
        let id = add_estimate(&mut project, "Option A", 20_000.0);
        let json = serde_json::to_string_pretty(&project).unwrap();

        assert!(json.contains("Test Client"));
        assert!(json.contains("\"grandTotalPerRSF\""));
        assert!(json.contains("\"marketTier\": \"medium\""));
        assert!(json.contains("\"preparedBy\""));
        assert!(!json.contains("prepared_by"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        let original = project.get_estimate(&id).unwrap();
        let loaded = roundtrip.get_estimate(&id).unwrap();
        assert_eq!(loaded.name, "Option A");
        assert_eq!(loaded.input, original.input);
        assert_eq!(loaded.saved_at, original.saved_at);
        assert!((loaded.summary.grand_total - original.summary.grand_total).abs() < 1e-6);
    }
}
