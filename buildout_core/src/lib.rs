//! # buildout_core - Build-Out Cost Estimation Engine
//!
//! `buildout_core` prices commercial real-estate build-outs. Given a
//! project's size, floor count and location, a set of quality sliders and a
//! table of base $/RSF rates, it produces an itemized estimate: six cost
//! categories, contingency, grand total, and the client total after the
//! tenant-improvement allowance.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: The engine is a pure function of its inputs and config
//! - **Injected tables**: Factor tables and rates live in a [`CostConfig`]
//!   value passed by reference, never in globals
//! - **Soft fallbacks**: Unknown locations, missing sliders and tall
//!   buildings resolve to documented defaults instead of errors
//! - **JSON-First**: All types implement Serialize/Deserialize
//!
//! ## Quick Start
//!
//! ```rust
//! use buildout_core::{compute_project_costs, CostConfig, ProjectInput, SliderValues};
//!
//! let config = CostConfig::default();
//! let input = ProjectInput::new("Suite 400", 25_000.0, 1, "New York, NY");
//! let output = compute_project_costs(&config, &input, &SliderValues::new(), None).unwrap();
//!
//! println!("Grand total: ${:.0}", output.grand_total);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The cost engine
//! - [`config`] - Factor tables, slider definitions, market-tier presets
//! - [`project`] - Projects and saved estimate snapshots
//! - [`file_io`] - File operations with atomic saves and locking
//! - [`comparison`] - Side-by-side estimate comparison
//! - [`share`] - Shareable state tokens
//! - [`pdf`] - Client presentation report
//! - [`units`] - Area and money wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod comparison;
pub mod config;
pub mod errors;
pub mod file_io;
pub mod pdf;
pub mod project;
pub mod share;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{compute_project_costs, CategoryResult, CostCategory, ProjectInput, ProjectOutput, SliderValues};
pub use comparison::{compare_estimates, EstimateComparison};
pub use config::{BaseValues, CostConfig, MarketTier};
pub use errors::{CostError, CostResult};
pub use file_io::{load_project, save_project, update_project, FileLock};
pub use project::{Project, SavedEstimate};
pub use share::ShareState;
