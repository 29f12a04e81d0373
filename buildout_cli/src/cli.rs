use std::path::PathBuf;

use buildout_core::MarketTier;
use clap::{Args, Parser, Subcommand};

pub const DEFAULT_LOCATION: &str = "New York, NY";

#[derive(Parser, Debug)]
#[command(name = "buildout", version, about = "Commercial build-out cost estimator")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(
        long,
        global = true,
        value_parser = parse_tier,
        help = "Market tier preset for base rates (low, medium, high); defaults to medium, or to the project's tier for `save`"
    )]
    pub tier: Option<MarketTier>,
    #[arg(long, global = true, help = "JSON cost configuration replacing the built-in tables")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute an estimate
    Estimate(EstimateArgs),
    /// List sliders per category
    Sliders,
    /// List location factors
    Locations,
    /// Compute an estimate and store it in a project file
    Save {
        project: PathBuf,
        estimate_name: String,
        #[command(flatten)]
        estimate: EstimateArgs,
        #[arg(long, default_value = "", help = "Client name for a new project file")]
        client: String,
        #[arg(long, default_value = "", help = "Preparer for a new project file")]
        prepared_by: String,
        #[arg(long, default_value = "buildout", help = "User id recorded in the lock file")]
        user: String,
    },
    /// List estimates saved in a project file
    List { project: PathBuf },
    /// Compare two saved estimates (by id or name)
    Compare {
        project: PathBuf,
        left: String,
        right: String,
    },
    /// Print a share token for an estimate
    Share(EstimateArgs),
    /// Recompute the estimate encoded in a share token
    Open { token: String },
    /// Write a PDF client report
    Report {
        output: PathBuf,
        #[command(flatten)]
        estimate: EstimateArgs,
        #[arg(long, default_value = "")]
        prepared_by: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[arg(long, default_value = "Untitled Project")]
    pub name: String,
    #[arg(long, allow_negative_numbers = true, help = "Rentable square feet")]
    pub size: f64,
    #[arg(long, default_value_t = 1)]
    pub floors: u32,
    #[arg(long, default_value = DEFAULT_LOCATION)]
    pub location: String,
    #[arg(long = "ti-allowance", allow_negative_numbers = true, help = "Tenant-improvement allowance in $/SF")]
    pub ti_allowance: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Contingency as a decimal fraction (0.05 = 5%)")]
    pub contingency: Option<f64>,
    #[arg(
        long = "slider",
        value_parser = parse_slider,
        help = "Slider position as id=value (0-100), repeatable"
    )]
    pub sliders: Vec<(String, f64)>,
    #[arg(long, help = "JSON file overriding some or all base $/RSF rates")]
    pub base: Option<PathBuf>,
}

fn parse_tier(value: &str) -> Result<MarketTier, String> {
    MarketTier::ALL
        .into_iter()
        .find(|tier| tier.display_name().eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| format!("unknown tier '{value}' (expected low, medium or high)"))
}

fn parse_slider(value: &str) -> Result<(String, f64), String> {
    let (id, position) = value
        .split_once('=')
        .ok_or_else(|| format!("expected id=value, got '{value}'"))?;
    let position: f64 = position
        .trim()
        .parse()
        .map_err(|_| format!("slider '{id}' position '{position}' is not a number"))?;
    Ok((id.trim().to_string(), position))
}
