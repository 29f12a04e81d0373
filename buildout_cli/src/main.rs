//! # Buildout CLI
//!
//! Command-line front end for `buildout_core`: compute estimates, manage
//! saved estimates in `.bce` project files, compare them, produce share
//! tokens and PDF client reports.
//!
//! Every command prints a human-readable table by default and the
//! JSON-serialized result with `--json`. Errors go to stderr as text plus
//! the structured error JSON.

use std::path::Path;
use std::process::ExitCode;

use buildout_core::calculations::sliders::default_position;
use buildout_core::errors::{CostError, CostResult};
use buildout_core::pdf::render_estimate_pdf;
use buildout_core::{
    compare_estimates, compute_project_costs, update_project, BaseValues, CostConfig, MarketTier, Project,
    ProjectInput, ProjectOutput, ShareState, SliderValues,
};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod render;

use cli::{Cli, Commands, EstimateArgs};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.error_code(), "Command failed");
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CostResult<()> {
    let config = load_config(cli, cli.tier.unwrap_or_default())?;

    match &cli.command {
        Commands::Estimate(args) => {
            let request = EstimateRequest::from_args(&config, args)?;
            let output = request.compute(&config)?;
            if cli.json {
                print_json(&output)
            } else {
                render::print_estimate(&request.input, &output);
                Ok(())
            }
        }
        Commands::Sliders => {
            if cli.json {
                let rows: Vec<SliderRow> = config
                    .sliders
                    .iter()
                    .map(|(category, slider)| SliderRow {
                        category: category.display_name(),
                        id: &slider.id,
                        label: &slider.label,
                        weight: slider.weight,
                        low_factor: slider.low_factor,
                        high_factor: slider.high_factor,
                        default_value: slider.default_value,
                        default_position: default_position(slider),
                    })
                    .collect();
                print_json(&rows)
            } else {
                render::print_sliders(&config);
                Ok(())
            }
        }
        Commands::Locations => {
            if cli.json {
                print_json(&config.location_factors)
            } else {
                render::print_locations(&config);
                Ok(())
            }
        }
        Commands::Save {
            project,
            estimate_name,
            estimate,
            client,
            prepared_by,
            user,
        } => {
            let stored_tier = if project.exists() {
                Some(buildout_core::load_project(project)?.settings.market_tier)
            } else {
                None
            };
            let tier = project_tier(cli.tier, stored_tier)?;
            let config = load_config(cli, tier)?;
            let request = EstimateRequest::from_args(&config, estimate)?;
            let output = request.compute(&config)?;
            let id = update_project(
                project,
                user,
                || {
                    let mut fresh = Project::new(&request.input.project_name, client, prepared_by);
                    fresh.settings.market_tier = tier;
                    fresh
                },
                |project| {
                    // The file may have changed hands since it was read above
                    project_tier(Some(tier), Some(project.settings.market_tier))?;
                    Ok(project.save_estimate(
                        estimate_name,
                        &request.input,
                        &request.sliders,
                        &request.base,
                        &output,
                    ))
                },
            )?;
            tracing::info!(%id, path = %project.display(), "Saved estimate");
            if cli.json {
                print_json(&json!({
                    "id": id,
                    "name": estimate_name,
                    "grandTotal": output.grand_total,
                }))
            } else {
                println!("Saved \"{}\" ({}) to {}", estimate_name, id, project.display());
                Ok(())
            }
        }
        Commands::List { project } => {
            let project = buildout_core::load_project(project)?;
            if cli.json {
                let rows: Vec<_> = project
                    .estimates_sorted()
                    .into_iter()
                    .map(|(id, estimate)| {
                        json!({
                            "id": id,
                            "name": estimate.name,
                            "savedAt": estimate.saved_at,
                            "grandTotal": estimate.summary.grand_total,
                            "clientTotal": estimate.summary.client_total,
                        })
                    })
                    .collect();
                print_json(&rows)
            } else {
                render::print_estimate_list(&project);
                Ok(())
            }
        }
        Commands::Compare { project, left, right } => {
            let project = buildout_core::load_project(project)?;
            let (_, left) = project.find_estimate(left)?;
            let (_, right) = project.find_estimate(right)?;
            let comparison = compare_estimates(left, right);
            if cli.json {
                print_json(&comparison)
            } else {
                render::print_comparison(&comparison);
                Ok(())
            }
        }
        Commands::Share(args) => {
            let request = EstimateRequest::from_args(&config, args)?;
            // Reject states that would not compute before handing out a link
            request.compute(&config)?;
            let token = ShareState {
                inputs: request.input,
                slider_values: request.sliders,
                base_values: request.base,
            }
            .encode()?;
            if cli.json {
                print_json(&json!({ "token": token }))
            } else {
                println!("{}", token);
                Ok(())
            }
        }
        Commands::Open { token } => {
            let state = ShareState::decode(token)?;
            let output = compute_project_costs(&config, &state.inputs, &state.slider_values, Some(&state.base_values))?;
            if cli.json {
                print_json(&json!({ "state": state, "output": output }))
            } else {
                render::print_estimate(&state.inputs, &output);
                Ok(())
            }
        }
        Commands::Report {
            output: path,
            estimate,
            prepared_by,
        } => {
            let request = EstimateRequest::from_args(&config, estimate)?;
            let output = request.compute(&config)?;
            let pdf = render_estimate_pdf(&request.input, &output, prepared_by)?;
            write_file(path, &pdf)?;
            if cli.json {
                print_json(&json!({ "path": path.display().to_string(), "bytes": pdf.len() }))
            } else {
                println!("Wrote {} ({} bytes)", path.display(), pdf.len());
                Ok(())
            }
        }
    }
}

fn load_config(cli: &Cli, tier: MarketTier) -> CostResult<CostConfig> {
    match &cli.config {
        Some(path) => CostConfig::from_json_file(path),
        None => Ok(CostConfig::for_tier(tier)),
    }
}

/// Tier to price a saved estimate at. A project keeps one tier; an explicit
/// `--tier` that disagrees with the file is refused.
fn project_tier(requested: Option<MarketTier>, stored: Option<MarketTier>) -> CostResult<MarketTier> {
    match (requested, stored) {
        (Some(requested), Some(stored)) if requested != stored => Err(CostError::invalid_input(
            "tier",
            requested.to_string(),
            format!("Project is priced at the {} tier", stored),
        )),
        (Some(tier), _) | (None, Some(tier)) => Ok(tier),
        (None, None) => Ok(MarketTier::default()),
    }
}

/// Engine inputs assembled from command-line arguments.
struct EstimateRequest {
    input: ProjectInput,
    sliders: SliderValues,
    base: BaseValues,
}

impl EstimateRequest {
    fn from_args(config: &CostConfig, args: &EstimateArgs) -> CostResult<Self> {
        let mut input = ProjectInput::new(&args.name, args.size, args.floors, &args.location);
        if let Some(ti) = args.ti_allowance {
            input = input.with_ti_allowance(ti);
        }
        if let Some(contingency) = args.contingency {
            input = input.with_contingency(contingency);
        }

        let mut sliders = SliderValues::new();
        for (id, position) in &args.sliders {
            if config.slider(id).is_none() {
                return Err(CostError::invalid_input(
                    "slider",
                    id.clone(),
                    "Unknown slider id (see `buildout sliders`)",
                ));
            }
            sliders.insert(id.clone(), *position);
        }

        let base = match &args.base {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| CostError::file_error("read base values", path.display().to_string(), e.to_string()))?;
                let overrides: serde_json::Value = serde_json::from_str(&contents).map_err(CostError::serialization)?;
                config.base_values.with_overrides(&overrides)?
            }
            None => config.base_values,
        };

        Ok(EstimateRequest { input, sliders, base })
    }

    fn compute(&self, config: &CostConfig) -> CostResult<ProjectOutput> {
        compute_project_costs(config, &self.input, &self.sliders, Some(&self.base))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SliderRow<'a> {
    category: &'static str,
    id: &'a str,
    label: &'a str,
    weight: f64,
    low_factor: f64,
    high_factor: f64,
    default_value: f64,
    default_position: f64,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CostResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CostError::serialization)?;
    println!("{}", json);
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> CostResult<()> {
    std::fs::write(path, bytes).map_err(|e| CostError::file_error("write", path.display().to_string(), e.to_string()))
}
