//! skytour - plan and simulate survey drone flights.

mod generate;
mod output;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use skytour_core::{run_scenario, FlightRules, FlightStatus, Scenario};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skytour", about = "Survey flight planner and simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the visiting order for a scenario and fly it, writing the
    /// flight log and a GeoJSON rendering of the tour
    Fly {
        /// Path to a scenario JSON file
        scenario: PathBuf,
        /// Directory the output files are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Generate a random scenario file for demos and stress tests
    Generate {
        /// Number of targets to place
        #[arg(long, default_value_t = 8)]
        targets: usize,
        /// Number of no-fly zones to place
        #[arg(long, default_value_t = 3)]
        zones: usize,
        /// Seed for the generator
        #[arg(long, default_value_t = 5678)]
        seed: u64,
        /// Survey date, formatted DD-MM-YYYY
        #[arg(long, default_value = "14-03-2021")]
        date: String,
        /// Where to write the scenario
        #[arg(long, default_value = "scenario.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skytour_core=info".parse()?)
                .add_directive("skytour_cli=info".parse()?),
        )
        .init();

    match Cli::parse().command {
        Commands::Fly { scenario, out_dir } => fly(scenario, out_dir),
        Commands::Generate {
            targets,
            zones,
            seed,
            date,
            out,
        } => {
            let date = NaiveDate::parse_from_str(&date, "%d-%m-%Y")
                .context("date must be formatted DD-MM-YYYY")?;
            let scenario = generate::random_scenario(targets, zones, seed, date);
            let json = serde_json::to_string_pretty(&scenario)?;
            fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), targets, zones, seed, "wrote scenario");
            Ok(())
        }
    }
}

fn fly(scenario_path: PathBuf, out_dir: PathBuf) -> Result<()> {
    let raw = fs::read_to_string(&scenario_path)
        .with_context(|| format!("failed to read {}", scenario_path.display()))?;
    let scenario: Scenario =
        serde_json::from_str(&raw).context("scenario file is not valid scenario JSON")?;

    let rules = FlightRules::default();
    let report = run_scenario(&scenario, &rules).context("scenario geometry is invalid")?;

    // The output files are written even for a crashed flight; the
    // partial log is exactly what one wants to look at in that case.
    let (log_path, geojson_path) = output::write_outputs(&out_dir, &scenario, &report)?;
    tracing::info!(
        log = %log_path.display(),
        geojson = %geojson_path.display(),
        "wrote flight outputs"
    );

    match report.flight.status {
        FlightStatus::Landed { steps } => {
            tracing::info!(steps, "flight landed");
            Ok(())
        }
        FlightStatus::Crashed { steps, obstacle, .. } => {
            bail!(
                "the flight crashed after {steps} steps{}",
                obstacle
                    .map(|name| format!(" while avoiding {name}"))
                    .unwrap_or_default()
            )
        }
    }
}
