mod scenario;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scenario::Scenario;
use sightline_visibility::VisibilityConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sightcheck")]
#[command(about = "Line-of-sight scenario runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every check in a scenario file and compare with expectations
    Run {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Visibility config file, replacing the scenario's [config] table
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compute look-direction diagnostics
        #[arg(long)]
        debug: bool,
    },
    /// List the block table a scenario uses
    Table {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            debug,
        } => run(scenario, config, debug),
        Commands::Table { scenario } => table(scenario),
    }
}

fn run(path: PathBuf, config_path: Option<PathBuf>, debug: bool) -> Result<()> {
    let scenario = Scenario::load(&path)?;

    // Priority: --config file > scenario [config] > defaults; env on top
    let file_config = match config_path {
        Some(p) => Some(
            VisibilityConfig::load(&p)
                .with_context(|| format!("Failed to load config {}", p.display()))?,
        ),
        None => scenario.config.clone(),
    };
    let mut config = match file_config {
        Some(c) => c.with_env_overrides(),
        None => VisibilityConfig::from_env(),
    }
    .context("Invalid SIGHTLINE_* environment override")?;
    config.debug |= debug;

    let report = scenario.run(config)?;
    for case in &report.cases {
        println!("{case}");
    }
    println!(
        "{} checks, {} failed; vl interact={:.2} combat={:.2}",
        report.cases.len(),
        report.failures(),
        report.interact_vl,
        report.fight_vl
    );

    anyhow::ensure!(
        report.failures() == 0,
        "{} of {} checks did not match their expectation",
        report.failures(),
        report.cases.len()
    );
    Ok(())
}

fn table(path: PathBuf) -> Result<()> {
    let scenario = Scenario::load(&path)?;
    let table = scenario.build_table()?;
    println!("{:>5}  {:<16} {:<12} {:>5}  flags", "id", "name", "category", "boxes");
    for (id, props) in table.iter() {
        let boxes = props.bounds.as_ref().map_or(0, |b| b.boxes().len());
        println!(
            "{:>5}  {:<16} {:<12} {:>5}  {:?}",
            id.0,
            props.name,
            props.category().name(),
            boxes,
            props.flags
        );
    }
    Ok(())
}
