//! STS result checker CLI
//!
//! - `sts-check check <dir>`: judge every `*.json` result file in a directory
//! - `sts-check generate <n>`: print a circle-method schedule as period rows
//!
//! Environment:
//! - `RUST_LOG`: log filter (default: info)

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use u_tournament::aggregate::{ResultAggregator, ResultFile};
use u_tournament::config::CheckerConfig;
use u_tournament::evaluation::{HomeAwayBalancer, ImbalanceEvaluator};
use u_tournament::generator::CircleMethodGenerator;
use u_tournament::validation::ConstraintValidator;

#[derive(Parser)]
#[command(name = "sts-check")]
#[command(about = "Verify and generate sports tournament schedules", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Judge every result file in a directory
    Check {
        /// Directory containing `<n>.json` result files
        dir: PathBuf,

        /// Print the report as JSON instead of text
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print a circle-method schedule for `n` teams
    Generate {
        /// Number of teams (positive, even)
        n: i64,

        /// Reassign home/away to minimise total imbalance
        #[arg(long, default_value = "false")]
        balanced: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CheckerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CheckerConfig::default(),
    };

    match cli.command {
        Commands::Check { dir, json } => check(&config, dir, json),
        Commands::Generate { n, balanced } => generate(&config, n, balanced),
    }
}

fn check(config: &CheckerConfig, dir: PathBuf, json: bool) -> Result<()> {
    let records = ResultFile::load_dir(&dir)?;
    info!("loaded {} result(s) from {}", records.len(), dir.display());

    let report = ResultAggregator::new(config.clone()).run(records);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }

    let failures = report.failures().count();
    if failures > 0 {
        bail!("{failures} result(s) failed");
    }
    Ok(())
}

fn generate(config: &CheckerConfig, n: i64, balanced: bool) -> Result<()> {
    let generator = CircleMethodGenerator::new(n)?.with_search_budget(config.search_node_budget);
    let (mut schedule, report) = generator.generate_with_report();
    info!(
        "n={n}: {} period assignment, max period load {}",
        report.strategy, report.max_period_load
    );

    if balanced {
        schedule = HomeAwayBalancer::balance(&schedule);
    }

    let validation = ConstraintValidator::validate(&schedule);
    for violation in &validation.violations {
        warn!("{violation}");
    }
    if let Ok(total) = ImbalanceEvaluator::evaluate(&schedule) {
        info!("total imbalance {total}");
    }

    println!("{}", serde_json::to_string(&schedule.to_period_rows())?);
    Ok(())
}
