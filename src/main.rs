//! Robojudge CLI - Prescription Submission Validation
//!
//! `validate` checks one submission file, `prescribe` runs every task of a
//! task list through a prescription module and validates each output.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use robojudge::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Command-line arguments for robojudge
#[derive(Parser, Debug)]
#[command(name = "robojudge")]
#[command(about = "Generate and validate intervention plan prescriptions")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "ROBOJUDGE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a prescription submission file
    Validate {
        /// First day of the prescription horizon, YYYY-MM-DD
        #[arg(short, long, alias = "start_date")]
        start_date: Option<String>,

        /// Last day of the prescription horizon, YYYY-MM-DD
        #[arg(short, long, alias = "end_date")]
        end_date: Option<String>,

        /// Intervention plan listing the geographies to prescribe for
        #[arg(short, long, alias = "interventions_plan")]
        interventions_plan: PathBuf,

        /// Submission file to check
        #[arg(short = 'f', long, alias = "submission_file")]
        submission_file: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate prescriptions for every requested task, then validate them
    Prescribe {
        /// CSV list of requested prescriptions
        #[arg(short = 'f', long, alias = "requested_prescriptions_file")]
        requested_prescriptions_file: PathBuf,

        /// Prescription module to run
        #[arg(short, long, alias = "prescription_module")]
        prescription_module: Option<PathBuf>,

        /// Program that runs the prescription module
        #[arg(long)]
        interpreter: Option<String>,

        /// Regenerate outputs that already exist
        #[arg(long)]
        force: bool,
    },
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<20} {:<8} {}",
                buf.timestamp(),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = JudgeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Validate {
            start_date,
            end_date,
            interventions_plan,
            submission_file,
            json,
        } => {
            let start_date = start_date.unwrap_or_else(|| config.validation.default_start_date.clone());
            let end_date = end_date.unwrap_or_else(|| config.validation.default_end_date.clone());
            validate(
                &config,
                &start_date,
                &end_date,
                &interventions_plan,
                &submission_file,
                json,
            )
        }
        Command::Prescribe {
            requested_prescriptions_file,
            prescription_module,
            interpreter,
            force,
        } => prescribe(
            &config,
            &requested_prescriptions_file,
            prescription_module,
            interpreter,
            force,
        ),
    }
}

fn validate(
    config: &JudgeConfig,
    start_date: &str,
    end_date: &str,
    interventions_plan: &Path,
    submission_file: &Path,
    json: bool,
) -> Result<()> {
    let report = ValidationPipeline::default()
        .with_parallel(config.validation.parallel)
        .validate_files(start_date, end_date, interventions_plan, submission_file)
        .with_context(|| format!("Could not validate {}", submission_file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    // Findings are reported, they do not change the exit status.
    if report.is_valid() {
        info!("{} submission passes validation", submission_file.display());
    } else {
        warn!("Submission {} has errors: ", submission_file.display());
        warn!("{}", report.messages().join("\n"));
    }
    info!("{}", report.summary());
    Ok(())
}

fn prescribe(
    config: &JudgeConfig,
    requested_prescriptions_file: &Path,
    prescription_module: Option<PathBuf>,
    interpreter: Option<String>,
    force: bool,
) -> Result<()> {
    let module = prescription_module
        .or_else(|| config.runner.prescription_module.clone())
        .context("No prescription module given on the command line or in the configuration")?;
    let interpreter = interpreter.unwrap_or_else(|| config.runner.interpreter.clone());

    let summary = PrescriptionRunner::new(Box::new(ProcessLauncher::new(interpreter, module)))
        .with_options(RunOptions {
            skip_existing: config.runner.skip_existing && !force,
        })
        .with_pipeline(ValidationPipeline::default().with_parallel(config.validation.parallel))
        .run_task_list(requested_prescriptions_file)?;

    info!(
        "Done with prescriptions: {} task(s), {} skipped, {} valid, {}ms",
        summary.outcomes.len(),
        summary.skipped(),
        summary.valid(),
        summary.duration_ms
    );
    Ok(())
}
