use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

mod error;
mod grading;
mod input;
mod logging;
mod models;
mod report;
mod timestamp;

use crate::models::{Dataset, Gradebook, LearnerResult};

#[derive(Parser)]
#[command(name = "learner-scores")]
#[command(about = "Weighted learner scores for a course assignment group", long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "LEARNER_SCORES_LOG_LEVEL", default_value = "warn")]
    log_level: String,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the demonstration dataset as JSON
    Sample {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Score learners and print the results
    Score {
        #[arg(long, env = "LEARNER_SCORES_DATASET")]
        dataset: PathBuf,
        #[arg(long)]
        submissions_csv: Option<PathBuf>,
        /// Fail on grading errors instead of printing no results
        #[arg(long)]
        strict: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, env = "LEARNER_SCORES_DATASET")]
        dataset: PathBuf,
        #[arg(long)]
        submissions_csv: Option<PathBuf>,
        #[arg(long)]
        strict: bool,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn run_grading(dataset: &Dataset, strict: bool) -> anyhow::Result<Gradebook> {
    let (course, group, submissions) = (
        &dataset.course,
        &dataset.assignment_group,
        &dataset.submissions,
    );

    if strict {
        return grading::grade(course, group, submissions).context("grading failed");
    }

    Ok(grading::grade_or_empty(course, group, submissions))
}

fn score_learners(dataset: &Dataset, strict: bool) -> anyhow::Result<Vec<LearnerResult>> {
    let (course, group, submissions) = (
        &dataset.course,
        &dataset.assignment_group,
        &dataset.submissions,
    );

    if strict {
        return grading::compute(course, group, submissions).context("grading failed");
    }

    Ok(grading::compute_or_empty(course, group, submissions))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    match cli.command {
        Commands::Sample { out } => {
            let sample = input::sample_dataset()?;
            let json = serde_json::to_string_pretty(&sample)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Sample dataset written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Score {
            dataset,
            submissions_csv,
            strict,
            format,
        } => {
            let dataset = input::load_inputs(&dataset, submissions_csv.as_deref())?;
            let results = score_learners(&dataset, strict)?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                }
                OutputFormat::Text => {
                    if results.is_empty() {
                        println!("No scored submissions.");
                        return Ok(());
                    }

                    println!("Learner scores:");
                    for result in &results {
                        println!("{}", report::format_learner_line(result));
                    }
                }
            }
        }
        Commands::Report {
            dataset,
            submissions_csv,
            strict,
            out,
        } => {
            let dataset = input::load_inputs(&dataset, submissions_csv.as_deref())?;
            let gradebook = run_grading(&dataset, strict)?;
            let report = report::build_report(&dataset, &gradebook);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
