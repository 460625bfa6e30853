//
// cli.rs
// Dicom-Tagfix
//
// Defines the CLI surface with Clap and dispatches user-selected commands to the engine.
// Every option can also be set through the environment.
//

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::events::TracingSink;
use crate::exam_paths::{self, DEFAULT_PATH_EXTRACT};
use crate::models::RunOutcome;
use crate::transaction::{self, FixOptions, DEFAULT_SENTINEL};
use crate::{detector, scanner};

#[derive(Parser)]
#[command(name = "dicom-tagfix")]
#[command(about = "Repair DICOM tags broken by special characters", long_about = None)]
pub struct Cli {
    /// Log level: 0=none, 1=warnings, 2=info, 3=debug (RUST_LOG applies when unset)
    #[arg(
        long = "log",
        global = true,
        env = "DICOM_TAGFIX_LOG",
        value_parser = clap::value_parser!(u8).range(0..=3)
    )]
    pub log_level: Option<u8>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fix special-characters errors in a directory of DICOM files
    #[command(alias = "fsc")]
    Fix {
        /// Directory of DICOM files to correct
        #[arg(short, long)]
        input: PathBuf,
        /// Template file, or a directory holding one
        #[arg(short, long, required_unless_present_all = ["exam", "series"])]
        template: Option<PathBuf>,
        /// Exam number used to look up a template when --template is absent
        #[arg(long, requires = "series")]
        exam: Option<u32>,
        #[arg(long, requires = "exam")]
        series: Option<u32>,
        #[command(flatten)]
        settings: FixSettings,
        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Complete a run interrupted after the originals were moved aside
    Resume {
        #[arg(short, long)]
        input: PathBuf,
        /// Template to use instead of the one recorded in the journal
        #[arg(short, long)]
        template: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the first readable DICOM file under a directory
    Scan { root: PathBuf },
    /// Report whether a directory would be corrected, without touching it
    Check {
        dir: PathBuf,
        #[arg(long, env = "DICOM_TAGFIX_SENTINEL", default_value = DEFAULT_SENTINEL)]
        sentinel: String,
    },
}

#[derive(clap::Args)]
pub struct FixSettings {
    /// Substring marking a corrupted value
    #[arg(long, env = "DICOM_TAGFIX_SENTINEL", default_value = DEFAULT_SENTINEL)]
    pub sentinel: String,
    /// Keep the originals in <input>_ORIGINAL instead of deleting them
    #[arg(long, env = "DICOM_TAGFIX_KEEP_ORIGINALS")]
    pub keep_originals: bool,
    /// Tool listing image paths for an exam/series
    #[arg(long, env = "DICOM_TAGFIX_PATH_EXTRACT", default_value = DEFAULT_PATH_EXTRACT)]
    pub path_extract: String,
}

impl FixSettings {
    fn options(&self) -> FixOptions {
        FixOptions {
            sentinel: self.sentinel.clone(),
            delete_originals: !self.keep_originals,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Commands::Fix {
            input,
            template,
            exam,
            series,
            settings,
            json,
        } => {
            if settings.sentinel.is_empty() {
                bail!("--sentinel must not be empty");
            }
            let template = match template {
                Some(template) => template,
                None => lookup_template(&settings.path_extract, exam, series)?,
            };
            let input = absolute(&input)?;
            let template = absolute(&template)?;
            let outcome = transaction::run(&input, &template, &settings.options(), &TracingSink)
                .with_context(|| format!("Failed to correct {}", input.display()))?;
            print_outcome(&outcome, json)?;
        }
        Commands::Resume {
            input,
            template,
            json,
        } => {
            let input = absolute(&input)?;
            let template = template.as_deref().map(absolute).transpose()?;
            let outcome = transaction::resume(&input, template.as_deref(), &TracingSink)
                .with_context(|| format!("Failed to resume {}", input.display()))?;
            print_outcome(&outcome, json)?;
        }
        Commands::Scan { root } => {
            let found = scanner::find_first_valid(&root)?;
            println!("{}", found.display());
        }
        Commands::Check { dir, sentinel } => {
            if sentinel.is_empty() {
                bail!("--sentinel must not be empty");
            }
            let corrupted = detector::is_directory_corrupted(&dir, &sentinel, &TracingSink)?;
            println!(
                "{}: {}",
                dir.display(),
                if corrupted {
                    "needs correction"
                } else {
                    "clean"
                }
            );
        }
    }

    Ok(())
}

fn init_logging(level: Option<u8>) {
    // An explicit level wins; otherwise RUST_LOG, otherwise info.
    let filter = match level {
        Some(0) => EnvFilter::new("off"),
        Some(1) => EnvFilter::new("warn"),
        Some(2) => EnvFilter::new("info"),
        Some(_) => EnvFilter::new("debug"),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn lookup_template(
    program: &str,
    exam: Option<u32>,
    series: Option<u32>,
) -> anyhow::Result<PathBuf> {
    let (Some(exam), Some(series)) = (exam, series) else {
        bail!("Provide --template, or both --exam and --series");
    };
    exam_paths::image_paths(program, exam, series)
        .into_iter()
        .next()
        .with_context(|| format!("No images found for exam {exam} series {series}"))
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    Ok(cwd.join(path))
}

fn print_outcome(outcome: &RunOutcome, json: bool) -> anyhow::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(outcome).context("Failed to serialize report")?;
        println!("{text}");
        return Ok(());
    }

    println!("Corrections made: {}", outcome.corrected);
    println!("Results are at: {}", outcome.result_dir.display());
    if let Some(backup) = &outcome.backup_dir {
        println!("Originals kept at: {}", backup.display());
    }
    if outcome.corrected {
        let report = &outcome.report;
        println!(
            "  corrected: {} | unchanged: {} | copied after error: {} | sub-directories: {}",
            report.corrected(),
            report.unchanged(),
            report.fallback_copied(),
            report.subdirectories()
        );
    }
    Ok(())
}
