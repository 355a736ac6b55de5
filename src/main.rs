use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use covdiff::config::Config;
use covdiff::{evaluate, load_report, summarize, CoverageDiff, FileFilter, ReportFormat, Summary};

#[derive(Parser)]
#[command(name = "covdiff")]
#[command(about = "Summarize coverage reports and diff two snapshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: covdiff.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report format: json or lcov (default: detect from extension)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Increase log verbosity (overridden by RUST_LOG)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-file and per-group coverage for one report
    Summary {
        /// Coverage report to summarize
        report: PathBuf,
    },

    /// Print coverage differences between two reports
    Diff {
        /// Report from before the change
        before: PathBuf,

        /// Report from after the change
        after: PathBuf,

        /// Include groups whose coverage did not change
        #[arg(long)]
        all_groups: bool,

        /// Fail when the diff breaks the configured gate
        #[arg(long)]
        check: bool,
    },
}

#[derive(Serialize)]
struct DiffOutput<'a> {
    #[serde(flatten)]
    diff: &'a CoverageDiff,
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<bool>,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::load_or_default(cli.config.as_deref(), &current_dir)?;

    let format = cli
        .format
        .as_deref()
        .map(str::parse::<ReportFormat>)
        .transpose()?;

    let filter = FileFilter::new(&config.diff.exclude)?;

    match cli.command {
        Commands::Summary { report } => cmd_summary(&report, format, &filter),
        Commands::Diff {
            before,
            after,
            all_groups,
            check,
        } => {
            let groups_diff_only = config.diff.groups_diff_only && !all_groups;
            let passed = cmd_diff(
                &config,
                &before,
                &after,
                format,
                &filter,
                groups_diff_only,
                check,
            )?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_summary(path: &Path, format: Option<ReportFormat>, filter: &FileFilter) -> Result<Summary> {
    let format = format.unwrap_or_else(|| ReportFormat::detect(path));
    let raw = load_report(path, format)
        .with_context(|| format!("Could not load coverage report {}", path.display()))?;

    Ok(filter.apply(&summarize(&raw)))
}

fn cmd_summary(report: &Path, format: Option<ReportFormat>, filter: &FileFilter) -> Result<()> {
    let summary = load_summary(report, format, filter)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_diff(
    config: &Config,
    before: &Path,
    after: &Path,
    format: Option<ReportFormat>,
    filter: &FileFilter,
    groups_diff_only: bool,
    check: bool,
) -> Result<bool> {
    let before = load_summary(before, format, filter)?;
    let after = load_summary(after, format, filter)?;

    let diff = CoverageDiff::between(&before, &after, groups_diff_only);

    let gate = check.then(|| evaluate(&diff, &config.gate));

    let output = DiffOutput {
        diff: &diff,
        passed: gate.as_ref().map(|g| g.passed),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    match gate {
        Some(result) => {
            result.print_summary();
            Ok(result.passed)
        }
        None => Ok(true),
    }
}
