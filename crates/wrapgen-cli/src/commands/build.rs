//! Build command implementation
//!
//! Runs the generator for every unit of a manifest, in dependency order, and
//! optionally writes a JSON report.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use wrapgen_core::{Descriptor, Runner, UnitError};

use super::{load, print_unit_error};
use crate::graph::{BuildOptions, BuildOutcome};

/// Command-line overrides for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildArgs<'a> {
    pub out_dir: Option<&'a str>,
    pub generator: Option<&'a str>,
    pub timeout_secs: Option<u64>,
    pub keep_going: bool,
    pub jobs: Option<usize>,
    pub report: Option<&'a str>,
}

/// A failed unit, as written to the report.
#[derive(Debug, Serialize)]
pub struct FailureEntry {
    pub unit: String,
    pub code: &'static str,
    pub category: &'static str,
    pub message: String,
}

impl From<&UnitError> for FailureEntry {
    fn from(err: &UnitError) -> Self {
        Self {
            unit: err.unit.clone(),
            code: err.code(),
            category: err.category(),
            message: err.kind.to_string(),
        }
    }
}

/// Build report written with `--report`.
#[derive(Debug, Serialize)]
pub struct BuildReport<'a> {
    pub success: bool,
    pub duration_ms: u64,
    pub units: Vec<&'a Descriptor>,
    pub failures: Vec<FailureEntry>,
    pub skipped: &'a [String],
}

impl<'a> BuildReport<'a> {
    pub fn new(outcome: &'a BuildOutcome, duration_ms: u64) -> Self {
        Self {
            success: outcome.is_success(),
            duration_ms,
            units: outcome.descriptors.iter().map(Arc::as_ref).collect(),
            failures: outcome.failures.iter().map(FailureEntry::from).collect(),
            skipped: &outcome.skipped,
        }
    }
}

/// Run the build command
///
/// # Returns
/// Exit code: 0 if every unit was built, 1 otherwise
pub fn run(manifest_path: &str, args: BuildArgs<'_>) -> Result<ExitCode> {
    let start = Instant::now();
    let loaded = load(manifest_path)?;
    let out_dir = loaded.out_dir(args.out_dir.map(Path::new))?;

    let mut config = loaded.generator_config();
    if let Some(generator) = args.generator {
        let generator = Path::new(generator);
        // Bare names are looked up in PATH; anything else is relative to the caller.
        config.executable = Some(if generator.components().count() > 1 {
            std::path::absolute(generator)
                .with_context(|| format!("Invalid generator path: {}", generator.display()))?
        } else {
            generator.to_path_buf()
        });
    }
    if let Some(secs) = args.timeout_secs {
        config = config.timeout_secs(secs);
    }
    let runner = Runner::with_config(config);

    println!("{} {}", "Building:".cyan().bold(), manifest_path);
    println!(
        "{} {} ({} unit(s))",
        "Output:".dimmed(),
        out_dir.display(),
        loaded.graph.len()
    );

    let outcome = loaded.graph.build(
        &out_dir,
        &runner,
        BuildOptions {
            keep_going: args.keep_going,
            jobs: args.jobs,
        },
    )?;
    let duration_ms = start.elapsed().as_millis() as u64;

    for descriptor in &outcome.descriptors {
        println!(
            "  {} {} {} {}",
            "✓".green(),
            descriptor.unit().bold(),
            "->".dimmed(),
            descriptor.generated_file().display()
        );
    }
    for err in &outcome.failures {
        print_unit_error(err);
    }
    for unit in &outcome.skipped {
        println!("  {} {} {}", "!".yellow(), unit.bold(), "(skipped)".dimmed());
    }

    if let Some(report_path) = args.report {
        let report = BuildReport::new(&outcome, duration_ms);
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path))?;
        println!("{} {}", "Report:".dimmed(), report_path);
    }

    if outcome.is_success() {
        println!(
            "{} {} unit(s) in {}ms",
            "OK".green().bold(),
            outcome.descriptors.len(),
            duration_ms
        );
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} {} failed, {} skipped",
            "FAIL".red().bold(),
            outcome.failures.len(),
            outcome.skipped.len()
        );
        Ok(ExitCode::from(1))
    }
}
