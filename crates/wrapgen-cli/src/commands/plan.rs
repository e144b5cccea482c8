//! Plan command implementation
//!
//! Prints the exact generator invocation of every unit, in build order,
//! without running anything.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use wrapgen_core::Invocation;

use super::load;

/// One planned unit, as printed with `--json`.
#[derive(Debug, Serialize)]
pub struct PlannedUnit {
    pub unit: String,
    pub root: String,
    pub output: String,
    pub args: Vec<String>,
    pub fingerprint: String,
}

impl From<&Invocation> for PlannedUnit {
    fn from(invocation: &Invocation) -> Self {
        Self {
            unit: invocation.unit().to_string(),
            root: invocation.root().display().to_string(),
            output: invocation.output().display().to_string(),
            args: invocation
                .args()
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            fingerprint: invocation.fingerprint(),
        }
    }
}

/// Run the plan command
pub fn run(manifest_path: &str, out_dir: Option<&str>, json: bool) -> Result<ExitCode> {
    let loaded = load(manifest_path)?;
    let out_dir = loaded.out_dir(out_dir.map(Path::new))?;
    let plans = loaded
        .graph
        .plan(&out_dir, loaded.manifest.generator.mode)?;

    if json {
        let planned: Vec<PlannedUnit> = plans.iter().map(PlannedUnit::from).collect();
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Plan:".cyan().bold(), manifest_path);
    println!(
        "{} {}",
        "Mode:".dimmed(),
        loaded.manifest.generator.mode
    );
    for plan in &plans {
        let planned = PlannedUnit::from(plan);
        println!(
            "  {} {} {}",
            planned.unit.bold(),
            "->".dimmed(),
            planned.output
        );
        println!("      {}", planned.args.join(" ").dimmed());
    }
    Ok(ExitCode::SUCCESS)
}
