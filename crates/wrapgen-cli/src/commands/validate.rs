//! Validate command implementation
//!
//! Checks a manifest without running the generator.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use super::{load, print_unit_error};

/// Run the validate command
///
/// # Returns
/// Exit code: 0 if every unit is valid, 1 otherwise
pub fn run(manifest_path: &str) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), manifest_path);

    let loaded = load(manifest_path)?;
    let errors = loaded.graph.check_declarations();

    if errors.is_empty() {
        println!(
            "{} {} unit(s) valid",
            "OK".green().bold(),
            loaded.graph.len()
        );
        return Ok(ExitCode::SUCCESS);
    }

    for err in &errors {
        print_unit_error(err);
    }
    println!(
        "{} {} of {} unit(s) invalid",
        "FAIL".red().bold(),
        errors.len(),
        loaded.graph.len()
    );
    Ok(ExitCode::from(1))
}
