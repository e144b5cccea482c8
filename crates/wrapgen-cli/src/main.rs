//! wrapgen CLI - Command-line interface for wrapper generation
//!
//! This binary provides commands for validating, planning, and building the
//! units declared in a wrapgen manifest.

use clap::Parser;
use std::process::ExitCode;

use wrapgen_cli::commands;
use wrapgen_cli::commands::build::BuildArgs;
use wrapgen_cli::logging;

mod cli_args;

use cli_args::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Validate { manifest } => commands::validate::run(&manifest),
        Commands::Plan {
            manifest,
            out_dir,
            json,
        } => commands::plan::run(&manifest, out_dir.as_deref(), json),
        Commands::Build {
            manifest,
            out_dir,
            generator,
            timeout,
            keep_going,
            jobs,
            report,
        } => commands::build::run(
            &manifest,
            BuildArgs {
                out_dir: out_dir.as_deref(),
                generator: generator.as_deref(),
                timeout_secs: timeout,
                keep_going,
                jobs,
                report: report.as_deref(),
            },
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
