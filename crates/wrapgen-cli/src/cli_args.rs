//! CLI argument definitions for the wrapgen command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

/// wrapgen - Wrapper generation for interface-definition units
#[derive(Parser)]
#[command(name = "wrapgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check a build manifest without running the generator
    Validate {
        /// Path to the manifest file
        #[arg(short, long, default_value = "wrapgen.json")]
        manifest: String,
    },

    /// Print the generator invocation of every unit
    Plan {
        /// Path to the manifest file
        #[arg(short, long, default_value = "wrapgen.json")]
        manifest: String,

        /// Output directory (default: manifest's out_dir, or wrapgen-out)
        #[arg(long)]
        out_dir: Option<String>,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the generator for every unit, in dependency order
    Build {
        /// Path to the manifest file
        #[arg(short, long, default_value = "wrapgen.json")]
        manifest: String,

        /// Output directory (default: manifest's out_dir, or wrapgen-out)
        #[arg(long)]
        out_dir: Option<String>,

        /// Generator executable (overrides the manifest and WRAPGEN_GENERATOR)
        #[arg(long)]
        generator: Option<String>,

        /// Per-unit timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Keep building units that do not depend on a failed unit
        #[arg(short, long)]
        keep_going: bool,

        /// Number of parallel generator runs
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Write a JSON build report to this path
        #[arg(long)]
        report: Option<String>,
    },
}
