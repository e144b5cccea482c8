//! CLI command implementations

pub mod build;
pub mod plan;
pub mod validate;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use wrapgen_core::{GeneratorConfig, UnitError};

use crate::graph::BuildGraph;
use crate::manifest::{manifest_dir, BuildManifest};

/// A loaded manifest with its registered graph.
pub(crate) struct Loaded {
    pub manifest: BuildManifest,
    pub graph: BuildGraph,
    /// Directory relative manifest paths are resolved against.
    pub base_dir: PathBuf,
}

impl Loaded {
    /// Output directory as seen from [`Self::base_dir`].
    ///
    /// A command-line override is relative to the current directory, so it is
    /// made absolute; the manifest's own setting is kept as written.
    pub fn out_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        match override_dir {
            Some(dir) if dir.is_relative() => Ok(std::env::current_dir()
                .context("Failed to read current directory")?
                .join(dir)),
            Some(dir) => Ok(dir.to_path_buf()),
            None => Ok(self.manifest.out_dir(None)),
        }
    }

    /// Generator configuration with paths anchored at the manifest directory.
    pub fn generator_config(&self) -> GeneratorConfig {
        let mut config = self.manifest.generator.to_config();
        // A relative executable with a directory part names a file next to the manifest.
        let anchored = config
            .executable
            .as_ref()
            .filter(|exe| exe.is_relative() && exe.components().count() > 1)
            .map(|exe| self.base_dir.join(exe));
        if anchored.is_some() {
            config.executable = anchored;
        }
        config.working_dir(self.base_dir.clone())
    }
}

/// Loads a manifest and registers every unit, rejecting duplicates,
/// unknown dependencies and cycles.
pub(crate) fn load(manifest_path: &str) -> Result<Loaded> {
    let path = Path::new(manifest_path);
    let manifest = BuildManifest::load(path)?;
    let graph = BuildGraph::from_manifest(&manifest)
        .with_context(|| format!("Invalid manifest: {}", manifest_path))?;
    graph
        .validate()
        .with_context(|| format!("Invalid manifest: {}", manifest_path))?;

    let base_dir = std::path::absolute(manifest_dir(path))
        .with_context(|| format!("Invalid manifest path: {}", manifest_path))?;

    Ok(Loaded {
        manifest,
        graph,
        base_dir,
    })
}

/// Prints one unit error as an indented diagnostic line.
pub(crate) fn print_unit_error(err: &UnitError) {
    println!(
        "  {} {} [{}]: {}",
        "✗".red(),
        err.unit.bold(),
        err.code().dimmed(),
        err.kind
    );
    if let Some(generation) = err.as_generation() {
        for line in generation.diagnostics().lines() {
            println!("      {}", line.dimmed());
        }
    }
}
