//! Build manifest loading.
//!
//! A manifest is a JSON document declaring the generator setup and every
//! unit of a build, with dependencies referenced by unit name:
//!
//! ```json
//! {
//!   "generator": { "mode": "python", "timeout_secs": 120 },
//!   "out_dir": "gen",
//!   "units": [
//!     { "name": "base", "inputs": ["base.i"], "includes": ["include"] },
//!     { "name": "geometry", "inputs": ["geometry.i"], "module": "geometry", "deps": ["base"] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wrapgen_core::{GeneratorConfig, GeneratorMode, UnitDecl};

/// Output directory used when neither the manifest nor the command line sets one.
pub const DEFAULT_OUT_DIR: &str = "wrapgen-out";

/// Errors that can occur while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read the manifest file.
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the manifest JSON.
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Generator settings shared by every unit in a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorSection {
    /// Generator executable (path or bare name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<PathBuf>,

    /// Target language mode.
    #[serde(default)]
    pub mode: GeneratorMode,

    /// Per-unit timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl GeneratorSection {
    /// Converts the section into a runner configuration.
    pub fn to_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::default().mode(self.mode);
        config.executable = self.executable.clone();
        if let Some(secs) = self.timeout_secs {
            config = config.timeout_secs(secs);
        }
        config
    }
}

/// A unit declaration plus the names of its direct dependencies.
///
/// In JSON the declaration fields and `deps` sit side by side in one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UnitEntry", into = "UnitEntry")]
pub struct ManifestUnit {
    pub decl: UnitDecl,

    /// Direct dependencies, by unit name, in precedence order.
    pub deps: Vec<String>,
}

/// Wire form of [`ManifestUnit`]. Listed field by field so that a misspelled
/// key is rejected instead of dropped.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    name: String,
    inputs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    deps: Vec<String>,
}

impl From<UnitEntry> for ManifestUnit {
    fn from(entry: UnitEntry) -> Self {
        Self {
            decl: UnitDecl {
                name: entry.name,
                inputs: entry.inputs,
                root: entry.root,
                module: entry.module,
                namespace_prefix: entry.namespace_prefix,
                output: entry.output,
                includes: entry.includes,
                options: entry.options,
            },
            deps: entry.deps,
        }
    }
}

impl From<ManifestUnit> for UnitEntry {
    fn from(unit: ManifestUnit) -> Self {
        let ManifestUnit { decl, deps } = unit;
        Self {
            name: decl.name,
            inputs: decl.inputs,
            root: decl.root,
            module: decl.module,
            namespace_prefix: decl.namespace_prefix,
            output: decl.output,
            includes: decl.includes,
            options: decl.options,
            deps,
        }
    }
}

/// A complete build manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildManifest {
    #[serde(default)]
    pub generator: GeneratorSection,

    /// Output directory, relative to the manifest's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    pub units: Vec<ManifestUnit>,
}

impl BuildManifest {
    /// Parses a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads a manifest from a file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The output directory: `override_dir`, then the manifest's `out_dir`,
    /// then [`DEFAULT_OUT_DIR`].
    pub fn out_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        override_dir
            .map(Path::to_path_buf)
            .or_else(|| self.out_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR))
    }
}

/// Directory that relative paths in the manifest at `path` are resolved against.
pub fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
