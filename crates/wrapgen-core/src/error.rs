//! Error types for unit construction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for unit construction.
pub type WrapgenResult<T> = Result<T, UnitError>;

/// Structural problems with a unit declaration.
///
/// Raised before anything is executed; never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The unit declares no input files.
    #[error("at least one input file is required")]
    NoInputs,

    /// Several inputs were declared but none was designated as root.
    #[error("root entry required when multiple inputs are provided")]
    MissingRoot,

    /// The designated root is not one of the declared inputs.
    #[error("root '{root}' is not one of the declared inputs")]
    UnknownRoot { root: PathBuf },

    /// The unit name does not match `[a-z][a-z0-9_-]{0,63}`.
    #[error("invalid unit name '{name}' (expected [a-z][a-z0-9_-]{{0,63}})")]
    InvalidName { name: String },

    /// The output file name is empty, `.`/`..`, or contains a path separator.
    #[error("invalid output name '{name}'")]
    InvalidOutputName { name: String },

    /// Another unit already writes the same output file.
    #[error("output '{output}' is already written by unit '{other_unit}'")]
    DuplicateOutput { output: String, other_unit: String },
}

/// Failures of the external generator.
///
/// Generation is deterministic, so none of these are retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No generator executable could be located.
    #[error("generator executable not found. Set WRAPGEN_GENERATOR or install 'swig' in PATH")]
    GeneratorNotFound,

    /// The generator process could not be started.
    #[error("failed to spawn generator '{executable}': {source}")]
    SpawnFailed {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generator exited with a non-zero status.
    #[error("generator exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// The generator exited successfully but did not write its output.
    #[error("generator did not produce declared output {path}")]
    OutputMissing { path: PathBuf, stderr: String },

    /// The generator did not finish in time and was killed.
    #[error("generator timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64, stderr: String },

    /// The output directory could not be prepared.
    #[error("failed to prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    /// Creates a process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Exit status reported by the generator, if it ran to completion.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GenerationError::ProcessFailed { exit_code, .. } => Some(*exit_code),
            GenerationError::OutputMissing { .. } => Some(0),
            _ => None,
        }
    }

    /// Diagnostics captured from the generator's stderr.
    pub fn diagnostics(&self) -> &str {
        match self {
            GenerationError::ProcessFailed { stderr, .. }
            | GenerationError::OutputMissing { stderr, .. }
            | GenerationError::Timeout { stderr, .. } => stderr,
            _ => "",
        }
    }
}

/// Malformed or unresolvable dependency Descriptors.
///
/// These indicate an integration bug in whatever assembled the graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// A dependency Descriptor has no generated file.
    #[error("dependency #{index} has an empty generated file path")]
    MalformedDescriptor { index: usize },

    /// A dependency name could not be resolved to a published Descriptor.
    #[error("dependency '{dependency}' has not been published")]
    MissingDependency { dependency: String },
}

/// Construction failure, tagged with the unit that failed.
#[derive(Debug, Error)]
#[error("unit '{unit}': {kind}")]
pub struct UnitError {
    /// Name of the unit being constructed.
    pub unit: String,
    /// What went wrong.
    #[source]
    pub kind: UnitErrorKind,
}

/// The three error kinds a unit construction can raise.
#[derive(Debug, Error)]
pub enum UnitErrorKind {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl UnitError {
    /// Wraps an error kind with the name of the failing unit.
    pub fn new(unit: impl Into<String>, kind: impl Into<UnitErrorKind>) -> Self {
        Self {
            unit: unit.into(),
            kind: kind.into(),
        }
    }

    /// Stable code for programmatic handling, e.g. `CONFIG_002`.
    pub fn code(&self) -> &'static str {
        match &self.kind {
            UnitErrorKind::Configuration(e) => match e {
                ConfigurationError::NoInputs => "CONFIG_001",
                ConfigurationError::MissingRoot => "CONFIG_002",
                ConfigurationError::UnknownRoot { .. } => "CONFIG_003",
                ConfigurationError::InvalidName { .. } => "CONFIG_004",
                ConfigurationError::InvalidOutputName { .. } => "CONFIG_005",
                ConfigurationError::DuplicateOutput { .. } => "CONFIG_006",
            },
            UnitErrorKind::Generation(e) => match e {
                GenerationError::GeneratorNotFound => "GEN_001",
                GenerationError::SpawnFailed { .. } => "GEN_002",
                GenerationError::ProcessFailed { .. } => "GEN_003",
                GenerationError::OutputMissing { .. } => "GEN_004",
                GenerationError::Timeout { .. } => "GEN_005",
                GenerationError::OutputDir { .. } => "GEN_006",
            },
            UnitErrorKind::Aggregation(e) => match e {
                AggregationError::MalformedDescriptor { .. } => "AGG_001",
                AggregationError::MissingDependency { .. } => "AGG_002",
            },
        }
    }

    /// Error category: `configuration`, `generation` or `aggregation`.
    pub fn category(&self) -> &'static str {
        match &self.kind {
            UnitErrorKind::Configuration(_) => "configuration",
            UnitErrorKind::Generation(_) => "generation",
            UnitErrorKind::Aggregation(_) => "aggregation",
        }
    }

    /// Returns the configuration error, if that is what this is.
    pub fn as_configuration(&self) -> Option<&ConfigurationError> {
        match &self.kind {
            UnitErrorKind::Configuration(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the generation error, if that is what this is.
    pub fn as_generation(&self) -> Option<&GenerationError> {
        match &self.kind {
            UnitErrorKind::Generation(e) => Some(e),
            _ => None,
        }
    }
}
