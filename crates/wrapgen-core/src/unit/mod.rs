//! Unit declarations.
//!
//! A [`UnitDecl`] is the locally declared configuration of one generation
//! target. It never carries dependency data: dependencies are handed to
//! construction as already-published [`Descriptor`](crate::Descriptor)s.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::ConfigurationError;

/// Unit name pattern.
pub const UNIT_NAME_PATTERN: &str = r"^[a-z][a-z0-9_-]{0,63}$";

/// Suffix appended to the unit name when no output name is declared.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_wrap.cc";

static UNIT_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn unit_name_regex() -> &'static Regex {
    UNIT_NAME_REGEX.get_or_init(|| Regex::new(UNIT_NAME_PATTERN).expect("invalid regex pattern"))
}

/// Returns true if `name` is a valid unit name.
pub fn is_valid_unit_name(name: &str) -> bool {
    unit_name_regex().is_match(name)
}

/// The declared configuration of one generation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDecl {
    /// Unit name; also the default stem of the generated file.
    pub name: String,

    /// Interface files, in declaration order. Must not be empty.
    pub inputs: Vec<PathBuf>,

    /// Entry point handed to the generator when several inputs are declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Generator module name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Generator namespace prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_prefix: Option<String>,

    /// Name of the generated file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Include-path fragments declared on this unit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    /// Opaque generator option tokens declared on this unit.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl UnitDecl {
    /// Starts a builder for a unit with the given name.
    pub fn builder(name: impl Into<String>) -> UnitDeclBuilder {
        UnitDeclBuilder::new(name)
    }

    /// Parses a declaration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Name of the generated file, defaulting to `<name>_wrap.cc`.
    pub fn output_name(&self) -> String {
        match &self.output {
            Some(output) => output.clone(),
            None => format!("{}{}", self.name, DEFAULT_OUTPUT_SUFFIX),
        }
    }

    /// Path of the generated file inside `out_dir`.
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(self.output_name())
    }

    /// Checks the structural invariants of the declaration.
    ///
    /// Root resolution is checked separately by [`crate::root::resolve_root`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !is_valid_unit_name(&self.name) {
            return Err(ConfigurationError::InvalidName {
                name: self.name.clone(),
            });
        }

        if self.inputs.is_empty() {
            return Err(ConfigurationError::NoInputs);
        }

        if let Some(output) = &self.output {
            let invalid = matches!(output.as_str(), "" | "." | "..")
                || output.contains('/')
                || output.contains('\\');
            if invalid {
                return Err(ConfigurationError::InvalidOutputName {
                    name: output.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Builder for [`UnitDecl`].
#[derive(Debug)]
pub struct UnitDeclBuilder {
    decl: UnitDecl,
}

impl UnitDeclBuilder {
    /// Creates a new builder with no inputs.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            decl: UnitDecl {
                name: name.into(),
                inputs: Vec::new(),
                root: None,
                module: None,
                namespace_prefix: None,
                output: None,
                includes: Vec::new(),
                options: Vec::new(),
            },
        }
    }

    /// Adds an input file.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.decl.inputs.push(path.into());
        self
    }

    /// Designates the root input.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.decl.root = Some(path.into());
        self
    }

    /// Sets the generator module name.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.decl.module = Some(module.into());
        self
    }

    /// Sets the generator namespace prefix.
    pub fn namespace_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.decl.namespace_prefix = Some(prefix.into());
        self
    }

    /// Sets the generated file name.
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.decl.output = Some(name.into());
        self
    }

    /// Adds an include-path fragment.
    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.decl.includes.push(include.into());
        self
    }

    /// Adds a generator option token.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.decl.options.push(option.into());
        self
    }

    /// Builds the declaration without validating it.
    pub fn build(self) -> UnitDecl {
        self.decl
    }
}
