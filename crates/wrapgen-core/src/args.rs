//! Generator command-line construction.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::Path;

use crate::metadata::MetadataSet;

/// Flag preceding the module name.
pub const MODULE_FLAG: &str = "-module";
/// Flag preceding the namespace prefix.
pub const NAMESPACE_FLAG: &str = "-namespace";
/// Prefix of every include search path token.
pub const INCLUDE_FLAG: &str = "-I";
/// Flag preceding the output path.
pub const OUTPUT_FLAG: &str = "-o";

/// Target language and style of the generated wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorMode {
    /// C++ wrapper for Python.
    #[default]
    Python,
    /// C++ wrapper for Java.
    Java,
    /// C++ wrapper for C#.
    Csharp,
    /// C++ wrapper for Go.
    Go,
}

impl GeneratorMode {
    /// Returns the string identifier for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorMode::Python => "python",
            GeneratorMode::Java => "java",
            GeneratorMode::Csharp => "csharp",
            GeneratorMode::Go => "go",
        }
    }

    /// The fixed flags that open every command line in this mode.
    pub fn flags(&self) -> &'static [&'static str] {
        match self {
            GeneratorMode::Python => &["-c++", "-python"],
            GeneratorMode::Java => &["-c++", "-java"],
            GeneratorMode::Csharp => &["-c++", "-csharp"],
            GeneratorMode::Go => &["-c++", "-go", "-cgo", "-intgosize", "64"],
        }
    }
}

impl std::fmt::Display for GeneratorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GeneratorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "python" => Ok(GeneratorMode::Python),
            "java" => Ok(GeneratorMode::Java),
            "csharp" => Ok(GeneratorMode::Csharp),
            "go" => Ok(GeneratorMode::Go),
            _ => Err(format!("unknown generator mode: {}", s)),
        }
    }
}

/// Everything the argument builder needs for one unit.
#[derive(Debug, Clone, Copy)]
pub struct ArgumentInputs<'a> {
    pub mode: GeneratorMode,
    pub module: Option<&'a str>,
    pub namespace_prefix: Option<&'a str>,
    pub options: &'a MetadataSet,
    pub includes: &'a MetadataSet,
    pub output: &'a Path,
    pub root: &'a Path,
}

/// Builds the generator argument vector.
///
/// Order: mode flags, module, namespace prefix, options, includes, output,
/// root. Empty or absent module and namespace values are omitted entirely.
/// Include order is kept verbatim since later `-I` entries can be shadowed by
/// earlier ones.
pub fn build_arguments(inputs: &ArgumentInputs<'_>) -> Vec<OsString> {
    let mut args: Vec<OsString> = inputs.mode.flags().iter().map(OsString::from).collect();

    if let Some(module) = inputs.module.filter(|m| !m.is_empty()) {
        args.push(MODULE_FLAG.into());
        args.push(module.into());
    }

    if let Some(prefix) = inputs.namespace_prefix.filter(|p| !p.is_empty()) {
        args.push(NAMESPACE_FLAG.into());
        args.push(prefix.into());
    }

    args.extend(inputs.options.iter().map(OsString::from));

    for include in inputs.includes {
        args.push(format!("{}{}", INCLUDE_FLAG, include).into());
    }

    args.push(OUTPUT_FLAG.into());
    args.push(inputs.output.into());
    args.push(inputs.root.into());

    args
}
