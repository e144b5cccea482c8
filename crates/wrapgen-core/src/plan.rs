//! Invocation planning and unit construction.
//!
//! [`plan_unit`] performs everything up to, but not including, running the
//! generator: root resolution, aggregation and argument construction.
//! [`construct_unit`] runs the plan and publishes the [`Descriptor`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::aggregate::{aggregate, Aggregated};
use crate::args::{build_arguments, ArgumentInputs, GeneratorMode};
use crate::descriptor::Descriptor;
use crate::error::{UnitError, WrapgenResult};
use crate::metadata::SourceSet;
use crate::root::resolve_root;
use crate::runner::Runner;
use crate::unit::UnitDecl;

/// A fully planned generator run for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    unit: String,
    root: PathBuf,
    args: Vec<OsString>,
    output: PathBuf,
    aggregated: Aggregated,
}

impl Invocation {
    /// Name of the unit this invocation belongs to.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The resolved entry-point file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Generator arguments, excluding the executable.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Files the generator may read: the unit's own inputs, then the
    /// transitive sources of its dependencies.
    pub fn declared_inputs(&self) -> &SourceSet {
        &self.aggregated.sources
    }

    /// The single file the generator must write.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Aggregated metadata that will be published with the output.
    pub fn aggregated(&self) -> &Aggregated {
        &self.aggregated
    }

    /// Hex BLAKE3 digest of the argument vector and declared inputs.
    ///
    /// Two invocations with the same fingerprint run the same command over
    /// the same file set.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for arg in &self.args {
            hasher.update(arg.to_string_lossy().as_bytes());
            hasher.update(&[0]);
        }
        hasher.update(&[0]);
        for input in self.declared_inputs() {
            hasher.update(input.to_string_lossy().as_bytes());
            hasher.update(&[0]);
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Publishes the descriptor for this invocation.
    ///
    /// Only call this once the generator has written [`Self::output`].
    pub fn into_descriptor(self) -> Descriptor {
        let fingerprint = self.fingerprint();
        let Aggregated {
            sources,
            includes,
            options,
        } = self.aggregated;
        Descriptor::new(self.unit, self.output, sources, includes, options, fingerprint)
    }
}

/// Plans the generator run for `decl` without executing anything.
///
/// The generated file is placed at `out_dir/<output name>`.
pub fn plan_unit(
    decl: &UnitDecl,
    deps: &[Arc<Descriptor>],
    out_dir: &Path,
    mode: GeneratorMode,
) -> WrapgenResult<Invocation> {
    decl.validate()
        .map_err(|e| UnitError::new(&decl.name, e))?;
    let root = resolve_root(&decl.inputs, decl.root.as_deref())
        .map_err(|e| UnitError::new(&decl.name, e))?;
    tracing::debug!(unit = %decl.name, root = %root.display(), "resolved root");

    let aggregated = aggregate(decl, deps).map_err(|e| UnitError::new(&decl.name, e))?;
    let output = decl.output_path(out_dir);

    let args = build_arguments(&ArgumentInputs {
        mode,
        module: decl.module.as_deref(),
        namespace_prefix: decl.namespace_prefix.as_deref(),
        options: &aggregated.options,
        includes: &aggregated.includes,
        output: &output,
        root,
    });

    Ok(Invocation {
        unit: decl.name.clone(),
        root: root.to_path_buf(),
        args,
        output,
        aggregated,
    })
}

/// Constructs a unit: plans it, runs the generator once, and publishes the
/// descriptor.
///
/// Any failure leaves nothing published.
pub fn construct_unit(
    decl: &UnitDecl,
    deps: &[Arc<Descriptor>],
    out_dir: &Path,
    runner: &Runner,
) -> WrapgenResult<Arc<Descriptor>> {
    let invocation = plan_unit(decl, deps, out_dir, runner.config().mode)?;
    runner
        .run(&invocation)
        .map_err(|e| UnitError::new(&decl.name, e))?;
    Ok(Arc::new(invocation.into_descriptor()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AggregationError, ConfigurationError, UnitErrorKind};
    use pretty_assertions::assert_eq;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    fn publish(decl: &UnitDecl, deps: &[Arc<Descriptor>]) -> Arc<Descriptor> {
        let invocation = plan_unit(decl, deps, Path::new("out"), GeneratorMode::Python).unwrap();
        Arc::new(invocation.into_descriptor())
    }

    #[test]
    fn test_plan_builds_full_command_line() {
        let base = publish(
            &UnitDecl::builder("base")
                .input("base.i")
                .include("base/include")
                .option("-DBASE")
                .build(),
            &[],
        );

        let decl = UnitDecl::builder("geometry")
            .input("geometry.i")
            .input("shapes.i")
            .root("geometry.i")
            .module("geometry")
            .include("geometry/include")
            .build();

        let invocation = plan_unit(&decl, &[base], Path::new("out"), GeneratorMode::Python).unwrap();

        let output = Path::new("out").join("geometry_wrap.cc");
        assert_eq!(invocation.root(), Path::new("geometry.i"));
        assert_eq!(invocation.output(), output.as_path());
        assert_eq!(
            strings(invocation.args()),
            vec![
                "-c++".to_string(),
                "-python".to_string(),
                "-module".to_string(),
                "geometry".to_string(),
                "-DBASE".to_string(),
                "-Igeometry/include".to_string(),
                "-Ibase/include".to_string(),
                "-o".to_string(),
                output.to_string_lossy().into_owned(),
                "geometry.i".to_string(),
            ]
        );
        assert_eq!(
            invocation.declared_inputs().as_slice(),
            ["geometry.i", "shapes.i", "base.i"]
                .iter()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(invocation.declared_inputs(), &invocation.aggregated().sources);
    }

    #[test]
    fn test_plan_reports_configuration_errors_with_unit_name() {
        let decl = UnitDecl::builder("geometry")
            .input("a.i")
            .input("b.i")
            .build();

        let err = plan_unit(&decl, &[], Path::new("out"), GeneratorMode::Python).unwrap_err();
        assert_eq!(err.unit, "geometry");
        assert_eq!(err.as_configuration(), Some(&ConfigurationError::MissingRoot));

        let decl = UnitDecl::builder("empty").build();
        let err = plan_unit(&decl, &[], Path::new("out"), GeneratorMode::Python).unwrap_err();
        assert_eq!(err.as_configuration(), Some(&ConfigurationError::NoInputs));
    }

    #[test]
    fn test_plan_rejects_malformed_dependency() {
        let bad = Arc::new(Descriptor::new(
            "bad".to_string(),
            PathBuf::new(),
            SourceSet::new(),
            Default::default(),
            Default::default(),
            String::new(),
        ));
        let decl = UnitDecl::builder("top").input("top.i").build();

        let err = plan_unit(&decl, &[bad], Path::new("out"), GeneratorMode::Python).unwrap_err();
        assert!(matches!(
            err.kind,
            UnitErrorKind::Aggregation(AggregationError::MalformedDescriptor { index: 0 })
        ));
    }

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        let decl = UnitDecl::builder("geometry").input("geometry.i").build();
        let a = plan_unit(&decl, &[], Path::new("out"), GeneratorMode::Python).unwrap();
        let b = plan_unit(&decl, &[], Path::new("out"), GeneratorMode::Python).unwrap();
        let c = plan_unit(&decl, &[], Path::new("out"), GeneratorMode::Java).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_descriptor_carries_aggregated_sets() {
        let base = publish(
            &UnitDecl::builder("base").input("base.i").include("inc").build(),
            &[],
        );
        let top = publish(
            &UnitDecl::builder("top").input("top.i").option("-builtin").build(),
            &[base],
        );

        assert_eq!(top.unit(), "top");
        assert_eq!(top.generated_file(), Path::new("out").join("top_wrap.cc"));
        assert_eq!(top.transitive_includes().as_slice(), ["inc"]);
        assert_eq!(top.transitive_options().as_slice(), ["-builtin"]);
        assert_eq!(top.transitive_sources().len(), 2);
    }
}
