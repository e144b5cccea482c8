//! wrapgen core
//!
//! This crate turns interface-definition units into generated wrapper sources
//! by running an external SWIG-style generator, while propagating each unit's
//! sources, include paths and generator options through a dependency graph.
//!
//! # Overview
//!
//! Constructing a unit is a single synchronous pass:
//!
//! 1. **Root resolution** ([`root`]): pick the file handed to the generator
//! 2. **Aggregation** ([`aggregate`]): merge local metadata with the closures
//!    published by direct dependencies
//! 3. **Argument construction** ([`args`]): build the exact command line
//! 4. **Invocation** ([`runner`]): run the generator once, check its output
//! 5. **Publication** ([`descriptor`]): share an immutable [`Descriptor`]
//!
//! Dependencies are passed as `Arc<Descriptor>`, so a unit depended on by many
//! others is computed once and shared read-only.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//! use wrapgen_core::{plan_unit, GeneratorMode, UnitDecl};
//!
//! let base = UnitDecl::builder("base")
//!     .input("base.i")
//!     .include("base/include")
//!     .build();
//! let base = Arc::new(
//!     plan_unit(&base, &[], Path::new("out"), GeneratorMode::Python)
//!         .unwrap()
//!         .into_descriptor(),
//! );
//!
//! let geometry = UnitDecl::builder("geometry")
//!     .input("geometry.i")
//!     .module("geometry")
//!     .build();
//! let plan = plan_unit(&geometry, &[base], Path::new("out"), GeneratorMode::Python).unwrap();
//!
//! assert!(plan.args().iter().any(|a| a == "-Ibase/include"));
//! assert_eq!(plan.args().last().unwrap(), "geometry.i");
//! ```
//!
//! # Modules
//!
//! - [`metadata`]: ordered, deduplicated metadata sets
//! - [`unit`]: unit declarations and validation
//! - [`root`]: root resolution
//! - [`aggregate`]: transitive aggregation
//! - [`args`]: generator modes and argument construction
//! - [`runner`]: generator discovery and subprocess execution
//! - [`plan`]: invocation planning and unit construction
//! - [`descriptor`]: published unit results
//! - [`error`]: error types

pub mod aggregate;
pub mod args;
pub mod descriptor;
pub mod error;
pub mod metadata;
pub mod plan;
pub mod root;
pub mod runner;
pub mod unit;

// Re-export main types at crate root
pub use aggregate::{aggregate, Aggregated};
pub use args::{build_arguments, ArgumentInputs, GeneratorMode};
pub use descriptor::Descriptor;
pub use error::{
    AggregationError, ConfigurationError, GenerationError, UnitError, UnitErrorKind,
    WrapgenResult,
};
pub use metadata::{MetadataSet, SourceSet};
pub use plan::{construct_unit, plan_unit, Invocation};
pub use root::resolve_root;
pub use runner::{GeneratorConfig, Runner, DEFAULT_TIMEOUT_SECS, GENERATOR_ENV};
pub use unit::{is_valid_unit_name, UnitDecl, UnitDeclBuilder};
