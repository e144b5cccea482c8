//! Transitive metadata aggregation.
//!
//! Each [`Descriptor`] already carries the fully resolved closure of its own
//! dependencies, so aggregating a unit only looks at its direct dependencies:
//! local values first, in declared order, then each dependency's sets in
//! dependency order, skipping values already present.
//!
//! The dependency graph must be acyclic. That is enforced by whoever assembles
//! the graph; nothing here detects cycles.

use std::sync::Arc;

use crate::descriptor::Descriptor;
use crate::error::AggregationError;
use crate::metadata::{MetadataSet, SourceSet};
use crate::unit::UnitDecl;

/// Aggregated metadata for one unit, one set per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregated {
    pub sources: SourceSet,
    pub includes: MetadataSet,
    pub options: MetadataSet,
}

impl Aggregated {
    /// The unit's own contribution, before any dependency is merged.
    pub fn local(decl: &UnitDecl) -> Self {
        Self {
            sources: decl.inputs.iter().cloned().collect(),
            includes: decl.includes.iter().cloned().collect(),
            options: decl.options.iter().cloned().collect(),
        }
    }

    /// Merges one dependency's closure into this one.
    pub fn merge(&mut self, dep: &Descriptor) {
        self.sources.merge(dep.transitive_sources());
        self.includes.merge(dep.transitive_includes());
        self.options.merge(dep.transitive_options());
    }
}

/// Computes the transitive metadata of `decl` given its direct dependencies.
pub fn aggregate(
    decl: &UnitDecl,
    deps: &[Arc<Descriptor>],
) -> Result<Aggregated, AggregationError> {
    let mut aggregated = Aggregated::local(decl);

    for (index, dep) in deps.iter().enumerate() {
        dep.check(index)?;
        aggregated.merge(dep);
    }

    tracing::debug!(
        unit = %decl.name,
        sources = aggregated.sources.len(),
        includes = aggregated.includes.len(),
        options = aggregated.options.len(),
        "aggregated metadata from {} dependencies",
        deps.len()
    );

    Ok(aggregated)
}
