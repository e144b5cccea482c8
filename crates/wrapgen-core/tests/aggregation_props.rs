//! Property-based tests for transitive aggregation.
//!
//! Random acyclic graphs are built by only letting unit `i` depend on units
//! with a smaller index. Descriptors are published straight from plans, so no
//! generator is needed.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wrapgen-core --test aggregation_props
//! ```

use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;
use wrapgen_core::{plan_unit, Descriptor, GeneratorMode, UnitDecl};

#[derive(Debug, Clone)]
struct UnitShape {
    includes: Vec<String>,
    options: Vec<String>,
    deps: Vec<usize>,
}

fn unit_shape() -> impl Strategy<Value = UnitShape> {
    (
        prop::collection::vec("inc/[a-d]", 0..4),
        prop::collection::vec("-D[A-C]", 0..3),
        prop::collection::vec(any::<usize>(), 0..4),
    )
        .prop_map(|(includes, options, deps)| UnitShape {
            includes,
            options,
            deps,
        })
}

fn graph() -> impl Strategy<Value = Vec<UnitShape>> {
    prop::collection::vec(unit_shape(), 1..8)
}

fn decl(index: usize, shape: &UnitShape) -> UnitDecl {
    let mut builder = UnitDecl::builder(format!("unit{}", index)).input(format!("unit{}.i", index));
    for include in &shape.includes {
        builder = builder.include(include.clone());
    }
    for option in &shape.options {
        builder = builder.option(option.clone());
    }
    builder.build()
}

/// Direct dependency indices of unit `index`, all strictly smaller.
fn dep_indices(index: usize, shape: &UnitShape) -> Vec<usize> {
    if index == 0 {
        return Vec::new();
    }
    shape.deps.iter().map(|d| d % index).collect()
}

fn publish_all(shapes: &[UnitShape]) -> Vec<Arc<Descriptor>> {
    let mut published: Vec<Arc<Descriptor>> = Vec::new();
    for (index, shape) in shapes.iter().enumerate() {
        let deps: Vec<Arc<Descriptor>> = dep_indices(index, shape)
            .into_iter()
            .map(|d| Arc::clone(&published[d]))
            .collect();
        let plan = plan_unit(
            &decl(index, shape),
            &deps,
            Path::new("out"),
            GeneratorMode::Python,
        )
        .unwrap();
        published.push(Arc::new(plan.into_descriptor()));
    }
    published
}

fn has_duplicates<T: PartialEq>(values: &[T]) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, v)| values[..i].contains(v))
}

proptest! {
    /// No aggregated set ever holds the same value twice.
    #[test]
    fn aggregated_sets_have_no_duplicates(shapes in graph()) {
        for descriptor in publish_all(&shapes) {
            prop_assert!(!has_duplicates(descriptor.transitive_sources().as_slice()));
            prop_assert!(!has_duplicates(descriptor.transitive_includes().as_slice()));
            prop_assert!(!has_duplicates(descriptor.transitive_options().as_slice()));
        }
    }

    /// Every unit's closure contains the closure of everything it can reach.
    #[test]
    fn aggregation_is_transitive(shapes in graph()) {
        let published = publish_all(&shapes);

        for (index, shape) in shapes.iter().enumerate() {
            let mut reachable = dep_indices(index, shape);
            let mut seen = Vec::new();
            while let Some(next) = reachable.pop() {
                if seen.contains(&next) {
                    continue;
                }
                seen.push(next);
                reachable.extend(dep_indices(next, &shapes[next]));
            }

            let unit = &published[index];
            for reached in seen {
                let other = &published[reached];
                prop_assert!(unit.transitive_sources().is_superset(other.transitive_sources()));
                prop_assert!(unit.transitive_includes().is_superset(other.transitive_includes()));
                prop_assert!(unit.transitive_options().is_superset(other.transitive_options()));
            }
        }
    }

    /// Local contributions lead the aggregated sets, in declared order.
    #[test]
    fn local_values_lead(shapes in graph()) {
        let published = publish_all(&shapes);

        for (index, shape) in shapes.iter().enumerate() {
            let mut local_includes: Vec<String> = Vec::new();
            for include in &shape.includes {
                if !local_includes.contains(include) {
                    local_includes.push(include.clone());
                }
            }
            let includes = published[index].transitive_includes().as_slice();
            prop_assert_eq!(&includes[..local_includes.len()], local_includes.as_slice());
        }
    }

    /// Identical graphs aggregate to identical, identically ordered sets.
    #[test]
    fn aggregation_is_deterministic(shapes in graph()) {
        let first = publish_all(&shapes);
        let second = publish_all(&shapes);
        prop_assert_eq!(first, second);
    }
}
