//! In-process build graph.
//!
//! The graph owns registration concerns that the core leaves to its caller:
//! resolving dependency names, rejecting duplicates and cycles, and ordering
//! construction so every unit sees its dependencies' published descriptors.
//!
//! # Scheduling
//!
//! Units are grouped into waves by depth. Units in the same wave never depend
//! on each other and are constructed in parallel on a rayon pool. Each unit's
//! descriptor is published once and shared by `Arc` with every dependent.

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use wrapgen_core::{
    construct_unit, plan_unit, resolve_root, AggregationError, ConfigurationError, Descriptor,
    GeneratorMode, Invocation, Runner, UnitDecl, UnitError,
};

use crate::manifest::BuildManifest;

/// Errors raised while registering or ordering units.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two units share a name.
    #[error("unit '{0}' is declared more than once")]
    DuplicateUnit(String),

    /// A unit-level error, such as an unresolvable dependency name.
    #[error(transparent)]
    Unit(#[from] UnitError),

    /// The dependency graph is not acyclic.
    #[error("dependency cycle detected: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    /// The worker pool could not be created.
    #[error("failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Options controlling a build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Keep building units that do not depend on a failed unit.
    pub keep_going: bool,
    /// Worker threads; `None` uses rayon's default.
    pub jobs: Option<usize>,
}

/// Result of building a graph.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// Published descriptors, in construction order.
    pub descriptors: Vec<Arc<Descriptor>>,
    /// Units whose construction failed.
    pub failures: Vec<UnitError>,
    /// Units that were never attempted.
    pub skipped: Vec<String>,
}

impl BuildOutcome {
    /// Returns true if every unit was built.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    /// Looks up a published descriptor by unit name.
    pub fn descriptor(&self, unit: &str) -> Option<&Arc<Descriptor>> {
        self.descriptors.iter().find(|d| d.unit() == unit)
    }
}

#[derive(Debug, Clone)]
struct Node {
    decl: UnitDecl,
    deps: Vec<String>,
}

/// A set of registered units and their dependency edges.
#[derive(Debug, Default)]
pub struct BuildGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl BuildGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every unit of a manifest.
    pub fn from_manifest(manifest: &BuildManifest) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for unit in &manifest.units {
            graph.add(unit.decl.clone(), unit.deps.clone())?;
        }
        Ok(graph)
    }

    /// Registers a unit. Dependencies may refer to units registered later.
    pub fn add(&mut self, decl: UnitDecl, deps: Vec<String>) -> Result<(), GraphError> {
        if self.index.contains_key(&decl.name) {
            return Err(GraphError::DuplicateUnit(decl.name));
        }
        self.index.insert(decl.name.clone(), self.nodes.len());
        self.nodes.push(Node { decl, deps });
        Ok(())
    }

    /// Returns the number of registered units.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks that every dependency name resolves, the graph is acyclic, and
    /// no two units write the same output file.
    pub fn validate(&self) -> Result<(), GraphError> {
        self.resolve_edges()?;
        if let Some(cycle) = self.find_cycle() {
            return Err(GraphError::Cycle(cycle));
        }
        if let Some(err) = self.output_collisions().into_iter().next() {
            return Err(err.into());
        }
        Ok(())
    }

    /// Checks every unit declaration, root and output name, collecting all
    /// failures.
    pub fn check_declarations(&self) -> Vec<UnitError> {
        let mut errors: Vec<UnitError> = self
            .nodes
            .iter()
            .filter_map(|node| {
                let decl = &node.decl;
                decl.validate()
                    .and_then(|()| resolve_root(&decl.inputs, decl.root.as_deref()).map(|_| ()))
                    .err()
                    .map(|e| UnitError::new(&decl.name, e))
            })
            .collect();
        errors.extend(self.output_collisions());
        errors
    }

    /// Units whose output file name was already claimed by an earlier unit.
    fn output_collisions(&self) -> Vec<UnitError> {
        let mut owners: HashMap<String, &str> = HashMap::new();
        let mut errors = Vec::new();

        for node in &self.nodes {
            let output = node.decl.output_name();
            match owners.get(&output) {
                Some(&other_unit) => errors.push(UnitError::new(
                    &node.decl.name,
                    ConfigurationError::DuplicateOutput {
                        output,
                        other_unit: other_unit.to_string(),
                    },
                )),
                None => {
                    owners.insert(output, &node.decl.name);
                }
            }
        }

        errors
    }

    /// Groups unit indices into waves; every dependency of a unit lies in an
    /// earlier wave. Within a wave, declaration order is kept.
    fn waves(&self) -> Result<Vec<Vec<usize>>, GraphError> {
        self.validate()?;
        let edges = self.resolve_edges()?;

        fn depth(i: usize, edges: &[Vec<usize>], memo: &mut [Option<usize>]) -> usize {
            if let Some(d) = memo[i] {
                return d;
            }
            let d = edges[i]
                .iter()
                .map(|&dep| depth(dep, edges, memo) + 1)
                .max()
                .unwrap_or(0);
            memo[i] = Some(d);
            d
        }

        let mut memo = vec![None; self.nodes.len()];
        let mut waves: Vec<Vec<usize>> = Vec::new();
        for i in 0..self.nodes.len() {
            let d = depth(i, &edges, &mut memo);
            if waves.len() <= d {
                waves.resize_with(d + 1, Vec::new);
            }
            waves[d].push(i);
        }
        Ok(waves)
    }

    /// Unit names in construction order.
    pub fn build_order(&self) -> Result<Vec<&str>, GraphError> {
        Ok(self
            .waves()?
            .into_iter()
            .flatten()
            .map(|i| self.nodes[i].decl.name.as_str())
            .collect())
    }

    /// Plans every unit in construction order without running the generator.
    pub fn plan(&self, out_dir: &Path, mode: GeneratorMode) -> Result<Vec<Invocation>, GraphError> {
        let edges = self.resolve_edges()?;
        let mut published: Vec<Option<Arc<Descriptor>>> = vec![None; self.nodes.len()];
        let mut plans = Vec::with_capacity(self.nodes.len());

        for i in self.waves()?.into_iter().flatten() {
            let deps = collect_deps(&edges[i], &published);
            let invocation = plan_unit(&self.nodes[i].decl, &deps, out_dir, mode)?;
            published[i] = Some(Arc::new(invocation.clone().into_descriptor()));
            plans.push(invocation);
        }

        Ok(plans)
    }

    /// Builds every unit.
    ///
    /// Without `keep_going`, the first wave with a failure ends the build.
    /// With it, only units depending on a failure are skipped.
    pub fn build(
        &self,
        out_dir: &Path,
        runner: &Runner,
        options: BuildOptions,
    ) -> Result<BuildOutcome, GraphError> {
        let waves = self.waves()?;
        let edges = self.resolve_edges()?;

        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = options.jobs {
            pool = pool.num_threads(jobs);
        }
        let pool = pool.build()?;

        let mut published: Vec<Option<Arc<Descriptor>>> = vec![None; self.nodes.len()];
        let mut outcome = BuildOutcome::default();
        let mut stopped = false;

        for wave in waves {
            if stopped {
                outcome
                    .skipped
                    .extend(wave.iter().map(|&i| self.nodes[i].decl.name.clone()));
                continue;
            }

            let (ready, blocked): (Vec<usize>, Vec<usize>) = wave
                .into_iter()
                .partition(|&i| edges[i].iter().all(|&dep| published[dep].is_some()));

            for i in blocked {
                tracing::warn!(unit = %self.nodes[i].decl.name, "skipped: a dependency failed");
                outcome.skipped.push(self.nodes[i].decl.name.clone());
            }

            let results: Vec<(usize, Result<Arc<Descriptor>, UnitError>)> = pool.install(|| {
                ready
                    .par_iter()
                    .map(|&i| {
                        let deps = collect_deps(&edges[i], &published);
                        (i, construct_unit(&self.nodes[i].decl, &deps, out_dir, runner))
                    })
                    .collect()
            });

            for (i, result) in results {
                match result {
                    Ok(descriptor) => {
                        published[i] = Some(Arc::clone(&descriptor));
                        outcome.descriptors.push(descriptor);
                    }
                    Err(err) => {
                        tracing::error!(unit = %self.nodes[i].decl.name, "{}", err);
                        outcome.failures.push(err);
                        stopped |= !options.keep_going;
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Maps every dependency name to a node index.
    fn resolve_edges(&self) -> Result<Vec<Vec<usize>>, GraphError> {
        self.nodes
            .iter()
            .map(|node| {
                node.deps
                    .iter()
                    .map(|dep| {
                        self.index.get(dep).copied().ok_or_else(|| {
                            GraphError::from(UnitError::new(
                                &node.decl.name,
                                AggregationError::MissingDependency {
                                    dependency: dep.clone(),
                                },
                            ))
                        })
                    })
                    .collect::<Result<Vec<usize>, GraphError>>()
            })
            .collect()
    }

    /// Depth-first search for a dependency cycle; returns its path if found.
    fn find_cycle(&self) -> Option<Vec<String>> {
        fn dfs<'a>(
            node: &'a str,
            deps: &HashMap<&'a str, Vec<&'a str>>,
            state: &mut HashMap<&'a str, u8>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<&'a str>> {
            match state.get(node).copied().unwrap_or(0) {
                1 => {
                    if let Some(pos) = stack.iter().position(|&n| n == node) {
                        let mut cycle = stack[pos..].to_vec();
                        cycle.push(node);
                        return Some(cycle);
                    }
                    return Some(vec![node, node]);
                }
                2 => return None,
                _ => {}
            }

            state.insert(node, 1);
            stack.push(node);

            if let Some(children) = deps.get(node) {
                for &child in children {
                    if let Some(cycle) = dfs(child, deps, state, stack) {
                        return Some(cycle);
                    }
                }
            }

            stack.pop();
            state.insert(node, 2);
            None
        }

        let deps: HashMap<&str, Vec<&str>> = self
            .nodes
            .iter()
            .map(|n| {
                (
                    n.decl.name.as_str(),
                    n.deps.iter().map(String::as_str).collect(),
                )
            })
            .collect();

        let mut state: HashMap<&str, u8> = HashMap::new();
        let mut stack: Vec<&str> = Vec::new();
        // Declaration order keeps the reported cycle stable between runs.
        for node in &self.nodes {
            let name = node.decl.name.as_str();
            if state.get(name).copied().unwrap_or(0) == 0 {
                if let Some(cycle) = dfs(name, &deps, &mut state, &mut stack) {
                    return Some(cycle.into_iter().map(str::to_string).collect());
                }
            }
        }
        None
    }
}

fn collect_deps(edges: &[usize], published: &[Option<Arc<Descriptor>>]) -> Vec<Arc<Descriptor>> {
    edges
        .iter()
        .filter_map(|&dep| published[dep].as_ref().map(Arc::clone))
        .collect()
}
