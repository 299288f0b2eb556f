use std::{
    collections::{btree_map, BTreeMap, BTreeSet},
    fmt::Debug,
};

use crate::types::Kind;

/// Graph of items and the items they directly depend on
///
/// Built fresh for every query, either from declared [Kind] metadata
/// ([dependency_graph], [optional_dependency_graph]) or by hand for any ordered item type.
#[derive(Clone, PartialEq, Eq)]
pub struct DependencyGraph<N = Kind> {
    map: BTreeMap<N, BTreeSet<N>>,
}

impl<N: Ord> Default for DependencyGraph<N> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<N: Ord + Clone> DependencyGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, merging its dependencies with any already known
    pub fn add(&mut self, node: N, dependencies: impl IntoIterator<Item = N>) {
        self.map.entry(node).or_default().extend(dependencies);
    }

    pub fn get(&self, node: &N) -> Option<&BTreeSet<N>> {
        self.map.get(node)
    }

    pub fn contains(&self, node: &N) -> bool {
        self.map.contains_key(node)
    }

    /// All nodes of the graph
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.map.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, N, BTreeSet<N>> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<N, BTreeSet<N>> {
        self.map
    }
}

impl<N: Ord + Clone, D: IntoIterator<Item = N>> FromIterator<(N, D)> for DependencyGraph<N> {
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (node, dependencies) in iter {
            graph.add(node, dependencies);
        }
        graph
    }
}

impl<N> From<BTreeMap<N, BTreeSet<N>>> for DependencyGraph<N> {
    fn from(map: BTreeMap<N, BTreeSet<N>>) -> Self {
        Self { map }
    }
}

impl<N: Debug> Debug for DependencyGraph<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.map.iter()).finish()
    }
}

/// Graph of `root` and everything it transitively requires, following mandatory dependencies only
///
/// Every kind in `additional` is walked as an independent root,
/// it does not become a dependency of `root`.
pub fn dependency_graph(root: Kind, additional: &[Kind]) -> DependencyGraph {
    walk(root, additional, |kind| kind.dependencies())
}

/// Like [dependency_graph], but every node's edges are its mandatory and optional dependencies
pub fn optional_dependency_graph(root: Kind, additional: &[Kind]) -> DependencyGraph {
    walk(root, additional, |kind| {
        let mut edges = kind.dependencies();
        edges.extend(kind.optional_dependencies());
        edges
    })
}

/// Mandatory and optional graphs in which every slot also points at the kind filling it by default
pub(crate) fn defaulted_dependency_graphs(
    root: Kind,
    additional: &[Kind],
) -> (DependencyGraph, DependencyGraph) {
    let required = walk(root, additional, |kind| slot_edges(kind, false));
    let optional = walk(root, additional, |kind| slot_edges(kind, true));
    (required, optional)
}

fn slot_edges(kind: &Kind, with_optional: bool) -> Vec<Kind> {
    kind.declared()
        .into_iter()
        .filter(|dependency| with_optional || !dependency.optional)
        .flat_map(|dependency| [dependency.kind, dependency.default])
        .collect()
}

fn walk(root: Kind, additional: &[Kind], edges: impl Fn(&Kind) -> Vec<Kind>) -> DependencyGraph {
    let mut graph = DependencyGraph::new();

    walk_recurse(&mut graph, &edges, root);
    for kind in additional {
        walk_recurse(&mut graph, &edges, *kind);
    }

    return graph;

    fn walk_recurse(graph: &mut DependencyGraph, edges: &impl Fn(&Kind) -> Vec<Kind>, kind: Kind) {
        // Already visited - edges are static, so nothing new can be learned
        if graph.contains(&kind) {
            return;
        }

        let dependencies: BTreeSet<Kind> = edges(&kind).into_iter().collect();
        tracing::trace!("{kind} depends on {dependencies:?}");

        graph.map.insert(kind, dependencies.clone());
        for dependency in dependencies {
            walk_recurse(graph, edges, dependency);
        }
    }
}
