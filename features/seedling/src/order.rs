use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
};

use crate::{
    dependency_graph::{
        defaulted_dependency_graphs, dependency_graph, optional_dependency_graph, DependencyGraph,
    },
    errors::CircularDependencyError,
    types::Kind,
};

/// Batches of items, each batch only depending on items of earlier batches
pub type CreationOrder<N = Kind> = Vec<BTreeSet<N>>;

/// Sorts a graph into batches
///
/// Each batch holds every item whose dependencies are all part of earlier batches.
/// Items only named as a dependency are treated as leaves.
///
/// Fails if the graph contains a cycle - a self dependency counts as one.
pub fn creation_order<N: Ord + Clone + Debug>(
    graph: &DependencyGraph<N>,
) -> Result<CreationOrder<N>, CircularDependencyError<N>> {
    let mut remaining = graph.clone().into_inner();

    let undeclared: Vec<N> = remaining
        .values()
        .flatten()
        .filter(|dependency| !remaining.contains_key(*dependency))
        .cloned()
        .collect();
    for dependency in undeclared {
        remaining.entry(dependency).or_default();
    }

    let mut order = Vec::new();
    loop {
        let batch: BTreeSet<N> = remaining
            .iter()
            .filter(|(_, dependencies)| dependencies.is_empty())
            .map(|(item, _)| item.clone())
            .collect();

        if batch.is_empty() {
            break;
        }

        remaining.retain(|item, _| !batch.contains(item));
        for dependencies in remaining.values_mut() {
            dependencies.retain(|dependency| !batch.contains(dependency));
        }

        tracing::trace!("Next creation batch {batch:?}");
        order.push(batch);
    }

    if !remaining.is_empty() {
        tracing::warn!("Dependency graph is cyclic, unresolved: {remaining:?}");
        return Err(CircularDependencyError { remaining });
    }

    Ok(order)
}

/// Creation order of `root` and `additional`, following mandatory dependencies only
pub fn mandatory_creation_order(
    root: Kind,
    additional: &[Kind],
) -> Result<CreationOrder, CircularDependencyError<Kind>> {
    creation_order(&dependency_graph(root, additional))
}

/// Creation order for `root`, with `additional` kinds requested on top of its mandatory dependencies
///
/// Only kinds which are required (see [dependency_graph]) are part of the order,
/// but optional dependencies still constrain where they are placed:
/// a kind is created after every optional dependency it could link to.
/// The result is staggered with [separate_async_optionals].
pub fn page_creation_order(
    root: Kind,
    additional: &[Kind],
) -> Result<CreationOrder, CircularDependencyError<Kind>> {
    page_order(
        &dependency_graph(root, additional),
        &optional_dependency_graph(root, additional),
    )
}

/// Like [page_creation_order], but following the default kind of every slot as well
pub(crate) fn defaulted_page_creation_order(
    root: Kind,
    additional: &[Kind],
) -> Result<CreationOrder, CircularDependencyError<Kind>> {
    let (required, optional) = defaulted_dependency_graphs(root, additional);
    page_order(&required, &optional)
}

fn page_order(
    required: &DependencyGraph,
    optional: &DependencyGraph,
) -> Result<CreationOrder, CircularDependencyError<Kind>> {
    let full_order = creation_order(optional)?;

    let order: CreationOrder = full_order
        .into_iter()
        .map(|batch| {
            batch
                .into_iter()
                .filter(|kind| required.contains(kind))
                .collect::<BTreeSet<_>>()
        })
        .filter(|batch| !batch.is_empty())
        .collect();

    Ok(separate_async_optionals(&order))
}

/// Splits batches so kinds creating a shared dependency come before siblings which would only link it
///
/// Inside a batch, a kind scores one point for each of its mandatory dependencies which is an
/// optional dependency of a sibling. Batches are split by descending score and every split
/// part is split again until it is stable, so applying this twice changes nothing.
/// Batches without any such conflict are left untouched.
pub fn separate_async_optionals(order: &CreationOrder) -> CreationOrder {
    let mut separated = Vec::with_capacity(order.len());
    for batch in order {
        separate_batch(batch.clone(), &mut separated);
    }
    separated
}

fn separate_batch(batch: BTreeSet<Kind>, separated: &mut CreationOrder) {
    if batch.len() <= 1 {
        separated.push(batch);
        return;
    }

    let mut by_score: BTreeMap<Reverse<usize>, BTreeSet<Kind>> = BTreeMap::new();
    for kind in &batch {
        by_score
            .entry(Reverse(shared_creation_score(kind, &batch)))
            .or_default()
            .insert(*kind);
    }

    if by_score.len() == 1 {
        separated.push(batch);
        return;
    }

    tracing::trace!("Staggering batch {batch:?} into {by_score:?}");
    for (_, part) in by_score {
        separate_batch(part, separated);
    }
}

fn shared_creation_score(kind: &Kind, batch: &BTreeSet<Kind>) -> usize {
    if !kind.is_creatable() {
        return 0;
    }

    let siblings_optionals: Vec<Vec<Kind>> = batch
        .iter()
        .filter(|sibling| *sibling != kind)
        .map(Kind::optional_dependencies)
        .collect();

    kind.dependencies()
        .iter()
        .map(|dependency| {
            siblings_optionals
                .iter()
                .filter(|optionals| optionals.contains(dependency))
                .count()
        })
        .sum()
}
