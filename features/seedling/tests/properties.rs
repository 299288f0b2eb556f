use std::collections::BTreeSet;

use proptest::prelude::*;
use seedling::{
    creation_order, dependency_graph, mandatory_creation_order, page_creation_order,
    separate_async_optionals, DependencyGraph, Kind,
};

mod fixtures;
use fixtures::*;

/// Random acyclic graph - nodes only depend on nodes with a smaller number
fn arb_dag() -> impl Strategy<Value = DependencyGraph<u8>> {
    prop::collection::vec(prop::collection::btree_set(any::<u8>(), 0..4), 1..24).prop_map(
        |nodes| {
            nodes
                .into_iter()
                .enumerate()
                .map(|(index, dependencies)| {
                    let node = index as u8;
                    let dependencies: BTreeSet<u8> = if node == 0 {
                        BTreeSet::new()
                    } else {
                        dependencies.into_iter().map(|d| d % node).collect()
                    };
                    (node, dependencies)
                })
                .collect()
        },
    )
}

/// Kinds without cycles, usable as roots
fn acyclic_kinds() -> Vec<Kind> {
    vec![
        kind::<A>(),
        kind::<B>(),
        kind::<C>(),
        kind::<D>(),
        kind::<E>(),
        kind::<F>(),
        kind::<G>(),
        kind::<H>(),
        kind::<One>(),
        kind::<Two>(),
        kind::<Three>(),
        kind::<Four>(),
        kind::<Five>(),
        kind::<Six>(),
        kind::<Seven>(),
        kind::<OneWithArgs>(),
        kind::<TwoWithArgs>(),
        kind::<ThreeWithArgs>(),
        kind::<FourWithArgs>(),
        kind::<AnotherMultipleWordClassName>(),
        kind::<NotHasCreateDependencyHolder>(),
        kind::<HasCreateParentDependencyHolder>(),
    ]
}

/// Kinds whose whole mandatory tree declares no optional dependency
fn kinds_without_optionals() -> Vec<Kind> {
    vec![
        kind::<A>(),
        kind::<One>(),
        kind::<Two>(),
        kind::<Three>(),
        kind::<Six>(),
        kind::<Seven>(),
        kind::<OneWithArgs>(),
        kind::<MultipleWordClassName>(),
        kind::<MixinUserA>(),
        kind::<MixinUserD>(),
        kind::<NotHasCreateDependencyHolder>(),
    ]
}

fn arb_kinds(from: Vec<Kind>) -> impl Strategy<Value = Vec<Kind>> {
    let len = from.len();
    prop::sample::subsequence(from, 1..=len).prop_shuffle()
}

proptest! {
    #[test]
    fn order_respects_every_edge(graph in arb_dag()) {
        let order = creation_order(&graph).unwrap();

        for (position, batch) in order.iter().enumerate() {
            for node in batch {
                for dependency in graph.get(node).into_iter().flatten() {
                    let earlier = order[..position].iter().any(|batch| batch.contains(dependency));
                    prop_assert!(earlier, "{} is ordered before its dependency {}", node, dependency);
                }
            }
        }
    }

    #[test]
    fn order_holds_every_node_once(graph in arb_dag()) {
        let order = creation_order(&graph).unwrap();

        let ordered: Vec<u8> = order.iter().flatten().copied().collect();
        let unique: BTreeSet<u8> = ordered.iter().copied().collect();
        prop_assert_eq!(ordered.len(), unique.len());

        let mut expected: BTreeSet<u8> = graph.nodes().copied().collect();
        expected.extend(graph.iter().flat_map(|(_, dependencies)| dependencies.iter().copied()));
        prop_assert_eq!(unique, expected);
        prop_assert!(order.iter().all(|batch| !batch.is_empty()));
    }

    #[test]
    fn cycles_are_detected(graph in arb_dag(), length in 1u8..6) {
        // Chain of fresh nodes looping back onto itself
        let mut cyclic = graph.clone();
        let first = 100u8;
        for offset in 0..length {
            let next = first + (offset + 1) % length;
            cyclic.add(first + offset, [next]);
        }

        let error = creation_order(&cyclic).unwrap_err();
        for offset in 0..length {
            prop_assert!(error.remaining.contains_key(&(first + offset)));
        }
    }

    #[test]
    fn stagger_is_idempotent(kinds in arb_kinds(acyclic_kinds())) {
        let order = page_creation_order(kinds[0], &kinds[1..]).unwrap();
        prop_assert_eq!(separate_async_optionals(&order), order);
    }

    #[test]
    fn stagger_without_optionals_changes_nothing(kinds in arb_kinds(kinds_without_optionals())) {
        let order = mandatory_creation_order(kinds[0], &kinds[1..]).unwrap();
        prop_assert_eq!(separate_async_optionals(&order), order);
    }

    #[test]
    fn page_order_is_a_valid_creation_order(kinds in arb_kinds(acyclic_kinds())) {
        let required = dependency_graph(kinds[0], &kinds[1..]);
        let order = page_creation_order(kinds[0], &kinds[1..]).unwrap();

        let ordered: BTreeSet<Kind> = order.iter().flatten().copied().collect();
        let expected: BTreeSet<Kind> = required.nodes().copied().collect();
        prop_assert_eq!(ordered, expected);

        for (position, batch) in order.iter().enumerate() {
            for kind in batch {
                for dependency in kind.dependencies() {
                    let earlier = order[..position].iter().any(|batch| batch.contains(&dependency));
                    prop_assert!(earlier, "{} is ordered before its dependency {}", kind, dependency);
                }
            }
        }
    }
}
