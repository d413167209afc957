mod common;

use canon_graph::build;
use common::{formula, registry_of};
use proptest::prelude::*;

fn id(idx: usize) -> String {
    format!("f{idx:02}")
}

proptest! {
    #[test]
    fn random_dags_have_consistent_inverses(
        parents in prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..3), 1..16)
    ) {
        let formulas: Vec<_> = parents
            .iter()
            .enumerate()
            .map(|(idx, picks)| {
                let chosen: Vec<String> = if idx == 0 {
                    Vec::new()
                } else {
                    let mut ids: Vec<String> = picks.iter().map(|pick| id(pick.index(idx))).collect();
                    ids.sort();
                    ids.dedup();
                    ids
                };
                let refs: Vec<&str> = chosen.iter().map(String::as_str).collect();
                formula(&id(idx), &refs)
            })
            .collect();
        let count = formulas.len();
        let replay = formulas.clone();
        let graph = build(&registry_of(formulas, vec![])).unwrap();

        for idx in 0..count {
            let me = id(idx);
            for parent in graph.parents_of(&me) {
                prop_assert!(graph.children_of(parent).contains(&me.as_str()));
            }
            for child in graph.children_of(&me) {
                prop_assert!(graph.parents_of(child).contains(&me.as_str()));
            }
        }

        let order = graph.topological_order();
        prop_assert_eq!(order.len(), count);
        let position = |target: &str| order.iter().position(|entry| entry == target).unwrap();
        for idx in 0..count {
            let me = id(idx);
            for parent in graph.parents_of(&me) {
                prop_assert!(position(parent) < position(&me));
            }
        }
        prop_assert_eq!(graph.edges(), build(&registry_of(replay, vec![])).unwrap().edges());
    }
}
