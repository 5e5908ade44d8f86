use cdag_core::prelude::*;
use cdag_core::Step;
use cdag_test_utils::{arb_dag, arb_latent_dag};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::collections::{BTreeSet, HashSet};

/// Minimal valid sets found by checking every subset of non-endpoint nodes
fn exhaustive_minimal_sets(solver: &AdjustmentSetSolver<'_>) -> Vec<AdjustmentSet> {
    let dag = solver.finder().dag();
    let pool: Vec<&str> = dag
        .nodes()
        .map(|n| n.id.as_str())
        .filter(|id| *id != solver.finder().exposure() && *id != solver.finder().outcome())
        .collect();

    let mut valid: Vec<BTreeSet<&str>> = Vec::new();
    for mask in 0u32..(1 << pool.len()) {
        let set: BTreeSet<&str> = pool
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, id)| *id)
            .collect();
        if solver.check_adjustment(set.iter()).unwrap().valid {
            valid.push(set);
        }
    }

    let mut minimal: Vec<AdjustmentSet> = valid
        .iter()
        .filter(|set| !valid.iter().any(|other| other.len() < set.len() && other.is_subset(set)))
        .map(|set| set.iter().copied().collect())
        .collect();
    minimal.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    minimal
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_paths_are_simple_and_anchored(dag in arb_dag(7)) {
        let finder = PathFinder::for_designated(&dag).unwrap();
        for path in finder.paths() {
            prop_assert_eq!(path.nodes().first().map(String::as_str), Some(finder.exposure()));
            prop_assert_eq!(path.nodes().last().map(String::as_str), Some(finder.outcome()));
            prop_assert_eq!(path.edge_count() + 1, path.node_count());
            prop_assert_eq!(path.nodes().len(), path.node_count());

            let distinct: HashSet<&String> = path.nodes().iter().collect();
            prop_assert_eq!(distinct.len(), path.nodes().len());

            for (pair, step) in path.nodes().windows(2).zip(path.steps()) {
                let (cause, effect) = match step {
                    Step::Forward => (&pair[0], &pair[1]),
                    Step::Backward => (&pair[1], &pair[0]),
                };
                prop_assert!(dag.has_edge(cause, effect).unwrap());
            }
        }
    }

    #[test]
    fn prop_enumeration_is_restartable(dag in arb_dag(7)) {
        let finder = PathFinder::for_designated(&dag).unwrap();
        let first: Vec<Path> = finder.paths().collect();
        let second: Vec<Path> = finder.paths().collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_d_separation_matches_open_paths(dag in arb_dag(7), picks in proptest::collection::vec(any::<bool>(), 7)) {
        let finder = PathFinder::for_designated(&dag).unwrap();
        let z: Vec<String> = dag
            .nodes()
            .map(|n| n.id.clone())
            .filter(|id| id != finder.exposure() && id != finder.outcome())
            .zip(picks)
            .filter_map(|(id, keep)| keep.then_some(id))
            .collect();

        let separated = dag.d_separated(finder.exposure(), finder.outcome(), &z).unwrap();
        prop_assert_eq!(separated, finder.open_paths(&z).unwrap().is_empty());
    }

    #[test]
    fn prop_adjustment_sets_are_valid_and_minimal(dag in arb_dag(8)) {
        let solver = AdjustmentSetSolver::for_designated(&dag).unwrap();
        let sets = solver.find_adjustment_sets().unwrap();
        prop_assert!(!sets.is_empty());

        for set in &sets {
            let check = solver.check_adjustment(set.iter()).unwrap();
            prop_assert!(check.valid, "{} should be valid", set);

            for dropped in set.iter() {
                let smaller: Vec<&str> = set.iter().filter(|id| *id != dropped).collect();
                prop_assert!(
                    !solver.check_adjustment(smaller).unwrap().valid,
                    "{} is not minimal without {}", set, dropped
                );
            }
        }

        for (i, a) in sets.iter().enumerate() {
            for b in &sets[i + 1..] {
                prop_assert!(!a.as_set().is_subset(b.as_set()));
            }
        }
    }

    #[test]
    fn prop_adjustment_sets_match_exhaustive_search(dag in arb_latent_dag(7)) {
        let solver = AdjustmentSetSolver::for_designated(&dag).unwrap();
        let expected = exhaustive_minimal_sets(&solver);

        match solver.find_adjustment_sets() {
            Ok(sets) => prop_assert_eq!(sets, expected),
            Err(AnalysisError::NoValidAdjustmentSet { .. }) => prop_assert!(expected.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[test]
fn test_random_dags_include_confounded_pairs() {
    let mut runner = TestRunner::deterministic();
    let strategy = arb_dag(8);
    let confounded = (0..100)
        .filter(|_| {
            let dag = strategy.new_tree(&mut runner).unwrap().current();
            let sets = AdjustmentSetSolver::for_designated(&dag)
                .unwrap()
                .find_adjustment_sets()
                .unwrap();
            !sets[0].is_empty()
        })
        .count();
    assert!(confounded > 0, "no sampled graph needed adjustment");
}

#[test]
fn test_rejects_simple_cycle() {
    let mut builder = DagBuilder::new();
    builder.edge("a", "b").unwrap();
    builder.edge("b", "c").unwrap();
    builder.edge("c", "a").unwrap();

    match builder.build() {
        Err(GraphError::Cycle { path }) => assert_eq!(path, vec!["a", "b", "c", "a"]),
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn test_unknown_node_in_query() {
    let dag = cdag_test_utils::fork();
    assert!(matches!(
        PathFinder::new(&dag, "x", "nope"),
        Err(AnalysisError::Graph(GraphError::UnknownNode(id))) if id == "nope"
    ));
}
