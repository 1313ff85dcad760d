// tests/property/main.rs

//! Randomised checks over generated DAGs.

use std::collections::HashMap;

use flowdag::dag::{Graph, TaskId};
use flowdag::engine::Pipeline;
use flowdag_test_utils::{config_with_workers, ExecutionLog};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;

/// Node count plus forward-only edges `(i, j)` with `i < j`, so the graph is
/// acyclic by construction.
fn acyclic_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..24).prop_flat_map(|n| {
        let edges = proptest::collection::vec((0..n, 0..n), 0..(n * 2))
            .prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.min(b), a.max(b)))
                    .collect::<Vec<_>>()
            });
        (Just(n), edges)
    })
}

/// Arbitrary edges, cycles allowed.
fn any_edges() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..16).prop_flat_map(|n| {
        (Just(n), proptest::collection::vec((0..n, 0..n), 0..(n * 3)))
    })
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn cycle_detection_agrees_with_petgraph((n, edges) in any_edges()) {
        let mut ours: Graph<usize> = Graph::new();
        let mut oracle: DiGraph<(), ()> = DiGraph::new();
        let nodes: Vec<_> = (0..n).map(|_| oracle.add_node(())).collect();

        for i in 0..n {
            ours.add_node(i);
        }
        for &(a, b) in &edges {
            ours.add_edge(a, b);
            oracle.update_edge(nodes[a], nodes[b], ());
        }

        prop_assert_eq!(ours.is_acyclic(), !is_cyclic_directed(&oracle));
        if let Some((from, to)) = ours.find_back_edge() {
            prop_assert!(ours.successors(from).contains(&to));
        }
    }

    #[test]
    fn acyclic_pipelines_run_every_task_once_in_dependency_order(
        (n, edges) in acyclic_edges(),
        workers in 1usize..5,
    ) {
        let log = ExecutionLog::new();
        let mut pipeline: Pipeline<u64> = Pipeline::with_config(config_with_workers(workers));

        // Each task returns its index plus the sum of its inputs.
        let ids: Vec<TaskId> = (0..n)
            .map(|i| {
                let name = format!("n{i}");
                pipeline.create_named_task(
                    name.clone(),
                    log.recorded(&name, move |inputs: Vec<u64>| Ok(i as u64 + inputs.iter().sum::<u64>())),
                )
            })
            .collect();
        for &(a, b) in &edges {
            pipeline.set_dependency(ids[a], ids[b]).unwrap();
        }

        let report = runtime().block_on(pipeline.run()).unwrap();
        prop_assert_eq!(report.succeeded.len(), n);

        // Reference values computed in topological (index) order.
        let mut expected: HashMap<usize, u64> = HashMap::new();
        for j in 0..n {
            let inputs: u64 = pipeline
                .dependencies(ids[j])
                .iter()
                .map(|p| expected[&p.index()])
                .sum();
            expected.insert(j, j as u64 + inputs);
        }

        for j in 0..n {
            let name = format!("n{j}");
            prop_assert_eq!(log.starts(&name), 1);
            prop_assert_eq!(*pipeline.result(ids[j]).unwrap(), expected[&j]);

            let start = log.position(&format!("{name}:start")).unwrap();
            for producer in pipeline.dependencies(ids[j]) {
                let end = log.position(&format!("n{}:end", producer.index())).unwrap();
                prop_assert!(end < start, "n{j} started before its producer finished");
            }
        }
    }
}
