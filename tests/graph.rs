// tests/graph.rs

use flowdag::dag::Graph;

#[test]
fn add_node_registers_node_without_edges() {
    let mut g: Graph<u32> = Graph::new();
    g.add_node(1);

    assert!(g.contains(1));
    assert!(g.successors(1).is_empty());
    assert!(g.predecessors(1).is_empty());
    assert_eq!(g.roots(), vec![1]);
}

#[test]
fn add_edge_links_both_directions() {
    let mut g: Graph<u32> = Graph::new();
    g.add_node(1);
    g.add_node(2);
    g.add_edge(1, 2);

    assert_eq!(g.successors(1), &[2]);
    assert_eq!(g.predecessors(2), &[1]);
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn add_edge_creates_missing_endpoints() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);

    assert!(g.contains(1));
    assert!(g.contains(2));
    assert_eq!(g.len(), 2);
    assert_eq!(g.successors(1), &[2]);
}

#[test]
fn add_edge_is_idempotent() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.add_edge(1, 2);

    assert_eq!(g.successors(1), &[2]);
    assert_eq!(g.predecessors(2), &[1]);
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn predecessors_keep_declaration_order() {
    let mut g: Graph<u32> = Graph::new();
    for n in 1..=4 {
        g.add_node(n);
    }
    // Declared out of node order on purpose.
    g.add_edge(3, 4);
    g.add_edge(1, 4);
    g.add_edge(2, 4);

    assert_eq!(g.predecessors(4), &[3, 1, 2]);
}

#[test]
fn remove_edge_unlinks_both_directions() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.remove_edge(1, 2);

    assert!(g.successors(1).is_empty());
    assert!(g.predecessors(2).is_empty());
    assert!(g.contains(1) && g.contains(2));
}

#[test]
fn remove_missing_edge_is_noop() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.remove_edge(2, 1);
    g.remove_edge(7, 8);

    assert_eq!(g.successors(1), &[2]);
}

#[test]
fn remove_node_purges_adjacency() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.add_edge(2, 3);
    g.add_edge(1, 3);
    g.remove_node(2);

    assert!(!g.contains(2));
    assert_eq!(g.successors(1), &[3]);
    assert_eq!(g.predecessors(3), &[1]);
    assert!(g.nodes().all(|n| !g.successors(n).contains(&2)));
}

#[test]
fn roots_are_nodes_without_producers() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.add_edge(3, 2);
    g.add_node(4);

    assert_eq!(g.roots(), vec![1, 3, 4]);
}

#[test]
fn unknown_node_has_no_neighbours() {
    let g: Graph<u32> = Graph::new();
    assert!(g.successors(9).is_empty());
    assert!(g.predecessors(9).is_empty());
    assert!(g.is_empty());
    assert!(g.is_acyclic());
}

#[test]
fn three_node_cycle_is_detected() {
    let mut g: Graph<char> = Graph::new();
    g.add_edge('A', 'B');
    g.add_edge('B', 'C');
    g.add_edge('C', 'A');

    assert!(!g.is_acyclic());
    let (from, to) = g.find_back_edge().expect("cycle should produce a back-edge");
    assert!(g.successors(from).contains(&to));
}

#[test]
fn self_loop_is_a_cycle() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 1);

    assert_eq!(g.find_back_edge(), Some((1, 1)));
}

#[test]
fn diamond_is_acyclic() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.add_edge(1, 3);
    g.add_edge(2, 4);
    g.add_edge(3, 4);

    assert!(g.is_acyclic());
}

#[test]
fn cycle_in_disconnected_component_is_detected() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.add_edge(10, 11);
    g.add_edge(11, 12);
    g.add_edge(12, 11);

    assert!(!g.is_acyclic());
}

#[test]
fn long_chain_does_not_exhaust_the_stack() {
    let mut g: Graph<u32> = Graph::new();
    let n = 200_000;
    for i in 0..n {
        g.add_edge(i, i + 1);
    }
    assert!(g.is_acyclic());

    g.add_edge(n, 0);
    assert!(!g.is_acyclic());
}

#[test]
fn display_lists_successors_per_node() {
    let mut g: Graph<u32> = Graph::new();
    g.add_edge(1, 2);
    g.add_edge(1, 3);
    g.add_node(4);

    assert_eq!(g.to_string(), "1 -> 2, 3\n2 -> \n3 -> \n4 -> \n");
}
