// src/dag/graph.rs

use std::collections::BTreeMap;
use std::fmt;

/// Internal node structure: stores immediate producers and dependents.
///
/// Both lists keep edge-declaration order, which is what makes multi-input
/// argument ordering deterministic.
#[derive(Debug, Clone)]
struct DagNode<N> {
    /// Direct dependencies: nodes that must finish before this one can run.
    predecessors: Vec<N>,
    /// Direct dependents: nodes that consume this one's output.
    successors: Vec<N>,
}

impl<N> Default for DagNode<N> {
    fn default() -> Self {
        Self {
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }
}

/// Colour used by the depth-first cycle search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unvisited,
    InProgress,
    Done,
}

/// Directed graph keyed by small copyable node handles.
///
/// An edge `u -> v` means "`v` depends on `u`" (`u` is `v`'s producer).
/// Acyclicity is not enforced on insertion; callers check it once with
/// [`Graph::is_acyclic`] before scheduling anything.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    nodes: BTreeMap<N, DagNode<N>>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }
}

impl<N: Copy + Ord> Graph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node without edges. No-op if it already exists.
    pub fn add_node(&mut self, node: N) {
        self.nodes.entry(node).or_default();
    }

    /// Add the edge `from -> to`, creating missing endpoints.
    ///
    /// Adding an edge twice is a no-op, so the declaration position of an
    /// edge is the position of its first insertion.
    pub fn add_edge(&mut self, from: N, to: N) {
        self.add_node(from);
        self.add_node(to);

        if let Some(node) = self.nodes.get_mut(&from) {
            if node.successors.contains(&to) {
                return;
            }
            node.successors.push(to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.predecessors.push(from);
        }
    }

    /// Remove the edge `from -> to` if present.
    pub fn remove_edge(&mut self, from: N, to: N) {
        if let Some(node) = self.nodes.get_mut(&from) {
            node.successors.retain(|n| *n != to);
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.predecessors.retain(|n| *n != from);
        }
    }

    /// Remove a node and purge it from every adjacency list.
    pub fn remove_node(&mut self, node: N) {
        if self.nodes.remove(&node).is_none() {
            return;
        }
        for other in self.nodes.values_mut() {
            other.successors.retain(|n| *n != node);
            other.predecessors.retain(|n| *n != node);
        }
    }

    pub fn contains(&self, node: N) -> bool {
        self.nodes.contains_key(&node)
    }

    /// All nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.successors.len()).sum()
    }

    /// Immediate dependents of `node`, in edge-declaration order.
    pub fn successors(&self, node: N) -> &[N] {
        self.nodes
            .get(&node)
            .map(|n| n.successors.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate producers of `node`, in edge-declaration order.
    pub fn predecessors(&self, node: N) -> &[N] {
        self.nodes
            .get(&node)
            .map(|n| n.predecessors.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes without producers (pipeline entry points).
    pub fn roots(&self) -> Vec<N> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.predecessors.is_empty())
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn is_acyclic(&self) -> bool {
        self.find_back_edge().is_none()
    }

    /// Find an edge `(from, to)` that closes a cycle, if any.
    ///
    /// Iterative three-colour depth-first search with an explicit stack, so
    /// the call depth does not grow with the graph. Stops at the first edge
    /// that reaches a node still in progress. O(nodes + edges).
    pub fn find_back_edge(&self) -> Option<(N, N)> {
        let mut visit: BTreeMap<N, Visit> = self
            .nodes
            .keys()
            .map(|&n| (n, Visit::Unvisited))
            .collect();

        for &start in self.nodes.keys() {
            if visit[&start] != Visit::Unvisited {
                continue;
            }

            // Each frame is (node, index of the next successor to explore).
            let mut stack: Vec<(N, usize)> = vec![(start, 0)];
            visit.insert(start, Visit::InProgress);

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                let next = self.successors(node).get(frame.1).copied();

                match next {
                    Some(child) => {
                        frame.1 += 1;
                        match visit.get(&child).copied().unwrap_or(Visit::Done) {
                            Visit::InProgress => return Some((node, child)),
                            Visit::Unvisited => {
                                visit.insert(child, Visit::InProgress);
                                stack.push((child, 0));
                            }
                            Visit::Done => {}
                        }
                    }
                    None => {
                        visit.insert(node, Visit::Done);
                        stack.pop();
                    }
                }
            }
        }

        None
    }
}

impl<N: Copy + Ord + fmt::Display> fmt::Display for Graph<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, node) in &self.nodes {
            let targets: Vec<String> = node.successors.iter().map(|n| n.to_string()).collect();
            writeln!(f, "{id} -> {}", targets.join(", "))?;
        }
        Ok(())
    }
}
