//! Graph utilities shared by the builders
//!
//! - [`StableGraph`]: id-keyed adjacency that preserves insertion order, so
//!   DFS-based results are reproducible across runs on the same input.
//! - [`find_cycles`]: back-edge cycle detection with an explicit work stack.
//! - [`kosaraju_scc`]: two-pass Kosaraju over a petgraph `DiGraph`, both
//!   passes iterative.
//!
//! None of these recurse on the language stack, so graphs with tens of
//! thousands of nodes are safe.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;

/// Directed graph over string ids with insertion-ordered adjacency
#[derive(Debug, Clone, Default)]
pub struct StableGraph {
    ids: Vec<String>,
    index: FxHashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
}

impl StableGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from node ids; duplicates keep their first position
    pub fn from_nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = Self::new();
        for id in ids {
            graph.add_node(id);
        }
        graph
    }

    pub fn add_node(&mut self, id: impl Into<String>) -> usize {
        let id = id.into();
        if let Some(&idx) = self.index.get(&id) {
            return idx;
        }
        let idx = self.ids.len();
        self.index.insert(id.clone(), idx);
        self.ids.push(id);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add `from → to`. Unknown endpoints, self loops and repeated edges are
    /// ignored; returns whether the edge was added.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let (Some(&f), Some(&t)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };
        if f == t || self.adjacency[f].contains(&t) {
            return false;
        }
        self.adjacency[f].push(t);
        true
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }

    /// Cycles found along the DFS tree, as id lists (see [`find_cycles`])
    pub fn cycles(&self) -> Vec<Vec<String>> {
        find_cycles(&self.adjacency)
            .into_iter()
            .map(|cycle| cycle.into_iter().map(|i| self.ids[i].clone()).collect())
            .collect()
    }
}

/// DFS cycle detection with a recursion stack.
///
/// Roots are visited in index order and successors in adjacency order. When
/// a back edge reaches a node that is still on the stack, the stack slice
/// from that node to the current node is reported. Only cycles discovered
/// along the DFS tree are found; this is not an elementary-cycle
/// enumeration.
pub fn find_cycles(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adjacency.len();
    let mut visited = vec![false; n];
    // Position of a node in `path` while it is on the recursion stack
    let mut on_stack: Vec<Option<usize>> = vec![None; n];
    let mut path: Vec<usize> = Vec::new();
    // (node, next successor to look at)
    let mut work: Vec<(usize, usize)> = Vec::new();
    let mut cycles = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_stack[root] = Some(path.len());
        path.push(root);
        work.push((root, 0));

        while let Some(frame) = work.last_mut() {
            let (node, next) = *frame;
            if let Some(&succ) = adjacency[node].get(next) {
                frame.1 += 1;
                if !visited[succ] {
                    visited[succ] = true;
                    on_stack[succ] = Some(path.len());
                    path.push(succ);
                    work.push((succ, 0));
                } else if let Some(start) = on_stack[succ] {
                    cycles.push(path[start..].to_vec());
                }
            } else {
                work.pop();
                path.pop();
                on_stack[node] = None;
            }
        }
    }

    cycles
}

/// Strongly connected components via Kosaraju's algorithm.
///
/// Pass 1 records finish order with an iterative DFS over outgoing edges;
/// pass 2 walks incoming edges (the transposed graph) in reverse finish
/// order. Components are returned in discovery order of pass 2.
pub fn kosaraju_scc<N, E>(graph: &DiGraph<N, E>) -> Vec<Vec<NodeIndex>> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut finish_order: Vec<NodeIndex> = Vec::with_capacity(n);

    for start in graph.node_indices() {
        if visited[start.index()] {
            continue;
        }
        visited[start.index()] = true;
        let mut stack = vec![(start, graph.neighbors_directed(start, Direction::Outgoing))];

        while let Some((node, neighbors)) = stack.last_mut() {
            let node = *node;
            match neighbors.next() {
                Some(next) if !visited[next.index()] => {
                    visited[next.index()] = true;
                    stack.push((next, graph.neighbors_directed(next, Direction::Outgoing)));
                }
                Some(_) => {}
                None => {
                    stack.pop();
                    finish_order.push(node);
                }
            }
        }
    }

    let mut assigned = vec![false; n];
    let mut components = Vec::new();

    while let Some(root) = finish_order.pop() {
        if assigned[root.index()] {
            continue;
        }
        assigned[root.index()] = true;
        let mut component = vec![root];
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            for prev in graph.neighbors_directed(node, Direction::Incoming) {
                if !assigned[prev.index()] {
                    assigned[prev.index()] = true;
                    component.push(prev);
                    stack.push(prev);
                }
            }
        }
        components.push(component);
    }

    components
}
