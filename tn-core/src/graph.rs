//! Undirected simple graph over a fixed set of `N` labeled nodes.
//!
//! Adjacency is an arena of neighbor sets indexed by node id and owned by the [`Graph`]; the
//! symmetric invariant `j ∈ adj[i] ⟺ i ∈ adj[j]` is maintained by every mutator, and set
//! semantics rule out duplicate edges. Self-loops are rejected. The node count never changes
//! after construction.
use std::collections::{
    BTreeSet,
    VecDeque,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::{
    Result,
    TemporalNetworkError,
};

/// An undirected edge, stored with the smaller endpoint first once normalized.
pub type Edge = (usize, usize);

/// Order the endpoints of an undirected edge as `(min, max)`.
#[must_use]
pub const fn normalize(edge: Edge) -> Edge {
    if edge.0 <= edge.1 {
        edge
    } else {
        (edge.1, edge.0)
    }
}

/// Adjacency-set graph used by every process and analysis routine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    adjacency: Vec<BTreeSet<usize>>,
    edge_count: usize,
}

impl Graph {
    /// Empty graph on `n` nodes.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { adjacency: vec![BTreeSet::new(); n], edge_count: 0 }
    }

    /// Build a graph from an edge list, rejecting out-of-range ids and self-loops. Repeated
    /// edges (in either orientation) collapse into one.
    pub fn from_edges(n: usize, edges: &[Edge]) -> Result<Self> {
        check_edges(n, edges)?;
        let mut graph = Self::new(n);
        for &(u, v) in edges {
            graph.add_edge(u, v);
        }
        Ok(graph)
    }

    /// Number of nodes `N`.
    #[must_use]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub const fn num_edges(&self) -> usize {
        self.edge_count
    }

    /// Neighbor set of `node`.
    #[must_use]
    pub fn neighbors(&self, node: usize) -> &BTreeSet<usize> {
        &self.adjacency[node]
    }

    /// Degree of `node`.
    #[must_use]
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Whether the undirected edge `(u, v)` is present.
    #[must_use]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency.get(u).is_some_and(|neighbors| neighbors.contains(&v))
    }

    /// Insert `(u, v)`. Returns `false` if the edge already existed or is a self-loop.
    pub fn add_edge(&mut self, u: usize, v: usize) -> bool {
        if u == v || !self.adjacency[u].insert(v) {
            return false;
        }
        self.adjacency[v].insert(u);
        self.edge_count += 1;
        true
    }

    /// Remove `(u, v)`. Returns `false` if the edge was absent.
    pub fn remove_edge(&mut self, u: usize, v: usize) -> bool {
        if !self.adjacency[u].remove(&v) {
            return false;
        }
        self.adjacency[v].remove(&u);
        self.edge_count -= 1;
        true
    }

    /// Remove every edge incident to `node` and return them normalized, in neighbor order.
    pub fn isolate(&mut self, node: usize) -> Vec<Edge> {
        let neighbors = std::mem::take(&mut self.adjacency[node]);
        self.edge_count -= neighbors.len();
        neighbors
            .into_iter()
            .map(|neighbor| {
                self.adjacency[neighbor].remove(&node);
                normalize((node, neighbor))
            })
            .collect()
    }

    /// Apply one diff event: removals first, then insertions.
    pub fn apply_changes(&mut self, edges_in: &[Edge], edges_out: &[Edge]) {
        for &(u, v) in edges_out {
            self.remove_edge(u, v);
        }
        for &(u, v) in edges_in {
            self.add_edge(u, v);
        }
    }

    /// Replace the whole edge set, keeping the node count.
    pub fn replace_edges(&mut self, edges: &[Edge]) {
        for neighbors in &mut self.adjacency {
            neighbors.clear();
        }
        self.edge_count = 0;
        for &(u, v) in edges {
            self.add_edge(u, v);
        }
    }

    /// All edges, normalized and sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, neighbors)| neighbors.range(u + 1..).map(move |&v| (u, v)))
            .collect()
    }

    /// Mean degree `2|E| / N`; zero for an empty node set.
    #[must_use]
    pub fn mean_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        (2 * self.edge_count) as f64 / self.adjacency.len() as f64
    }

    /// Connected component containing `node` (breadth-first search), including `node` itself.
    #[must_use]
    pub fn component_of(&self, node: usize) -> BTreeSet<usize> {
        let mut component = BTreeSet::from([node]);
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            for &neighbor in &self.adjacency[current] {
                if component.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        component
    }
}

/// Reject node ids outside `0..n` and self-loops in an edge list.
pub fn check_edges(n: usize, edges: &[Edge]) -> Result<()> {
    for &(u, v) in edges {
        if u >= n || v >= n {
            return Err(TemporalNetworkError::configuration(format!(
                "edge ({u}, {v}) references a node outside 0..{n}"
            )));
        }
        if u == v {
            return Err(TemporalNetworkError::configuration(format!("self-loop on node {u}")));
        }
    }
    Ok(())
}
