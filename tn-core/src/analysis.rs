//! Descriptive statistics of graphs and temporal networks.
use petgraph::unionfind::UnionFind;
use tracing::instrument;

use crate::errors::Result;
use crate::graph::Graph;
use crate::network::TemporalNetwork;

/// Counts of connected components by size: entry `m` is the number of groups with `m` members
/// (entry 0 is always zero). Isolated nodes are groups of size one.
#[must_use]
pub fn group_size_histogram(graph: &Graph) -> Vec<usize> {
    let n = graph.num_nodes();
    let mut components = UnionFind::<usize>::new(n);
    for (u, v) in graph.edges() {
        components.union(u, v);
    }

    let mut sizes = vec![0_usize; n];
    for root in components.into_labeling() {
        sizes[root] += 1;
    }

    let mut histogram = vec![0_usize; n + 1];
    for size in sizes.into_iter().filter(|&size| size > 0) {
        histogram[size] += 1;
    }
    histogram
}

/// Mean degree after every step of a temporal network, starting with the initial state at
/// `t0`. Steps that share a time report only the final state at that time.
#[instrument(skip(network), fields(n = network.num_nodes(), steps = network.times().len()))]
pub fn mean_degree<T: TemporalNetwork>(network: &T) -> Result<Vec<(f64, f64)>> {
    network.validate()?;

    let mut graph = network.initial_graph();
    let mut series = vec![(network.t0(), graph.mean_degree())];
    for (step, &t) in network.times().iter().enumerate() {
        network.apply_step(&mut graph, step);
        match series.last_mut() {
            Some(last) if last.0 == t => last.1 = graph.mean_degree(),
            _ => series.push((t, graph.mean_degree())),
        }
    }
    Ok(series)
}
