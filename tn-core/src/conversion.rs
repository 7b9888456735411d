//! Lossless conversion between the sparse diff encoding and the dense snapshot encoding.
//!
//! Both directions replay the stream onto a [`Graph`] in time order and derive the other
//! representation from consecutive states. The adjacency state at every time of the source
//! stream is preserved; the set of time points may differ (empty diffs are dropped, and a diff
//! coinciding with `t0` is folded into the initial snapshot).
use itertools::{
    EitherOrBoth,
    Itertools,
};
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    instrument,
};

use crate::errors::Result;
use crate::graph::{
    Edge,
    Graph,
};
use crate::grid::{
    GridSpec,
    TimeGrid,
};
use crate::network::{
    EdgeChanges,
    EdgeLists,
    TemporalNetwork,
};

/// Options for [`sample_edge_changes`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// Sampling resolution.
    #[serde(flatten)]
    pub grid: GridSpec,
    /// Emit per-sample diagnostics.
    #[serde(default)]
    pub verbose: bool,
}

/// Convert a diff stream into a snapshot stream sampled at `t0` and at every event time.
#[instrument(skip(changes), fields(n = changes.n, events = changes.t.len()))]
pub fn edge_changes_to_edge_lists(changes: &EdgeChanges, verbose: bool) -> Result<EdgeLists> {
    changes.validate()?;

    let mut graph = changes.initial_graph();
    let mut t = vec![changes.t0];
    let mut edges = vec![graph.edges()];

    for (step, &time) in changes.t.iter().enumerate() {
        changes.apply_step(&mut graph, step);
        if verbose {
            debug!(time, edge_count = graph.num_edges(), "replayed diff");
        }
        // an event at t0 only refines the initial snapshot
        if t.last() == Some(&time) {
            if let Some(last) = edges.last_mut() {
                *last = graph.edges();
            }
            continue;
        }
        t.push(time);
        edges.push(graph.edges());
    }

    Ok(EdgeLists { n: changes.n, t, tmax: changes.tmax, edges })
}

/// Convert a snapshot stream into a diff stream with one event per snapshot that differs from
/// its predecessor.
#[instrument(skip(lists), fields(n = lists.n, snapshots = lists.t.len()))]
pub fn edge_lists_to_edge_changes(lists: &EdgeLists, verbose: bool) -> Result<EdgeChanges> {
    lists.validate()?;

    let mut graph = lists.initial_graph();
    lists.apply_step(&mut graph, 0);
    let edges_initial = graph.edges();

    let mut previous = edges_initial.clone();
    let mut changes = EdgeChanges {
        n: lists.n,
        t0: lists.t[0],
        tmax: lists.tmax,
        edges_initial,
        ..Default::default()
    };

    for step in 1..lists.t.len() {
        lists.apply_step(&mut graph, step);
        let current = graph.edges();
        let (edges_in, edges_out) = diff_sorted_edges(&previous, &current);
        if verbose {
            debug!(time = lists.t[step], added = edges_in.len(), removed = edges_out.len(), "diffed snapshot");
        }
        if !edges_in.is_empty() || !edges_out.is_empty() {
            changes.t.push(lists.t[step]);
            changes.edges_in.push(edges_in);
            changes.edges_out.push(edges_out);
        }
        previous = current;
    }

    Ok(changes)
}

/// Resample a diff stream on a regular grid `t0 + k·dt`, `k = 0..n`. Snapshot `k` is the graph
/// in effect at its sample time.
#[instrument(skip(changes), fields(n = changes.n, events = changes.t.len()))]
pub fn sample_edge_changes(changes: &EdgeChanges, options: SamplingOptions) -> Result<EdgeLists> {
    changes.validate()?;
    let grid = TimeGrid::resolve(changes.t0, changes.tmax, options.grid)?;

    let mut graph = changes.initial_graph();
    let mut next_step = 0;
    let mut sampled = EdgeLists { n: changes.n, tmax: changes.tmax, ..Default::default() };

    for k in 0..grid.n_bins {
        let sample_time = grid.bin_start(k);
        while next_step < changes.t.len() && changes.t[next_step] <= sample_time {
            changes.apply_step(&mut graph, next_step);
            next_step += 1;
        }
        if options.verbose {
            debug!(sample_time, edge_count = graph.num_edges(), "sampled");
        }
        sampled.t.push(sample_time);
        sampled.edges.push(graph.edges());
    }

    Ok(sampled)
}

/// Split two sorted, normalized edge lists into `(added, removed)`.
fn diff_sorted_edges(before: &[Edge], after: &[Edge]) -> (Vec<Edge>, Vec<Edge>) {
    let mut added = Vec::new();
    let mut removed = Vec::new();
    for entry in before.iter().merge_join_by(after, |a, b| a.cmp(b)) {
        match entry {
            EitherOrBoth::Left(&edge) => removed.push(edge),
            EitherOrBoth::Right(&edge) => added.push(edge),
            EitherOrBoth::Both(..) => {},
        }
    }
    (added, removed)
}

/// Canonical (normalized, deduplicated, sorted) form of an edge list on `n` nodes.
#[must_use]
pub fn canonical_edges(n: usize, edges: &[Edge]) -> Vec<Edge> {
    let mut graph = Graph::new(n);
    graph.replace_edges(edges);
    graph.edges()
}

/// Compare two edge lists as undirected edge sets.
#[must_use]
pub fn same_edge_set(n: usize, a: &[Edge], b: &[Edge]) -> bool {
    canonical_edges(n, a) == canonical_edges(n, b)
}

#[cfg(test)]
mod tests;
