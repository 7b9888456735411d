//! The two temporal network encodings and the replay interface shared by their consumers.
//!
//! [`EdgeChanges`] is the sparse encoding: an initial edge set followed by timed add/remove
//! events. [`EdgeLists`] is the dense encoding: one complete edge set per sample time, valid
//! until the next sample (or `tmax`). Both are plain in-memory records; how they are persisted
//! is up to the caller.
use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};

use crate::errors::{
    Result,
    TemporalNetworkError,
};
use crate::graph::{
    check_edges,
    normalize,
    Edge,
    Graph,
};

/// Sparse event-diff stream ("`edge_changes`").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeChanges {
    /// Number of nodes.
    #[serde(rename = "N")]
    pub n: usize,
    /// Start of the observation window.
    pub t0: f64,
    /// End of the observation window.
    pub tmax: f64,
    /// Edges present at `t0`.
    pub edges_initial: Vec<Edge>,
    /// Event times, strictly increasing.
    pub t: Vec<f64>,
    /// Edges added at event `i`.
    pub edges_in: Vec<Vec<Edge>>,
    /// Edges removed at event `i`.
    pub edges_out: Vec<Vec<Edge>>,
}

/// Dense snapshot stream ("`edge_lists`").
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeLists {
    /// Number of nodes.
    #[serde(rename = "N")]
    pub n: usize,
    /// Sample times, strictly increasing; `t[0]` is the start of the observation window.
    pub t: Vec<f64>,
    /// End of the observation window.
    pub tmax: f64,
    /// Complete edge set valid on `[t[i], t[i+1])`.
    pub edges: Vec<Vec<Edge>>,
}

/// Read access shared by both encodings: replaying a stream step by step onto a [`Graph`].
///
/// Step `i` takes effect at `times()[i]`. Before step 0 the graph is `initial_graph()`, which
/// is valid from `t0()`.
pub trait TemporalNetwork {
    /// Number of nodes.
    fn num_nodes(&self) -> usize;

    /// Start of the observation window.
    fn t0(&self) -> f64;

    /// End of the observation window.
    fn tmax(&self) -> f64;

    /// Times at which the steps take effect.
    fn times(&self) -> &[f64];

    /// Graph valid at `t0()`, before any step.
    fn initial_graph(&self) -> Graph;

    /// Mutate `graph` by step `step`.
    fn apply_step(&self, graph: &mut Graph, step: usize);

    /// Reject malformed streams before any processing begins.
    fn validate(&self) -> Result<()>;
}

impl EdgeChanges {
    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether no event was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

impl EdgeLists {
    /// Number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether no snapshot was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

impl TemporalNetwork for EdgeChanges {
    fn num_nodes(&self) -> usize {
        self.n
    }

    fn t0(&self) -> f64 {
        self.t0
    }

    fn tmax(&self) -> f64 {
        self.tmax
    }

    fn times(&self) -> &[f64] {
        &self.t
    }

    fn initial_graph(&self) -> Graph {
        let mut graph = Graph::new(self.n);
        graph.replace_edges(&self.edges_initial);
        graph
    }

    fn apply_step(&self, graph: &mut Graph, step: usize) {
        graph.apply_changes(&self.edges_in[step], &self.edges_out[step]);
    }

    fn validate(&self) -> Result<()> {
        if self.edges_in.len() != self.t.len() || self.edges_out.len() != self.t.len() {
            return Err(TemporalNetworkError::configuration(format!(
                "edge change stream has {} times but {} insertion and {} removal lists",
                self.t.len(),
                self.edges_in.len(),
                self.edges_out.len()
            )));
        }
        check_times(self.t0, &self.t, self.tmax)?;
        check_edges(self.n, &self.edges_initial)?;
        for (index, (edges_in, edges_out)) in self.edges_in.iter().zip(&self.edges_out).enumerate() {
            check_edges(self.n, edges_in)?;
            check_edges(self.n, edges_out)?;
            let removed: BTreeSet<Edge> = edges_out.iter().map(|&e| normalize(e)).collect();
            if let Some(&(u, v)) = edges_in.iter().find(|&&e| removed.contains(&normalize(e))) {
                return Err(TemporalNetworkError::configuration(format!(
                    "event {index} at t = {} both adds and removes edge ({u}, {v})",
                    self.t[index]
                )));
            }
        }
        Ok(())
    }
}

impl TemporalNetwork for EdgeLists {
    fn num_nodes(&self) -> usize {
        self.n
    }

    fn t0(&self) -> f64 {
        self.t.first().copied().unwrap_or(self.tmax)
    }

    fn tmax(&self) -> f64 {
        self.tmax
    }

    fn times(&self) -> &[f64] {
        &self.t
    }

    fn initial_graph(&self) -> Graph {
        Graph::new(self.n)
    }

    fn apply_step(&self, graph: &mut Graph, step: usize) {
        graph.replace_edges(&self.edges[step]);
    }

    fn validate(&self) -> Result<()> {
        if self.edges.len() != self.t.len() {
            return Err(TemporalNetworkError::configuration(format!(
                "snapshot stream has {} times but {} edge lists",
                self.t.len(),
                self.edges.len()
            )));
        }
        if self.t.is_empty() {
            return Err(TemporalNetworkError::configuration("snapshot stream holds no snapshot"));
        }
        check_times(self.t[0], &self.t, self.tmax)?;
        for edges in &self.edges {
            check_edges(self.n, edges)?;
        }
        Ok(())
    }
}

/// `tmax` must not precede the last time, and times must be strictly increasing and start no
/// earlier than `t0`.
fn check_times(t0: f64, t: &[f64], tmax: f64) -> Result<()> {
    let Some(&last) = t.last() else {
        return if tmax < t0 {
            Err(TemporalNetworkError::Ordering(format!("tmax = {tmax} precedes t0 = {t0}")))
        } else {
            Ok(())
        };
    };
    if tmax < last {
        return Err(TemporalNetworkError::tmax_before_last_event(tmax, last));
    }
    if t[0] < t0 {
        return Err(TemporalNetworkError::Ordering(format!("first time {} precedes t0 = {t0}", t[0])));
    }
    if let Some(i) = t.windows(2).position(|w| w[1] <= w[0]) {
        return Err(TemporalNetworkError::Ordering(format!(
            "times are not strictly increasing at index {}: {} then {}",
            i + 1,
            t[i],
            t[i + 1]
        )));
    }
    Ok(())
}
