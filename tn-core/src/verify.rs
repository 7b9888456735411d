//! Exhaustive structural checks of temporal network records.
//!
//! Unlike [`TemporalNetwork::validate`](crate::TemporalNetwork::validate), which stops at the
//! first problem, verification collects every defect so a malformed input can be repaired in one
//! pass.
use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    instrument,
    warn,
};

use crate::graph::{
    normalize,
    Edge,
    Graph,
};
use crate::network::{
    EdgeChanges,
    EdgeLists,
};

/// Where in a stream a defect was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    /// The initial edge set of a diff stream.
    Initial,
    /// Event (diff stream) or snapshot (snapshot stream) with this index.
    Step(usize),
}

/// A single structural problem.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum StreamDefect {
    /// Per-step arrays disagree in length.
    LengthMismatch {
        /// Name of the offending array.
        field: &'static str,
        /// Number of times.
        expected: usize,
        /// Length of the array.
        found: usize,
    },
    /// `tmax` precedes the last time.
    TmaxBeforeLastTime {
        /// Declared end of the window.
        tmax: f64,
        /// Last recorded time.
        last: f64,
    },
    /// An event precedes `t0`.
    TimeBeforeStart {
        /// Event index.
        index: usize,
    },
    /// A time is not larger than its predecessor.
    TimeNotIncreasing {
        /// Index of the offending time.
        index: usize,
    },
    /// An edge references a node id `≥ N`.
    NodeOutOfRange {
        /// Where it was found.
        at: Location,
        /// The edge as given.
        edge: Edge,
    },
    /// An edge connects a node to itself.
    SelfLoop {
        /// Where it was found.
        at: Location,
        /// The looping node.
        node: usize,
    },
    /// The same undirected edge is listed twice.
    DuplicateEdge {
        /// Where it was found.
        at: Location,
        /// The normalized edge.
        edge: Edge,
    },
    /// An edge is both added and removed by one event.
    AddedAndRemoved {
        /// Event index.
        index: usize,
        /// The normalized edge.
        edge: Edge,
    },
    /// An event removes an edge that is not present.
    RemovedAbsentEdge {
        /// Event index.
        index: usize,
        /// The normalized edge.
        edge: Edge,
    },
    /// An event inserts an edge that is already present.
    InsertedPresentEdge {
        /// Event index.
        index: usize,
        /// The normalized edge.
        edge: Edge,
    },
}

/// All defects found in one stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct VerificationReport {
    /// Defects in order of discovery.
    pub defects: Vec<StreamDefect>,
}

impl VerificationReport {
    /// Whether the stream is free of defects.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.defects.is_empty()
    }

    fn push(&mut self, defect: StreamDefect) {
        self.defects.push(defect);
    }

    fn check_times(&mut self, t0: f64, t: &[f64], tmax: f64) {
        if let Some(&last) = t.last() {
            if tmax < last {
                self.push(StreamDefect::TmaxBeforeLastTime { tmax, last });
            }
        }
        for (index, &time) in t.iter().enumerate() {
            if time < t0 {
                self.push(StreamDefect::TimeBeforeStart { index });
            }
            if index > 0 && time <= t[index - 1] {
                self.push(StreamDefect::TimeNotIncreasing { index });
            }
        }
    }

    /// Record malformed entries of one edge list and return the well-formed, distinct ones.
    fn check_edge_list(&mut self, n: usize, at: Location, edges: &[Edge]) -> BTreeSet<Edge> {
        let mut seen = BTreeSet::new();
        for &edge in edges {
            if edge.0 >= n || edge.1 >= n {
                self.push(StreamDefect::NodeOutOfRange { at, edge });
            } else if edge.0 == edge.1 {
                self.push(StreamDefect::SelfLoop { at, node: edge.0 });
            } else if !seen.insert(normalize(edge)) {
                self.push(StreamDefect::DuplicateEdge { at, edge: normalize(edge) });
            }
        }
        seen
    }
}

/// Collect every structural defect of a diff stream, replaying it to detect removals of absent
/// edges and insertions of present ones.
#[instrument(skip(changes), fields(n = changes.n, events = changes.t.len()))]
pub fn verify_edge_changes(changes: &EdgeChanges) -> VerificationReport {
    let mut report = VerificationReport::default();
    let events = changes.t.len();
    for (field, found) in [("edges_in", changes.edges_in.len()), ("edges_out", changes.edges_out.len())] {
        if found != events {
            report.push(StreamDefect::LengthMismatch { field, expected: events, found });
        }
    }
    report.check_times(changes.t0, &changes.t, changes.tmax);

    let initial = report.check_edge_list(changes.n, Location::Initial, &changes.edges_initial);
    let mut graph = Graph::new(changes.n);
    for (u, v) in initial {
        graph.add_edge(u, v);
    }

    for (index, (edges_in, edges_out)) in changes.edges_in.iter().zip(&changes.edges_out).enumerate() {
        let incoming = report.check_edge_list(changes.n, Location::Step(index), edges_in);
        let outgoing = report.check_edge_list(changes.n, Location::Step(index), edges_out);
        for &edge in incoming.intersection(&outgoing) {
            report.push(StreamDefect::AddedAndRemoved { index, edge });
        }
        for &(u, v) in &outgoing {
            if !graph.remove_edge(u, v) {
                report.push(StreamDefect::RemovedAbsentEdge { index, edge: (u, v) });
            }
        }
        for &(u, v) in &incoming {
            if !graph.add_edge(u, v) {
                report.push(StreamDefect::InsertedPresentEdge { index, edge: (u, v) });
            }
        }
    }

    if !report.is_valid() {
        warn!(defects = report.defects.len(), "edge change stream is malformed");
    }
    report
}

/// Collect every structural defect of a snapshot stream.
#[instrument(skip(lists), fields(n = lists.n, snapshots = lists.t.len()))]
pub fn verify_edge_lists(lists: &EdgeLists) -> VerificationReport {
    let mut report = VerificationReport::default();
    if lists.edges.len() != lists.t.len() {
        report.push(StreamDefect::LengthMismatch {
            field: "edges",
            expected: lists.t.len(),
            found: lists.edges.len(),
        });
    }
    let t0 = lists.t.first().copied().unwrap_or(lists.tmax);
    report.check_times(t0, &lists.t, lists.tmax);
    for (index, edges) in lists.edges.iter().enumerate() {
        report.check_edge_list(lists.n, Location::Step(index), edges);
    }

    if !report.is_valid() {
        warn!(defects = report.defects.len(), "edge list stream is malformed");
    }
    report
}
