use rstest::*;

use super::*;
use crate::errors::TemporalNetworkError;
use crate::testutils::*;

/// Graph in effect at time `t` according to any encoding.
fn state_at<T: TemporalNetwork>(network: &T, t: f64) -> Vec<Edge> {
    let mut graph = network.initial_graph();
    for (step, &time) in network.times().iter().enumerate() {
        if time > t {
            break;
        }
        network.apply_step(&mut graph, step);
    }
    graph.edges()
}

#[rstest]
fn test_changes_to_lists(rewiring_stream: EdgeChanges, rewiring_snapshots: EdgeLists) {
    let lists = edge_changes_to_edge_lists(&rewiring_stream, false).unwrap();
    assert_eq!(lists, rewiring_snapshots);
}

#[rstest]
fn test_lists_to_changes(rewiring_stream: EdgeChanges, rewiring_snapshots: EdgeLists) {
    let changes = edge_lists_to_edge_changes(&rewiring_snapshots, false).unwrap();
    assert_eq!(changes.t, rewiring_stream.t);
    for (step, (edges_in, edges_out)) in changes.edges_in.iter().zip(&changes.edges_out).enumerate() {
        assert!(same_edge_set(5, edges_in, &rewiring_stream.edges_in[step]));
        assert!(same_edge_set(5, edges_out, &rewiring_stream.edges_out[step]));
    }
}

#[rstest]
fn test_round_trip_preserves_state_at_every_event(rewiring_stream: EdgeChanges) {
    let lists = edge_changes_to_edge_lists(&rewiring_stream, false).unwrap();
    let back = edge_lists_to_edge_changes(&lists, false).unwrap();

    for &t in std::iter::once(&rewiring_stream.t0).chain(&rewiring_stream.t) {
        assert_eq!(state_at(&back, t), state_at(&rewiring_stream, t), "state differs at t = {t}");
    }
    assert_eq!(back.tmax, rewiring_stream.tmax);
}

#[rstest]
fn test_empty_snapshot_diffs_are_dropped() {
    let lists = EdgeLists {
        n: 3,
        t: vec![0.0, 1.0, 2.0],
        tmax: 3.0,
        edges: vec![vec![(0, 1)], vec![(1, 0)], vec![(1, 2)]],
    };

    let changes = edge_lists_to_edge_changes(&lists, false).unwrap();

    assert_eq!(changes.t, vec![2.0]);
    assert_eq!(changes.edges_in, vec![vec![(1, 2)]]);
    assert_eq!(changes.edges_out, vec![vec![(0, 1)]]);
}

#[rstest]
fn test_event_at_t0_folds_into_initial_snapshot() {
    let changes = EdgeChanges {
        n: 3,
        t0: 0.0,
        tmax: 2.0,
        edges_initial: vec![(0, 1)],
        t: vec![0.0, 1.0],
        edges_in: vec![vec![(1, 2)], vec![]],
        edges_out: vec![vec![], vec![(0, 1)]],
    };

    let lists = edge_changes_to_edge_lists(&changes, false).unwrap();

    assert_eq!(lists.t, vec![0.0, 1.0]);
    assert_eq!(lists.edges, vec![vec![(0, 1), (1, 2)], vec![(1, 2)]]);
}

#[rstest]
fn test_tmax_ordering_rejected_in_both_directions(
    mut rewiring_stream: EdgeChanges,
    mut rewiring_snapshots: EdgeLists,
) {
    rewiring_stream.tmax = 3.0;
    rewiring_snapshots.tmax = 3.0;

    assert!(matches!(
        edge_changes_to_edge_lists(&rewiring_stream, false),
        Err(TemporalNetworkError::Ordering(_))
    ));
    assert!(matches!(
        edge_lists_to_edge_changes(&rewiring_snapshots, false),
        Err(TemporalNetworkError::Ordering(_))
    ));
}

#[rstest]
fn test_sample_on_grid(rewiring_stream: EdgeChanges) {
    let sampled =
        sample_edge_changes(&rewiring_stream, SamplingOptions { grid: GridSpec::with_dt(2.5), verbose: false })
            .unwrap();

    assert_eq!(sampled.t, vec![0.0, 2.5, 5.0, 7.5]);
    assert_eq!(sampled.edges[1], state_at(&rewiring_stream, 2.5));
    assert_eq!(sampled.edges[2], vec![(0, 3), (3, 4)]);
    assert_eq!(sampled.edges[3], vec![(1, 2), (2, 4), (3, 4)]);
}

#[rstest]
fn test_sample_rejects_bad_grid(rewiring_stream: EdgeChanges) {
    let err = sample_edge_changes(&rewiring_stream, SamplingOptions { grid: GridSpec::with_dt(3.0), verbose: false })
        .unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}
