use itertools::Itertools;
use rstest::*;

use super::*;
use crate::conversion::edge_changes_to_edge_lists;
use crate::network::{
    EdgeChanges,
    EdgeLists,
};
use crate::testutils::*;

/// Node 0 never becomes isolated and returns to an earlier group at `t = 4`.
#[fixture]
fn always_grouped() -> EdgeChanges {
    EdgeChanges {
        n: 4,
        t0: 0.0,
        tmax: 5.0,
        edges_initial: vec![(0, 1)],
        t: vec![1.0, 2.0, 3.0, 4.0],
        edges_in: vec![vec![(1, 2)], vec![(0, 3)], vec![], vec![(0, 1)]],
        edges_out: vec![vec![], vec![(1, 2)], vec![(0, 1)], vec![]],
    }
}

#[rstest]
fn test_merge_emits_one_interval_per_group(merging_pairs: EdgeChanges) {
    let trajectory = social_trajectory(&merging_pairs, 0, false).unwrap();

    assert_eq!(trajectory.len(), 2);
    assert_eq!((trajectory[0].label, trajectory[0].size), (0, 2));
    assert_eq!(trajectory[0].intervals, vec![(0.0, 1.0)]);
    assert_eq!((trajectory[1].label, trajectory[1].size), (1, 4));
    assert_eq!(trajectory[1].intervals, vec![(1.0, 3.0)]);
}

#[rstest]
fn test_intervals_cover_window_without_gaps(always_grouped: EdgeChanges) {
    let trajectory = social_trajectory(&always_grouped, 0, false).unwrap();

    let intervals = trajectory
        .iter()
        .flat_map(|entry| entry.intervals.iter().copied())
        .sorted_by(|a, b| a.0.total_cmp(&b.0))
        .collect::<Vec<_>>();
    assert_eq!(intervals.first().map(|i| i.0), Some(always_grouped.t0));
    assert_eq!(intervals.last().map(|i| i.1), Some(always_grouped.tmax));
    for (a, b) in intervals.iter().tuple_windows() {
        assert_eq!(a.1, b.0, "gap or overlap between {a:?} and {b:?}");
    }
}

#[rstest]
fn test_revisited_group_keeps_its_label(always_grouped: EdgeChanges) {
    let trajectory = social_trajectory(&always_grouped, 0, false).unwrap();

    let revisited = trajectory.iter().find(|entry| entry.intervals.len() == 2).unwrap();
    assert_eq!(revisited.size, 3);
    assert_eq!(revisited.intervals, vec![(2.0, 3.0), (4.0, 5.0)]);
    assert_eq!(trajectory.iter().map(|entry| entry.label).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
}

#[rstest]
fn test_both_encodings_agree(rewiring_stream: EdgeChanges) {
    let lists: EdgeLists = edge_changes_to_edge_lists(&rewiring_stream, false).unwrap();

    for node in 0..rewiring_stream.n {
        assert_eq!(
            social_trajectory(&rewiring_stream, node, false).unwrap(),
            social_trajectory(&lists, node, false).unwrap(),
            "trajectories of node {node} differ"
        );
    }
}

#[rstest]
fn test_interval_mode_rejects_tmax_before_last_event(mut rewiring_stream: EdgeChanges) {
    rewiring_stream.tmax = 6.0;

    let err = social_trajectory(&rewiring_stream, 0, false).unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Ordering(_)));
}

#[rstest]
fn test_focal_node_out_of_range(merging_pairs: EdgeChanges) {
    let err = social_trajectory(&merging_pairs, 4, false).unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}

#[rstest]
#[case::aligned_bins(GridSpec::with_steps(3), vec![vec![0], vec![1], vec![1]])]
#[case::change_mid_bin(GridSpec::with_steps(2), vec![vec![0, 1], vec![1]])]
#[case::by_width(GridSpec::with_dt(1.5), vec![vec![0, 1], vec![1]])]
fn test_binned_trajectory(
    merging_pairs: EdgeChanges,
    #[case] grid: GridSpec,
    #[case] expected: Vec<Vec<usize>>,
) {
    let bins = binned_social_trajectory(&merging_pairs, 0, BinnedTrajectoryOptions { grid, verbose: false }).unwrap();

    let expected = expected.into_iter().map(BTreeSet::from_iter).collect::<Vec<_>>();
    assert_eq!(bins, expected);
}

#[rstest]
fn test_binned_trajectory_skips_isolated_spells(rewiring_stream: EdgeChanges) {
    let bins = binned_social_trajectory(
        &rewiring_stream,
        0,
        BinnedTrajectoryOptions { grid: GridSpec::with_steps(10), verbose: false },
    )
    .unwrap();

    assert_eq!(bins.len(), 10);
    // node 0 is isolated from t = 7 on
    assert!(bins[7].is_empty());
    assert!(bins[9].is_empty());
    assert_eq!(bins[0], BTreeSet::from([0]));
    assert_eq!(bins[2], BTreeSet::from([0, 1]));
}

#[rstest]
fn test_binned_rejects_non_dividing_dt(merging_pairs: EdgeChanges) {
    let err = binned_social_trajectory(
        &merging_pairs,
        0,
        BinnedTrajectoryOptions { grid: GridSpec::with_dt(2.0), verbose: false },
    )
    .unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}

#[rstest]
fn test_binned_rejects_both_resolutions(merging_pairs: EdgeChanges) {
    let grid = GridSpec { dt: 1.0, n_time_steps: 3 };
    let err = binned_social_trajectory(&merging_pairs, 0, BinnedTrajectoryOptions { grid, verbose: false })
        .unwrap_err();
    assert!(matches!(err, TemporalNetworkError::Configuration(_)));
}

#[rstest]
fn test_binned_changes_on_bin_edges() {
    let stream = EdgeChanges {
        n: 3,
        t0: 0.0,
        tmax: 1.0,
        edges_initial: vec![(0, 1)],
        t: vec![0.3, 0.7],
        edges_in: vec![vec![(1, 2)], vec![]],
        edges_out: vec![vec![], vec![(1, 2)]],
    };

    let bins =
        binned_social_trajectory(&stream, 0, BinnedTrajectoryOptions { grid: GridSpec::with_steps(10), verbose: false })
            .unwrap();

    let expected = [0, 0, 0, 1, 1, 1, 1, 0, 0, 0].map(|label| BTreeSet::from([label]));
    assert_eq!(bins, expected);
}
