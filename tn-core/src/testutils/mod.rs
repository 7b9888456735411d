use rstest::*;

use crate::{
    EdgeChanges,
    EdgeLists,
};

/// Two pairs that merge into one group at `t = 1`.
#[fixture]
pub fn merging_pairs() -> EdgeChanges {
    EdgeChanges {
        n: 4,
        t0: 0.0,
        tmax: 3.0,
        edges_initial: vec![(0, 1), (2, 3)],
        t: vec![1.0],
        edges_in: vec![vec![(1, 2)]],
        edges_out: vec![vec![]],
    }
}

/// Five nodes with joins, a split and a rewiring over `[0, 10]`.
#[fixture]
pub fn rewiring_stream() -> EdgeChanges {
    EdgeChanges {
        n: 5,
        t0: 0.0,
        tmax: 10.0,
        edges_initial: vec![(0, 1), (1, 2)],
        t: vec![1.0, 2.5, 4.0, 7.0],
        edges_in: vec![vec![(3, 4)], vec![(0, 3)], vec![], vec![(1, 2), (2, 4)]],
        edges_out: vec![vec![], vec![(1, 2)], vec![(0, 1)], vec![(0, 3)]],
    }
}

/// Snapshot rendition of [`rewiring_stream`].
#[fixture]
pub fn rewiring_snapshots() -> EdgeLists {
    EdgeLists {
        n: 5,
        t: vec![0.0, 1.0, 2.5, 4.0, 7.0],
        tmax: 10.0,
        edges: vec![
            vec![(0, 1), (1, 2)],
            vec![(0, 1), (1, 2), (3, 4)],
            vec![(0, 1), (0, 3), (3, 4)],
            vec![(0, 3), (3, 4)],
            vec![(1, 2), (2, 4), (3, 4)],
        ],
    }
}
