//! Social trajectories: the sequence of canonical groups a focal node belongs to over time.
//!
//! Both extractors replay a temporal network, recompute the focal node's connected component
//! after every step and resolve it through a [`GroupRegistry`] that lives for one call only.
use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    instrument,
};

use crate::canonical::GroupRegistry;
use crate::errors::{
    Result,
    TemporalNetworkError,
};
use crate::graph::Graph;
use crate::grid::{
    GridSpec,
    TimeGrid,
};
use crate::network::TemporalNetwork;

/// Membership intervals of the focal node in one canonical group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocialTrajectoryEntry {
    /// Canonical group label; equal to the entry's position in the trajectory.
    pub label: usize,
    /// Number of nodes in the group.
    pub size: usize,
    /// Membership hash of the group.
    pub hash: u64,
    /// Half-open `(start, end)` intervals during which the focal node was a member.
    pub intervals: Vec<(f64, f64)>,
}

/// Options for [`binned_social_trajectory`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BinnedTrajectoryOptions {
    /// Bin resolution; exactly one of `dt` and `N_time_steps` must be positive.
    #[serde(flatten)]
    pub grid: GridSpec,
    /// Emit per-step diagnostics.
    #[serde(default)]
    pub verbose: bool,
}

fn check_focal_node<T: TemporalNetwork>(network: &T, node: usize) -> Result<()> {
    if node >= network.num_nodes() {
        return Err(TemporalNetworkError::configuration(format!(
            "focal node {node} is outside 0..{}",
            network.num_nodes()
        )));
    }
    Ok(())
}

/// Interval-mode trajectory: one entry per canonical group the focal node was part of (groups
/// of size one are not groups), ordered by label.
///
/// An interval closes whenever the focal node's component changes and at `tmax`.
#[instrument(skip(network), fields(n = network.num_nodes(), steps = network.times().len()))]
pub fn social_trajectory<T: TemporalNetwork>(
    network: &T,
    node: usize,
    verbose: bool,
) -> Result<Vec<SocialTrajectoryEntry>> {
    network.validate()?;
    check_focal_node(network, node)?;

    let mut graph = network.initial_graph();
    let mut registry = GroupRegistry::new(network.num_nodes());
    let mut trajectory = Vec::new();

    let mut component = graph.component_of(node);
    let mut active_since = network.t0();

    for (step, &t) in network.times().iter().enumerate() {
        network.apply_step(&mut graph, step);
        let next_component = graph.component_of(node);
        if next_component == component {
            continue;
        }
        if verbose {
            debug!(t, size = next_component.len(), "component of focal node changed");
        }
        if component.len() > 1 && t > active_since {
            close_interval(&mut registry, &mut trajectory, &component, active_since, t);
        }
        active_since = t;
        component = next_component;
    }

    let tmax = network.tmax();
    if component.len() > 1 && tmax > active_since {
        close_interval(&mut registry, &mut trajectory, &component, active_since, tmax);
    }

    Ok(trajectory)
}

fn close_interval(
    registry: &mut GroupRegistry,
    trajectory: &mut Vec<SocialTrajectoryEntry>,
    component: &BTreeSet<usize>,
    start: f64,
    end: f64,
) {
    let group = registry.resolve(component);
    if group.label == trajectory.len() {
        trajectory.push(SocialTrajectoryEntry {
            label: group.label,
            size: group.size,
            hash: group.hash,
            intervals: Vec::new(),
        });
    }
    trajectory[group.label].intervals.push((start, end));
}

/// Binned-mode trajectory: for each of the grid's bins, the set of canonical labels the focal
/// node belonged to at any time within that bin. Isolated spells contribute nothing.
#[instrument(skip(network), fields(n = network.num_nodes(), steps = network.times().len()))]
pub fn binned_social_trajectory<T: TemporalNetwork>(
    network: &T,
    node: usize,
    options: BinnedTrajectoryOptions,
) -> Result<Vec<BTreeSet<usize>>> {
    network.validate()?;
    check_focal_node(network, node)?;
    let grid = TimeGrid::resolve(network.t0(), network.tmax(), options.grid)?;
    if options.verbose {
        debug!(dt = grid.dt, n_bins = grid.n_bins, "resampling trajectory");
    }

    let mut graph = network.initial_graph();
    let mut registry = GroupRegistry::new(network.num_nodes());
    let mut bins = vec![BTreeSet::new(); grid.n_bins];

    let mut label = group_label(&graph, node, &mut registry);
    let mut since = network.t0();

    for (step, &t) in network.times().iter().enumerate() {
        if let Some(label) = label {
            for bin in grid.bins_overlapping(since, t) {
                bins[bin].insert(label);
            }
        }
        network.apply_step(&mut graph, step);
        label = group_label(&graph, node, &mut registry);
        since = t;
        if options.verbose {
            debug!(t, ?label, degree = graph.degree(node), "replayed step");
        }
    }
    if let Some(label) = label {
        for bin in grid.bins_overlapping(since, network.tmax()) {
            bins[bin].insert(label);
        }
    }

    Ok(bins)
}

/// Canonical label of the node's component, or `None` while the node is isolated.
fn group_label(graph: &Graph, node: usize, registry: &mut GroupRegistry) -> Option<usize> {
    (graph.degree(node) > 0).then(|| registry.resolve(&graph.component_of(node)).label)
}

#[cfg(test)]
mod tests;
