//! Stationary-state theory of Flockwork-P.
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{
    Distribution,
    Poisson,
};
use serde::{
    Deserialize,
    Serialize,
};
use tn_core::{
    Edge,
    Result,
    TemporalNetworkError,
};
use tracing::instrument;

use super::{
    FlockworkConfig,
    RateScope,
};

/// Expected number of groups of each size `m` (entry `m`, entry 0 unused) in the Flockwork-P
/// stationary state of `n` nodes with reconnection probability `p`.
#[allow(clippy::cast_precision_loss)]
pub fn equilibrium_group_size_distribution(n: usize, p: f64) -> Result<Vec<f64>> {
    if n <= 2 {
        return Err(TemporalNetworkError::configuration(format!(
            "the equilibrium distribution needs N > 2, got {n}"
        )));
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(TemporalNetworkError::configuration(format!("P = {p} must lie in [0, 1]")));
    }

    let mut dist = vec![0.0; n + 1];
    if p == 0.0 {
        dist[1] = n as f64;
        return Ok(dist);
    }
    if p == 1.0 {
        dist[n] = 1.0;
        return Ok(dist);
    }

    let big_n = n as f64;
    let sign = |m: usize| if m % 2 == 1 { -1.0 } else { 1.0 };

    dist[1] = big_n * (1.0 - p);
    let mut product = 1.0;
    let mut power = 1.0;
    for m in 2..n {
        let j = (m - 1) as f64;
        product *= (big_n - j) / (p * j - big_n + 1.0);
        power *= p;
        dist[m] = sign(m) * big_n / m as f64 * (p - 1.0) * product * power;
    }

    let mut value = sign(n) * p;
    for j in 1..n - 1 {
        let j = j as f64;
        value *= (big_n - j - 1.0) / ((p - big_n + 1.0) / p + (j - 1.0));
    }
    dist[n] = value;

    Ok(dist)
}

/// An edge list drawn from the stationary state, with its group-size histogram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumConfiguration {
    /// Cliques over disjoint node sets.
    pub edges: Vec<Edge>,
    /// Entry `m` counts the groups of size `m`.
    pub histogram: Vec<usize>,
}

/// Draw a configuration whose group sizes follow the stationary distribution.
///
/// Nodes are shuffled, then handed out to groups from the largest size down; the number of
/// groups of each size is a Poisson draw around its expectation, and draws are repeated until
/// every node is placed.
///
/// The stationary distribution belongs to the group-joining process, where a reconnecting node
/// joins its partner's whole group. The result is a clique configuration; Flockwork-P's
/// single-edge reconnections relax it towards their own steady state, whose mean degree follows
/// [`expected_mean_degree`].
#[instrument]
pub fn equilibrium_configuration(n: usize, p: f64, seed: u64) -> Result<EquilibriumConfiguration> {
    let expected = equilibrium_group_size_distribution(n, p)?;
    let mut rng = StdRng::seed_from_u64(seed);

    let mut nodes: Vec<usize> = (0..n).collect();
    nodes.shuffle(&mut rng);

    let mut histogram = vec![0_usize; n + 1];
    let mut edges = Vec::new();
    let mut nodes_left = n;

    while nodes_left > 0 {
        for m in (1..=nodes_left).rev() {
            if expected[m] <= 0.0 || nodes_left < m {
                continue;
            }
            let poisson = Poisson::new(expected[m]).map_err(|err| {
                TemporalNetworkError::invariant(format!("Poisson draw for group size {m} failed: {err}"))
            })?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let drawn = poisson.sample(&mut rng) as usize;
            let extra = if drawn > histogram[m] {
                drawn - histogram[m]
            } else if nodes_left == 1 && m == 1 {
                1
            } else {
                0
            };

            for _ in 0..extra {
                if nodes_left < m {
                    break;
                }
                edges.extend(nodes[nodes_left - m..nodes_left].iter().copied().tuple_combinations::<(usize, usize)>());
                nodes_left -= m;
                histogram[m] += 1;
            }
        }
    }

    Ok(EquilibriumConfiguration { edges, histogram })
}

/// Mean-field mean degree under global rates: `dk/dt = 2α − 2(α + β)k`, solved exactly on every
/// rate segment and evaluated at `points_per_segment` evenly spaced times per segment.
///
/// Starts from the mean degree of the configured initial edges at `t = 0` and ends at `tmax`.
pub fn expected_mean_degree(config: &FlockworkConfig, points_per_segment: usize) -> Result<Vec<(f64, f64)>> {
    if config.scope != RateScope::Global {
        return Err(TemporalNetworkError::configuration("the mean-field mean degree needs global rates"));
    }
    if points_per_segment == 0 {
        return Err(TemporalNetworkError::configuration("points_per_segment must be positive"));
    }
    config.validate()?;
    let schedule = config.schedule()?;

    #[allow(clippy::cast_precision_loss)]
    let mut k = 2.0 * config.initial_edges.len() as f64 / config.n as f64;
    let mut series = vec![(0.0, k)];

    let breakpoints: Vec<f64> = config.rates.iter().map(|point| point.t).chain([schedule.horizon()]).collect();
    for (point, window) in config.rates.iter().zip(breakpoints.windows(2)) {
        let (alpha, beta) = (point.reconnection[0], point.disconnection[0]);
        let (start, end) = (window[0], window[1]);
        let decay = 2.0 * (alpha + beta);
        let fixed_point = if decay > 0.0 { alpha / (alpha + beta) } else { k };
        let k_start = k;
        for step in 1..=points_per_segment {
            #[allow(clippy::cast_precision_loss)]
            let t = start + (end - start) * step as f64 / points_per_segment as f64;
            k = fixed_point + (k_start - fixed_point) * (-decay * (t - start)).exp();
            series.push((t, k));
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use rstest::*;
    use tn_core::analysis::group_size_histogram;
    use tn_core::Graph;

    use super::*;
    use crate::flockwork::FlockworkRatePoint;

    #[rstest]
    fn test_small_distribution() {
        let dist = equilibrium_group_size_distribution(3, 0.5).unwrap();

        assert_eq!(dist.len(), 4);
        assert_in_delta!(dist[1], 1.5, 1e-12);
        assert_in_delta!(dist[2], 0.5, 1e-12);
        assert_in_delta!(dist[3], 1.0 / 6.0, 1e-12);
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.3)]
    #[case(0.7)]
    #[case(1.0)]
    fn test_distribution_accounts_for_every_node(#[case] p: f64) {
        let dist = equilibrium_group_size_distribution(10, p).unwrap();

        let nodes: f64 = dist.iter().enumerate().map(|(m, count)| m as f64 * count).sum();
        assert_in_delta!(nodes, 10.0, 1e-9);
    }

    #[rstest]
    #[case::too_few_nodes(2, 0.5)]
    #[case::negative_p(5, -0.1)]
    #[case::p_above_one(5, 1.5)]
    fn test_distribution_rejects(#[case] n: usize, #[case] p: f64) {
        let err = equilibrium_group_size_distribution(n, p).unwrap_err();
        assert!(matches!(err, TemporalNetworkError::Configuration(_)));
    }

    #[rstest]
    #[case(0.2)]
    #[case(0.6)]
    #[case(1.0)]
    fn test_configuration_histogram_matches_edges(#[case] p: f64) {
        let config = equilibrium_configuration(40, p, 9).unwrap();

        let graph = Graph::from_edges(40, &config.edges).unwrap();
        assert_eq!(group_size_histogram(&graph), config.histogram);
        let placed: usize = config.histogram.iter().enumerate().map(|(m, count)| m * count).sum();
        assert_eq!(placed, 40);
    }

    #[rstest]
    fn test_configuration_is_seeded() {
        assert_eq!(equilibrium_configuration(30, 0.5, 4).unwrap(), equilibrium_configuration(30, 0.5, 4).unwrap());
    }

    #[rstest]
    fn test_mean_degree_relaxes_to_fixed_point() {
        let config = FlockworkConfig {
            n: 4,
            initial_edges: vec![(0, 1), (0, 2), (0, 3), (1, 2)],
            rates: vec![FlockworkRatePoint::global(0.0, 0.5, 1.5), FlockworkRatePoint::global(1.0, 0.0, 0.0)],
            scope: RateScope::Global,
            affinity: None,
            t_run_total: 10.0,
            tmax: 10.0,
            repeat: false,
            seed: 0,
            verbose: false,
        };

        let series = expected_mean_degree(&config, 4).unwrap();

        assert_eq!(series.len(), 9);
        assert_eq!(series[0], (0.0, 2.0));
        // k(1) = 1/4 + (2 - 1/4) e^{-4}
        let k1 = 0.25 + 1.75 * (-4.0_f64).exp();
        assert_in_delta!(series[4].1, k1, 1e-12);
        // no rewiring after t = 1
        assert_in_delta!(series[8].1, k1, 1e-12);
        assert_eq!(series[8].0, 10.0);
    }
}
