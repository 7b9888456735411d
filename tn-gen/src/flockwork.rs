//! Flockwork-P rewiring.
//!
//! At every event one node either *reconnects*, dropping all of its edges and gaining exactly one
//! new edge to a partner, or *disconnects*, dropping all of its edges. Rates are either global
//! (one reconnection and one disconnection rate per node, identical for all nodes) or given per
//! node; partners are drawn uniformly or from a per-node affinity table.
//!
//! Channel layout handed to the scheduler:
//!
//! | scope      | channels                                  | node                  |
//! |------------|-------------------------------------------|-----------------------|
//! | `Global`   | `[N·α, N·β]`                              | drawn uniformly       |
//! | `PerNode`  | `[α_0, …, α_{N-1}, β_0, …, β_{N-1}]`      | `channel % N`         |
mod equilibrium;

use rand::distributions::{
    Distribution,
    WeightedIndex,
};
use rand::rngs::StdRng;
use rand::{
    Rng,
    SeedableRng,
};
use serde::{
    Deserialize,
    Serialize,
};
use tn_core::graph::{
    check_edges,
    normalize,
};
use tn_core::{
    Edge,
    EdgeChanges,
    Graph,
    Result,
    TemporalNetworkError,
};
use tracing::{
    debug,
    info,
    instrument,
};

pub use self::equilibrium::{
    equilibrium_configuration,
    equilibrium_group_size_distribution,
    expected_mean_degree,
    EquilibriumConfiguration,
};
use crate::schedule::{
    RateSchedule,
    Scheduler,
};

/// Whether rates are shared by all nodes or given per node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateScope {
    /// One reconnection and one disconnection rate, each applying to every node.
    #[default]
    Global,
    /// One reconnection and one disconnection rate per node.
    PerNode,
}

/// Rates valid from `t` until the next point.
///
/// Both vectors hold one entry for [`RateScope::Global`] and `N` entries for
/// [`RateScope::PerNode`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlockworkRatePoint {
    /// Start of validity.
    pub t: f64,
    /// Per-node reconnection rates `α`.
    pub reconnection: Vec<f64>,
    /// Per-node disconnection rates `β`.
    pub disconnection: Vec<f64>,
}

impl FlockworkRatePoint {
    /// Global rates `α` (reconnection) and `β` (disconnection) from `t` on.
    #[must_use]
    pub fn global(t: f64, reconnection: f64, disconnection: f64) -> Self {
        Self { t, reconnection: vec![reconnection], disconnection: vec![disconnection] }
    }
}

/// Sparse per-node partner weights used instead of uniform partner selection.
///
/// A node without positive weights cannot reconnect; its reconnection events only remove its
/// edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborAffinity {
    partners: Vec<Vec<(usize, f64)>>,
}

impl NeighborAffinity {
    /// Table with one `(partner, weight)` list per node.
    #[must_use]
    pub const fn new(partners: Vec<Vec<(usize, f64)>>) -> Self {
        Self { partners }
    }

    /// Symmetric table from weighted undirected edges.
    #[must_use]
    pub fn from_weighted_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut partners = vec![Vec::new(); n];
        for &(u, v, weight) in edges {
            if u < n && v < n {
                partners[u].push((v, weight));
                partners[v].push((u, weight));
            }
        }
        Self { partners }
    }

    /// Partners of `node` with their weights.
    #[must_use]
    pub fn partners(&self, node: usize) -> &[(usize, f64)] {
        &self.partners[node]
    }

    fn validate(&self, n: usize) -> Result<()> {
        if self.partners.len() != n {
            return Err(TemporalNetworkError::configuration(format!(
                "neighbor affinity lists {} nodes, expected {n}",
                self.partners.len()
            )));
        }
        for (node, partners) in self.partners.iter().enumerate() {
            for &(partner, weight) in partners {
                if partner >= n || partner == node {
                    return Err(TemporalNetworkError::configuration(format!(
                        "node {node} has invalid affinity partner {partner}"
                    )));
                }
                if !weight.is_finite() || weight < 0.0 {
                    return Err(TemporalNetworkError::configuration(format!(
                        "affinity weight {weight} between {node} and {partner} must be finite and non-negative"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Parameters of one Flockwork-P run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlockworkConfig {
    /// Number of nodes.
    #[serde(rename = "N")]
    pub n: usize,
    /// Edges present at `t = 0`.
    #[serde(default)]
    pub initial_edges: Vec<Edge>,
    /// Rate schedule; the first point must be at `t = 0`.
    pub rates: Vec<FlockworkRatePoint>,
    /// How the rate vectors are read.
    #[serde(default)]
    pub scope: RateScope,
    /// Partner weights; uniform partners when absent.
    #[serde(default)]
    pub affinity: Option<NeighborAffinity>,
    /// Simulated time span; the result covers `[0, t_run_total]`.
    pub t_run_total: f64,
    /// End of the rate schedule's last segment.
    pub tmax: f64,
    /// Replay the rate schedule with period `tmax` when `t_run_total` exceeds it.
    #[serde(default)]
    pub repeat: bool,
    /// Seed of the run's generator.
    #[serde(default)]
    pub seed: u64,
    /// Log every event at debug level.
    #[serde(default)]
    pub verbose: bool,
}

impl FlockworkConfig {
    /// Check every parameter without drawing randomness.
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(TemporalNetworkError::configuration("a Flockwork-P network needs at least one node"));
        }
        check_edges(self.n, &self.initial_edges)?;
        if !self.t_run_total.is_finite() || self.t_run_total < 0.0 {
            return Err(TemporalNetworkError::configuration(format!(
                "t_run_total = {} must be finite and non-negative",
                self.t_run_total
            )));
        }
        if let Some(affinity) = &self.affinity {
            affinity.validate(self.n)?;
        }
        self.schedule().map(|_| ())
    }

    /// The rate schedule as seen by the scheduler, with global rates scaled by `N`.
    pub fn schedule(&self) -> Result<RateSchedule> {
        let Some(first) = self.rates.first() else {
            return Err(TemporalNetworkError::configuration("the rate schedule is empty"));
        };
        if first.t != 0.0 {
            return Err(TemporalNetworkError::configuration(format!(
                "the rate schedule must start at t = 0, not {}",
                first.t
            )));
        }

        let width = match self.scope {
            RateScope::Global => 1,
            RateScope::PerNode => self.n,
        };
        #[allow(clippy::cast_precision_loss)]
        let scale = match self.scope {
            RateScope::Global => self.n as f64,
            RateScope::PerNode => 1.0,
        };

        let mut times = Vec::with_capacity(self.rates.len());
        let mut rates = Vec::with_capacity(self.rates.len());
        for point in &self.rates {
            if point.reconnection.len() != width || point.disconnection.len() != width {
                return Err(TemporalNetworkError::configuration(format!(
                    "rates at t = {} need {width} reconnection and disconnection entries, got {} and {}",
                    point.t,
                    point.reconnection.len(),
                    point.disconnection.len()
                )));
            }
            times.push(point.t);
            rates.push(point.reconnection.iter().chain(&point.disconnection).map(|r| r * scale).collect());
        }
        RateSchedule::new(times, rates, self.tmax)?.repeating(self.repeat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rewiring {
    Reconnect,
    Disconnect,
}

/// The graph plus everything needed to turn a channel into an edge diff.
struct FlockworkProcess {
    graph: Graph,
    scope: RateScope,
    partner_weights: Option<Vec<Option<(Vec<usize>, WeightedIndex<f64>)>>>,
}

impl FlockworkProcess {
    fn new(config: &FlockworkConfig) -> Result<Self> {
        let graph = Graph::from_edges(config.n, &config.initial_edges)?;
        let partner_weights = config.affinity.as_ref().map(|affinity| {
            (0..config.n)
                .map(|node| {
                    let partners = affinity.partners(node);
                    // empty or all-zero weights leave the node without a partner
                    WeightedIndex::new(partners.iter().map(|&(_, w)| w))
                        .ok()
                        .map(|weights| (partners.iter().map(|&(p, _)| p).collect(), weights))
                })
                .collect()
        });
        Ok(Self { graph, scope: config.scope, partner_weights })
    }

    fn decode<R: Rng + ?Sized>(&self, channel: usize, rng: &mut R) -> Result<(usize, Rewiring)> {
        let n = self.graph.num_nodes();
        let (node, kind) = match self.scope {
            RateScope::Global if channel < 2 => (rng.gen_range(0..n), channel),
            RateScope::PerNode if channel < 2 * n => (channel % n, channel / n),
            _ => {
                return Err(TemporalNetworkError::invariant(format!(
                    "scheduler selected rewiring channel {channel}, which does not exist"
                )))
            },
        };
        let rewiring = if kind == 0 { Rewiring::Reconnect } else { Rewiring::Disconnect };
        Ok((node, rewiring))
    }

    fn partner<R: Rng + ?Sized>(&self, node: usize, rng: &mut R) -> Option<usize> {
        let n = self.graph.num_nodes();
        match &self.partner_weights {
            Some(table) => table[node].as_ref().map(|(partners, weights)| partners[weights.sample(rng)]),
            None if n > 1 => {
                let partner = rng.gen_range(0..n - 1);
                Some(if partner >= node { partner + 1 } else { partner })
            },
            None => None,
        }
    }

    /// Apply one event and return the net `(edges_out, edges_in)`.
    fn rewire<R: Rng + ?Sized>(&mut self, node: usize, rewiring: Rewiring, rng: &mut R) -> (Vec<Edge>, Vec<Edge>) {
        let mut edges_out = self.graph.isolate(node);
        let mut edges_in = Vec::new();
        if rewiring == Rewiring::Reconnect {
            if let Some(partner) = self.partner(node, rng) {
                let edge = normalize((node, partner));
                self.graph.add_edge(node, partner);
                match edges_out.iter().position(|&e| e == edge) {
                    Some(k) => {
                        edges_out.remove(k);
                    },
                    None => edges_in.push(edge),
                }
            }
        }
        (edges_out, edges_in)
    }
}

/// Simulate Flockwork-P rewiring and return the resulting diff stream on `[0, t_run_total]`.
///
/// Events that leave the graph unchanged are consumed but not recorded.
#[instrument(skip(config), fields(n = config.n, scope = ?config.scope, affinity = config.affinity.is_some()))]
pub fn simulate_flockwork_p(config: &FlockworkConfig) -> Result<EdgeChanges> {
    config.validate()?;
    let mut scheduler = Scheduler::new(config.schedule()?);
    let mut process = FlockworkProcess::new(config)?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut t = 0.0;
    let mut times = Vec::new();
    let mut all_edges_in = Vec::new();
    let mut all_edges_out = Vec::new();
    let mut consumed = 0_usize;

    while let Some(event) = scheduler.next_event(t, &[], config.t_run_total, &mut rng)? {
        t = event.time;
        consumed += 1;
        let (node, rewiring) = process.decode(event.channel, &mut rng)?;
        let (edges_out, edges_in) = process.rewire(node, rewiring, &mut rng);
        if config.verbose {
            debug!(t, node, ?rewiring, ?edges_out, ?edges_in, "rewired");
        }
        if edges_out.is_empty() && edges_in.is_empty() {
            continue;
        }
        times.push(t);
        all_edges_in.push(edges_in);
        all_edges_out.push(edges_out);
    }

    info!(events = consumed, recorded = times.len(), edges = process.graph.num_edges(), "Flockwork-P run complete");
    Ok(EdgeChanges {
        n: config.n,
        t0: 0.0,
        tmax: config.t_run_total,
        edges_initial: config.initial_edges.clone(),
        t: times,
        edges_in: all_edges_in,
        edges_out: all_edges_out,
    })
}

/// Flockwork-P with unit rewiring rate: reconnection rate `P` and disconnection rate `1 - P` per
/// node. Starts from an equilibrium configuration when no initial edges are given.
///
/// The equilibrium configuration places whole cliques, which single-edge reconnections do not
/// preserve, so the starting graph is not stationary under this process. A zero `t_run_total`
/// returns the starting graph without events.
#[instrument(skip(initial_edges))]
pub fn flockwork_p(
    n: usize,
    p: f64,
    t_run_total: f64,
    initial_edges: Option<Vec<Edge>>,
    seed: u64,
) -> Result<EdgeChanges> {
    if !(0.0..=1.0).contains(&p) {
        return Err(TemporalNetworkError::configuration(format!("P = {p} must lie in [0, 1]")));
    }
    let initial_edges = match initial_edges {
        Some(edges) => edges,
        None => equilibrium_configuration(n, p, seed)?.edges,
    };
    simulate_flockwork_p(&FlockworkConfig {
        n,
        initial_edges,
        rates: vec![FlockworkRatePoint::global(0.0, p, 1.0 - p)],
        scope: RateScope::Global,
        affinity: None,
        t_run_total,
        tmax: f64::INFINITY,
        repeat: false,
        seed,
        verbose: false,
    })
}
