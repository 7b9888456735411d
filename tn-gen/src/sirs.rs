//! SIRS epidemics on static or changing contact networks.
//!
//! Nodes cycle through susceptible, infected and recovered. The infection channel's rate is
//! proportional to the number of S–I edges, which [`EpidemicNetwork`] keeps as a materialized
//! set updated in place by every epidemic transition and every network change.
mod indexed_set;

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{
    Rng,
    SeedableRng,
};
use serde::{
    Deserialize,
    Serialize,
};
use tn_core::graph::normalize;
use tn_core::{
    Edge,
    EdgeChanges,
    Graph,
    Result,
    TemporalNetwork,
    TemporalNetworkError,
};
use tracing::{
    debug,
    info,
    instrument,
};

use self::indexed_set::IndexedSet;
use crate::schedule::Scheduler;

/// Health status of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Health {
    /// Can be infected by an infected neighbour.
    Susceptible,
    /// Infects susceptible neighbours until it recovers.
    Infected,
    /// Immune until immunity wanes.
    Recovered,
}

/// Epidemic transition channels, in scheduler channel order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// `S → I` along one S–I edge.
    Infection,
    /// `I → R`.
    Recovery,
    /// `R → S`.
    Waning,
}

impl Transition {
    /// The transition behind a scheduler channel.
    pub fn from_channel(channel: usize) -> Result<Self> {
        match channel {
            0 => Ok(Self::Infection),
            1 => Ok(Self::Recovery),
            2 => Ok(Self::Waning),
            _ => Err(TemporalNetworkError::invariant(format!(
                "scheduler selected epidemic channel {channel}, but there are only 3"
            ))),
        }
    }
}

/// Any change to an [`EpidemicNetwork`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StateChange<'a> {
    /// An epidemic transition of a uniformly chosen eligible node.
    Epidemic(Transition),
    /// Exogenous rewiring; removals are applied before insertions.
    Rewire {
        /// Edges added.
        edges_in: &'a [Edge],
        /// Edges removed.
        edges_out: &'a [Edge],
    },
}

/// Contact network plus node health, with the S–I frontier kept consistent with both.
///
/// All mutations go through [`EpidemicNetwork::apply`].
#[derive(Clone, Debug)]
pub struct EpidemicNetwork {
    graph: Graph,
    status: Vec<Health>,
    infected: IndexedSet<usize>,
    recovered: IndexedSet<usize>,
    /// `(infected, susceptible)` pairs joined by an edge.
    si_edges: IndexedSet<(usize, usize)>,
}

impl EpidemicNetwork {
    /// Combine a graph with one status per node.
    pub fn new(graph: Graph, status: Vec<Health>) -> Result<Self> {
        if status.len() != graph.num_nodes() {
            return Err(TemporalNetworkError::configuration(format!(
                "{} health states for {} nodes",
                status.len(),
                graph.num_nodes()
            )));
        }
        let mut infected = IndexedSet::new();
        let mut recovered = IndexedSet::new();
        for (node, health) in status.iter().enumerate() {
            match health {
                Health::Infected => infected.insert(node),
                Health::Recovered => recovered.insert(node),
                Health::Susceptible => false,
            };
        }
        let mut network = Self { graph, status, infected, recovered, si_edges: IndexedSet::new() };
        for edge in network.si_edges_from_scratch() {
            network.si_edges.insert(edge);
        }
        Ok(network)
    }

    /// The current contact network.
    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Health of `node`.
    #[must_use]
    pub fn status(&self, node: usize) -> Health {
        self.status[node]
    }

    /// Number of S–I edges.
    #[must_use]
    pub fn num_si_edges(&self) -> usize {
        self.si_edges.len()
    }

    /// Number of infected nodes.
    #[must_use]
    pub fn num_infected(&self) -> usize {
        self.infected.len()
    }

    /// Number of recovered nodes.
    #[must_use]
    pub fn num_recovered(&self) -> usize {
        self.recovered.len()
    }

    /// The maintained S–I frontier.
    #[must_use]
    pub fn si_edges(&self) -> BTreeSet<(usize, usize)> {
        self.si_edges.iter().collect()
    }

    /// The S–I frontier recomputed by scanning the neighbors of every infected node.
    #[must_use]
    pub fn si_edges_from_scratch(&self) -> BTreeSet<(usize, usize)> {
        let mut edges = BTreeSet::new();
        for infected in self.infected.iter() {
            for &neighbor in self.graph.neighbors(infected) {
                if self.status[neighbor] == Health::Susceptible {
                    edges.insert((infected, neighbor));
                }
            }
        }
        edges
    }

    /// Channel rates `[β·|SI|, μ·|I|, γ·|R|]`.
    #[must_use]
    pub fn rates(&self, config: &SirsConfig) -> [f64; 3] {
        [
            config.infection_rate * self.si_edges.len() as f64,
            config.recovery_rate * self.infected.len() as f64,
            config.waning_rate * self.recovered.len() as f64,
        ]
    }

    /// Whether no event can ever happen again, whatever the network does.
    #[must_use]
    pub fn is_absorbing(&self, config: &SirsConfig) -> bool {
        let quiet = self.rates(config).iter().all(|&rate| rate == 0.0);
        quiet && (config.infection_rate == 0.0 || self.infected.is_empty())
    }

    /// Apply one change, updating health, graph and the S–I frontier together.
    pub fn apply<R: Rng + ?Sized>(&mut self, change: StateChange<'_>, rng: &mut R) -> Result<()> {
        match change {
            StateChange::Epidemic(Transition::Infection) => self.infect(rng),
            StateChange::Epidemic(Transition::Recovery) => self.recover(rng),
            StateChange::Epidemic(Transition::Waning) => self.wane(rng),
            StateChange::Rewire { edges_in, edges_out } => {
                self.rewire(edges_in, edges_out);
                Ok(())
            },
        }
    }

    fn infect<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let (_, susceptible) = pick(&self.si_edges, "SI_edges", rng)?;
        self.status[susceptible] = Health::Infected;
        self.infected.insert(susceptible);
        for &neighbor in self.graph.neighbors(susceptible) {
            match self.status[neighbor] {
                Health::Infected => {
                    self.si_edges.remove(&(neighbor, susceptible));
                },
                Health::Susceptible => {
                    self.si_edges.insert((susceptible, neighbor));
                },
                Health::Recovered => {},
            }
        }
        Ok(())
    }

    fn recover<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let infected = pick(&self.infected, "infected", rng)?;
        self.infected.remove(&infected);
        self.recovered.insert(infected);
        self.status[infected] = Health::Recovered;
        for &neighbor in self.graph.neighbors(infected) {
            self.si_edges.remove(&(infected, neighbor));
        }
        Ok(())
    }

    fn wane<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let recovered = pick(&self.recovered, "recovered", rng)?;
        self.recovered.remove(&recovered);
        self.status[recovered] = Health::Susceptible;
        for &neighbor in self.graph.neighbors(recovered) {
            if self.status[neighbor] == Health::Infected {
                self.si_edges.insert((neighbor, recovered));
            }
        }
        Ok(())
    }

    fn rewire(&mut self, edges_in: &[Edge], edges_out: &[Edge]) {
        for &(u, v) in edges_out {
            if self.graph.remove_edge(u, v) {
                self.si_edges.remove(&(u, v));
                self.si_edges.remove(&(v, u));
            }
        }
        for &edge in edges_in {
            let (u, v) = normalize(edge);
            if !self.graph.add_edge(u, v) {
                continue;
            }
            match (self.status[u], self.status[v]) {
                (Health::Infected, Health::Susceptible) => self.si_edges.insert((u, v)),
                (Health::Susceptible, Health::Infected) => self.si_edges.insert((v, u)),
                _ => false,
            };
        }
    }
}

fn pick<T, R>(set: &IndexedSet<T>, what: &'static str, rng: &mut R) -> Result<T>
where
    T: Copy + Eq + std::hash::Hash,
    R: Rng + ?Sized,
{
    if set.is_empty() {
        return Err(TemporalNetworkError::EmptySelection(what));
    }
    set.get(rng.gen_range(0..set.len())).ok_or(TemporalNetworkError::EmptySelection(what))
}

/// Parameters of one SIRS run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SirsConfig {
    /// Infection rate `β` per S–I edge.
    pub infection_rate: f64,
    /// Recovery rate `μ` per infected node.
    pub recovery_rate: f64,
    /// Rate `γ` at which a recovered node becomes susceptible again.
    pub waning_rate: f64,
    /// Number of nodes infected at the start.
    #[serde(default)]
    pub initially_infected: usize,
    /// Number of nodes recovered at the start.
    #[serde(default)]
    pub initially_recovered: usize,
    /// End of the run.
    pub tmax: f64,
    /// Seed of the run's generator.
    #[serde(default)]
    pub seed: u64,
    /// Log every event at debug level.
    #[serde(default)]
    pub verbose: bool,
}

impl SirsConfig {
    fn validate(&self, n: usize, t0: f64) -> Result<()> {
        for (name, rate) in [
            ("infection_rate", self.infection_rate),
            ("recovery_rate", self.recovery_rate),
            ("waning_rate", self.waning_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(TemporalNetworkError::configuration(format!(
                    "{name} = {rate} must be finite and non-negative"
                )));
            }
        }
        if self.initially_infected + self.initially_recovered > n {
            return Err(TemporalNetworkError::configuration(format!(
                "{} infected and {} recovered nodes do not fit into {n} nodes",
                self.initially_infected, self.initially_recovered
            )));
        }
        if !self.tmax.is_finite() || self.tmax < t0 {
            return Err(TemporalNetworkError::configuration(format!(
                "tmax = {} must be finite and not before t0 = {t0}",
                self.tmax
            )));
        }
        Ok(())
    }

    /// Shuffle the nodes and assign the first ones to the infected, the next ones to the
    /// recovered.
    fn initial_status<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Health> {
        let mut nodes: Vec<usize> = (0..n).collect();
        nodes.shuffle(rng);
        let mut status = vec![Health::Susceptible; n];
        for &node in &nodes[..self.initially_infected] {
            status[node] = Health::Infected;
        }
        let recovered_end = self.initially_infected + self.initially_recovered;
        for &node in &nodes[self.initially_infected..recovered_end] {
            status[node] = Health::Recovered;
        }
        status
    }

    /// Basic reproduction number estimate `β⟨k⟩/μ`.
    #[must_use]
    pub fn r0(&self, mean_degree: f64) -> f64 {
        let spread = self.infection_rate * mean_degree;
        if self.recovery_rate > 0.0 {
            spread / self.recovery_rate
        } else if spread > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// Time series recorded after every change, starting with the initial state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SirsObservables {
    /// Reproduction number estimate, see [`SirsConfig::r0`].
    #[serde(rename = "R0")]
    pub r0: Vec<f64>,
    /// Number of S–I edges.
    #[serde(rename = "SI")]
    pub si: Vec<usize>,
    /// Number of infected nodes.
    #[serde(rename = "I")]
    pub i: Vec<usize>,
    /// Number of recovered nodes.
    #[serde(rename = "R")]
    pub r: Vec<usize>,
    /// Record times.
    pub t: Vec<f64>,
}

impl SirsObservables {
    fn record(&mut self, t: f64, state: &EpidemicNetwork, config: &SirsConfig) {
        self.r0.push(config.r0(state.graph().mean_degree()));
        self.si.push(state.num_si_edges());
        self.i.push(state.num_infected());
        self.r.push(state.num_recovered());
        self.t.push(t);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Contact network an epidemic runs on.
#[derive(Clone, Copy, Debug)]
pub enum ContactNetwork<'a> {
    /// A graph that never changes; the run starts at `t = 0`.
    Static(&'a Graph),
    /// A diff stream replayed alongside the epidemic; the run starts at its `t0`.
    Changing(&'a EdgeChanges),
}

/// Run SIRS until `tmax` or until the state is absorbing.
pub fn simulate_sirs_on_network(network: ContactNetwork<'_>, config: &SirsConfig) -> Result<SirsObservables> {
    simulate_sirs_with_observer(network, config, |_, _| {})
}

/// Like [`simulate_sirs_on_network`], calling `observer` with the time and state after every
/// recorded change.
#[instrument(skip(network, config, observer), fields(infection_rate = config.infection_rate, recovery_rate = config.recovery_rate, waning_rate = config.waning_rate))]
pub fn simulate_sirs_with_observer<F>(
    network: ContactNetwork<'_>,
    config: &SirsConfig,
    mut observer: F,
) -> Result<SirsObservables>
where
    F: FnMut(f64, &EpidemicNetwork),
{
    let (graph, t0, changes) = match network {
        ContactNetwork::Static(graph) => (graph.clone(), 0.0, None),
        ContactNetwork::Changing(changes) => {
            changes.validate()?;
            (changes.initial_graph(), changes.t0, Some(changes))
        },
    };
    config.validate(graph.num_nodes(), t0)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let status = config.initial_status(graph.num_nodes(), &mut rng);
    let mut state = EpidemicNetwork::new(graph, status)?;
    let mut scheduler = Scheduler::state_only(t0);
    let mut observables = SirsObservables::default();

    let mut t = t0;
    observables.record(t, &state, config);
    observer(t, &state);

    let mut next_change = 0;
    let mut epidemic_events = 0_usize;
    while !state.is_absorbing(config) {
        let pending = changes.filter(|c| next_change < c.t.len() && c.t[next_change] <= config.tmax);
        let bound = pending.map_or(config.tmax, |c| c.t[next_change]);

        match scheduler.next_event(t, &state.rates(config), bound, &mut rng)? {
            Some(event) => {
                t = event.time;
                let transition = Transition::from_channel(event.channel)?;
                state.apply(StateChange::Epidemic(transition), &mut rng)?;
                epidemic_events += 1;
                if config.verbose {
                    debug!(t, ?transition, si = state.num_si_edges(), infected = state.num_infected(), "epidemic event");
                }
            },
            None => {
                let Some(changes) = pending else { break };
                t = bound;
                let change = StateChange::Rewire {
                    edges_in: &changes.edges_in[next_change],
                    edges_out: &changes.edges_out[next_change],
                };
                state.apply(change, &mut rng)?;
                next_change += 1;
                if config.verbose {
                    debug!(t, si = state.num_si_edges(), edges = state.graph().num_edges(), "network changed");
                }
            },
        }
        observables.record(t, &state, config);
        observer(t, &state);
    }

    info!(
        epidemic_events,
        network_changes = next_change,
        infected = state.num_infected(),
        recovered = state.num_recovered(),
        t,
        "SIRS run complete"
    );
    Ok(observables)
}
