#![warn(
    // Inline allows mark the places worth a second look.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

//! # tn-gen – stochastic temporal network generators
//!
//! Continuous-time processes on top of the `tn-core` records:
//!
//! 1. [`schedule`] – piecewise-constant rate schedules and the inhomogeneous event scheduler that
//!    draws event times by integrating the total rate against a unit-exponential hazard.
//! 2. [`flockwork`] – the Flockwork-P rewiring process with global or per-node rates and uniform or
//!    affinity-weighted partners, recorded as an `edge_changes` stream, plus its stationary-state
//!    theory.
//! 3. [`sirs`] – SIRS epidemics on a static graph or a replayed diff stream, with the S–I
//!    frontier maintained incrementally.
//!
//! The `tngen` binary wraps these in subcommands through [`simulation`], reading run
//! configurations ([`config`]) and writing results into a timestamped directory under `runs/`.

pub mod config;
pub mod flockwork;
pub mod schedule;
pub mod simulation;
pub mod sirs;
pub mod utils;

pub use config::{
    FlockworkRun,
    NetworkRecord,
};
pub use flockwork::{
    flockwork_p,
    simulate_flockwork_p,
    FlockworkConfig,
    FlockworkRatePoint,
    NeighborAffinity,
    RateScope,
};
pub use schedule::{
    RateSchedule,
    ScheduledEvent,
    Scheduler,
};
pub use sirs::{
    simulate_sirs_on_network,
    simulate_sirs_with_observer,
    ContactNetwork,
    SirsConfig,
    SirsObservables,
};
