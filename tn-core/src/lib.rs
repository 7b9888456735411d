#![warn(
    // Pedantic lints are a review aid here: an inline allow marks code someone already looked at.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]

//! # tn-core – temporal network records and analyses
//!
//! A temporal network is an undirected simple graph on nodes `0..N` whose edge set changes at
//! discrete times inside an observation window `[t0, tmax]`. This crate holds the two record
//! encodings and everything that only needs a record to work:
//!
//! 1. Records ([`EdgeChanges`], [`EdgeLists`]) and the [`TemporalNetwork`] replay trait that lets
//!    analyses treat both encodings alike.
//! 2. Conversion ([`conversion`]) between the diff and the snapshot encoding, and resampling onto a
//!    regular [`TimeGrid`].
//! 3. Canonical group labels ([`canonical`]) and social trajectories ([`trajectory`]) of a focal
//!    node, either as membership intervals or per time bin.
//! 4. Verification ([`verify`]) that reports every structural defect of a record, and simple
//!    descriptive statistics ([`analysis`]).
//!
//! Every fallible routine returns [`Result`] with a [`TemporalNetworkError`]; validation happens
//! before any state is touched. Long-running routines are annotated with [`tracing`] spans and
//! [`logging::setup`] installs a subscriber for binaries.

pub mod analysis;
pub mod canonical;
pub mod conversion;
pub mod errors;
pub mod graph;
pub mod grid;
pub mod logging;
pub mod network;
pub mod trajectory;
pub mod verify;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use canonical::{
    CanonicalGroup,
    GroupRegistry,
};
pub use conversion::{
    edge_changes_to_edge_lists,
    edge_lists_to_edge_changes,
    sample_edge_changes,
    SamplingOptions,
};
pub use errors::{
    Result,
    TemporalNetworkError,
};
pub use graph::{
    Edge,
    Graph,
};
pub use grid::{
    GridSpec,
    TimeGrid,
};
pub use network::{
    EdgeChanges,
    EdgeLists,
    TemporalNetwork,
};
pub use trajectory::{
    binned_social_trajectory,
    social_trajectory,
    BinnedTrajectoryOptions,
    SocialTrajectoryEntry,
};
pub use verify::{
    verify_edge_changes,
    verify_edge_lists,
    VerificationReport,
};
