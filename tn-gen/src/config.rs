//! Run configuration files and network records read by the front end.
use serde::{
    Deserialize,
    Serialize,
};
use tn_core::{
    edge_changes_to_edge_lists,
    edge_lists_to_edge_changes,
    verify_edge_changes,
    verify_edge_lists,
    EdgeChanges,
    EdgeLists,
    Result,
    VerificationReport,
};

use crate::flockwork::FlockworkConfig;

const fn one() -> usize {
    1
}

/// A Flockwork-P run: the process parameters plus the number of independent replicates.
///
/// Replicate `i` uses seed `seed + i`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlockworkRun {
    /// Parameters shared by every replicate.
    #[serde(flatten)]
    pub process: FlockworkConfig,
    /// Number of independent runs.
    #[serde(default = "one")]
    pub replicates: usize,
}

impl FlockworkRun {
    /// The process configuration of every replicate, in order.
    #[must_use]
    pub fn replicate_configs(&self) -> Vec<FlockworkConfig> {
        (0..self.replicates as u64)
            .map(|i| FlockworkConfig { seed: self.process.seed.wrapping_add(i), ..self.process.clone() })
            .collect()
    }
}

/// A temporal network file in either encoding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NetworkRecord {
    /// Diff stream.
    Changes(EdgeChanges),
    /// Snapshot stream.
    Lists(EdgeLists),
}

impl NetworkRecord {
    /// The same network in the other encoding.
    pub fn convert(&self, verbose: bool) -> Result<Self> {
        match self {
            Self::Changes(changes) => edge_changes_to_edge_lists(changes, verbose).map(Self::Lists),
            Self::Lists(lists) => edge_lists_to_edge_changes(lists, verbose).map(Self::Changes),
        }
    }

    /// The network as a diff stream, converting if needed.
    pub fn into_edge_changes(self, verbose: bool) -> Result<EdgeChanges> {
        match self {
            Self::Changes(changes) => Ok(changes),
            Self::Lists(lists) => edge_lists_to_edge_changes(&lists, verbose),
        }
    }

    /// Every defect of the record.
    #[must_use]
    pub fn verify(&self) -> VerificationReport {
        match self {
            Self::Changes(changes) => verify_edge_changes(changes),
            Self::Lists(lists) => verify_edge_lists(lists),
        }
    }

    /// Short name of the encoding.
    #[must_use]
    pub const fn encoding(&self) -> &'static str {
        match self {
            Self::Changes(_) => "edge_changes",
            Self::Lists(_) => "edge_lists",
        }
    }
}
