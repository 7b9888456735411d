//! Runs behind the `tngen` subcommands.
//!
//! Every run takes an output directory (normally a fresh one from
//! [`create_timestamped_output_dir`](crate::utils::create_timestamped_output_dir)), writes its
//! result records there as JSON and returns their paths.

use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    ensure,
    Context,
    Result,
};
use indicatif::{
    ParallelProgressIterator,
    ProgressBar,
    ProgressFinish,
    ProgressStyle,
};
use rayon::prelude::*;
use serde_json::json;
use tn_core::{
    binned_social_trajectory,
    sample_edge_changes,
    social_trajectory,
    BinnedTrajectoryOptions,
    GridSpec,
    SamplingOptions,
};
use tracing::{
    info,
    instrument,
    warn,
};

use crate::config::{
    FlockworkRun,
    NetworkRecord,
};
use crate::flockwork::{
    equilibrium_configuration,
    equilibrium_group_size_distribution,
    simulate_flockwork_p,
};
use crate::sirs::{
    simulate_sirs_on_network,
    ContactNetwork,
    SirsConfig,
};
use crate::utils::write_json;

/// Simulate every replicate of `run` in parallel and write `edge_changes_<i>.json` for each.
///
/// Each replicate owns its generator, so the records do not depend on scheduling.
#[instrument(skip(run), fields(n = run.process.n, replicates = run.replicates))]
pub fn run_flockwork(run: &FlockworkRun, output_dir: &Path) -> Result<Vec<PathBuf>> {
    ensure!(run.replicates > 0, "replicates must be positive");
    let configs = run.replicate_configs();

    let pb = ProgressBar::new(configs.len() as u64)
        .with_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} replicates {msg}")?,
        )
        .with_message(format!("Flockwork-P (N = {})", run.process.n))
        .with_finish(ProgressFinish::AndLeave);

    let records = configs
        .par_iter()
        .progress_with(pb)
        .map(simulate_flockwork_p)
        .collect::<tn_core::Result<Vec<_>>>()
        .context("simulating Flockwork-P")?;

    let paths = records
        .iter()
        .enumerate()
        .map(|(i, record)| write_json(output_dir, &format!("edge_changes_{i}.json"), record))
        .collect::<Result<Vec<_>>>()?;
    info!("Flockwork-P complete, {} records written", paths.len());
    Ok(paths)
}

/// Write the stationary group-size distribution and one configuration drawn from it.
#[instrument]
pub fn run_equilibrium(n: usize, p: f64, seed: u64, output_dir: &Path) -> Result<PathBuf> {
    let distribution = equilibrium_group_size_distribution(n, p)?;
    let configuration = equilibrium_configuration(n, p, seed)?;
    write_json(
        output_dir,
        "equilibrium.json",
        &json!({
            "N": n,
            "P": p,
            "seed": seed,
            "expected_group_sizes": distribution,
            "configuration": configuration,
        }),
    )
}

/// Run SIRS on `network` and write the observables to `sirs.json`.
#[instrument(skip(network, config), fields(encoding = network.encoding()))]
pub fn run_sirs(network: NetworkRecord, config: &SirsConfig, output_dir: &Path) -> Result<PathBuf> {
    let changes = network.into_edge_changes(config.verbose)?;
    let observables = simulate_sirs_on_network(ContactNetwork::Changing(&changes), config)?;
    write_json(output_dir, "sirs.json", &observables)
}

/// Write the network in the other encoding.
#[instrument(skip(network), fields(encoding = network.encoding()))]
pub fn run_convert(network: &NetworkRecord, verbose: bool, output_dir: &Path) -> Result<PathBuf> {
    let converted = network.convert(verbose)?;
    write_json(output_dir, &format!("{}.json", converted.encoding()), &converted)
}

/// Sample the network onto a regular grid and write the snapshots.
#[instrument(skip(network), fields(encoding = network.encoding()))]
pub fn run_sample(network: NetworkRecord, grid: GridSpec, verbose: bool, output_dir: &Path) -> Result<PathBuf> {
    let changes = network.into_edge_changes(verbose)?;
    let lists = sample_edge_changes(&changes, SamplingOptions { grid, verbose })?;
    write_json(output_dir, "sampled_edge_lists.json", &lists)
}

/// Extract the focal node's trajectory: binned when `grid` sets a resolution, intervals
/// otherwise.
#[instrument(skip(network), fields(encoding = network.encoding()))]
pub fn run_trajectory(
    network: &NetworkRecord,
    node: usize,
    grid: Option<GridSpec>,
    verbose: bool,
    output_dir: &Path,
) -> Result<PathBuf> {
    let filename = format!("trajectory_{node}.json");
    match (network, grid) {
        (NetworkRecord::Changes(changes), None) => {
            write_json(output_dir, &filename, &social_trajectory(changes, node, verbose)?)
        },
        (NetworkRecord::Lists(lists), None) => write_json(output_dir, &filename, &social_trajectory(lists, node, verbose)?),
        (NetworkRecord::Changes(changes), Some(grid)) => {
            let bins = binned_social_trajectory(changes, node, BinnedTrajectoryOptions { grid, verbose })?;
            write_json(output_dir, &filename, &bins)
        },
        (NetworkRecord::Lists(lists), Some(grid)) => {
            let bins = binned_social_trajectory(lists, node, BinnedTrajectoryOptions { grid, verbose })?;
            write_json(output_dir, &filename, &bins)
        },
    }
}

/// Write the verification report; a defective stream is logged, not an error.
#[instrument(skip(network), fields(encoding = network.encoding()))]
pub fn run_verify(network: &NetworkRecord, output_dir: &Path) -> Result<PathBuf> {
    let report = network.verify();
    if report.is_valid() {
        info!("{} record is valid", network.encoding());
    } else {
        warn!("{} record has {} defects", network.encoding(), report.defects.len());
    }
    write_json(output_dir, "verification.json", &report)
}
