#![warn(clippy::nursery, clippy::pedantic, missing_docs)]
//! `tngen` command line interface
//!
//! Simulates Flockwork-P and SIRS runs from YAML or JSON configuration files and converts,
//! samples, verifies or analyzes temporal network records. Every invocation writes its results
//! into a fresh timestamped directory. See `tngen --help` for more information.

use std::path::{
    Path,
    PathBuf,
};

use anyhow::Result;
use clap::{
    Args,
    Parser,
    Subcommand,
};
use tn_core::GridSpec;
use tn_gen::simulation::{
    run_convert,
    run_equilibrium,
    run_flockwork,
    run_sample,
    run_sirs,
    run_trajectory,
    run_verify,
};
use tn_gen::utils::{
    create_timestamped_output_dir,
    read_structured,
};
use tn_gen::{
    FlockworkRun,
    NetworkRecord,
    SirsConfig,
};
use tracing::info;

/// tngen command-line interface to simulate and analyze temporal networks
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Logging verbosity level (`trace`, `debug`, `info`, `warn`, `error`).
    #[arg(short, long, default_value = "info", global = true)]
    verbosity: String,

    /// Directory under which the timestamped run directory is created.
    #[arg(short, long, default_value = "runs", global = true)]
    output_root: PathBuf,

    /// Log per-event diagnostics (at debug level).
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Simulate Flockwork-P replicates from a run configuration.
    Flockwork {
        /// YAML or JSON Flockwork-P run configuration.
        config: PathBuf,
    },
    /// Write the stationary group-size distribution and a configuration drawn from it.
    Equilibrium {
        /// Number of nodes.
        #[arg(short = 'N', long = "nodes")]
        n: usize,
        /// Reconnection probability.
        #[arg(short = 'P', long = "probability")]
        p: f64,
        /// Seed of the configuration draw.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
    },
    /// Run SIRS on a temporal network.
    Sirs {
        /// Network record (`edge_changes` or `edge_lists`).
        network: PathBuf,
        /// YAML or JSON SIRS configuration.
        config: PathBuf,
    },
    /// Convert between `edge_changes` and `edge_lists`.
    Convert {
        /// Network record (`edge_changes` or `edge_lists`).
        network: PathBuf,
    },
    /// Sample a network onto a regular time grid.
    Sample {
        /// Network record (`edge_changes` or `edge_lists`).
        network: PathBuf,
        #[command(flatten)]
        grid: GridArgs,
    },
    /// Extract a node's social trajectory; binned when a grid is given.
    Trajectory {
        /// Network record (`edge_changes` or `edge_lists`).
        network: PathBuf,
        /// Focal node.
        node: usize,
        #[command(flatten)]
        grid: GridArgs,
    },
    /// Report every defect of a network record.
    Verify {
        /// Network record (`edge_changes` or `edge_lists`).
        network: PathBuf,
    },
}

/// Time grid resolution; set exactly one.
#[derive(Args)]
struct GridArgs {
    /// Bin width.
    #[arg(long, default_value_t = 0.0)]
    dt: f64,
    /// Number of bins.
    #[arg(long = "steps", default_value_t = 0)]
    n_time_steps: usize,
}

impl GridArgs {
    const fn spec(&self) -> GridSpec {
        GridSpec { dt: self.dt, n_time_steps: self.n_time_steps }
    }

    fn is_set(&self) -> bool {
        self.dt != 0.0 || self.n_time_steps != 0
    }
}

fn load_network(path: &Path) -> Result<NetworkRecord> {
    let record: NetworkRecord = read_structured(path)?;
    info!("Loaded {} record from {}", record.encoding(), path.display());
    Ok(record)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Conform to crate-standard logging.
    tn_core::logging::setup(&args.verbosity);
    let output_dir = create_timestamped_output_dir(&args.output_root)?;
    info!("Writing results to {}", output_dir.display());

    let written = match args.command {
        Command::Flockwork { config } => {
            let mut run: FlockworkRun = read_structured(&config)?;
            run.process.verbose |= args.verbose;
            run_flockwork(&run, &output_dir)?
        },
        Command::Equilibrium { n, p, seed } => vec![run_equilibrium(n, p, seed, &output_dir)?],
        Command::Sirs { network, config } => {
            let mut sirs: SirsConfig = read_structured(&config)?;
            sirs.verbose |= args.verbose;
            vec![run_sirs(load_network(&network)?, &sirs, &output_dir)?]
        },
        Command::Convert { network } => vec![run_convert(&load_network(&network)?, args.verbose, &output_dir)?],
        Command::Sample { network, grid } => {
            vec![run_sample(load_network(&network)?, grid.spec(), args.verbose, &output_dir)?]
        },
        Command::Trajectory { network, node, grid } => {
            let grid = grid.is_set().then(|| grid.spec());
            vec![run_trajectory(&load_network(&network)?, node, grid, args.verbose, &output_dir)?]
        },
        Command::Verify { network } => vec![run_verify(&load_network(&network)?, &output_dir)?],
    };

    for path in written {
        info!("Wrote {}", path.display());
    }
    Ok(())
}
