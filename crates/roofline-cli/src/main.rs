//! cluster-roofline CLI - roofline charts for compute clusters

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

/// Roofline chart generator for compute clusters.
#[derive(Parser)]
#[command(name = "cluster-roofline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch node counters and render the roofline chart
    Render(commands::render::RenderArgs),

    /// Print the roof curve for a pair of peak parameters
    Roof {
        /// Peak memory bandwidth
        #[arg(long)]
        peak_bandwidth: f64,

        /// Peak throughput
        #[arg(long)]
        peak_throughput: f64,

        /// Intensity where the roof starts
        #[arg(long, default_value_t = 0.01)]
        x_min: f64,

        /// Intensity where the roof ends
        #[arg(long, default_value_t = 1000.0)]
        x_max: f64,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the aggregated points of one cluster
    Nodes {
        /// Cluster to read
        #[arg(short, long)]
        cluster: String,

        /// Configuration file (source and aggregation settings)
        #[arg(long, env = "ROOFLINE_CONFIG")]
        config: Option<PathBuf>,

        /// Read state files from this directory
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the default configuration as TOML
    Config,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Roof { peak_bandwidth, peak_throughput, x_min, x_max, json } => {
            commands::roof::run(peak_bandwidth, peak_throughput, x_min, x_max, json)
        }
        Commands::Nodes { cluster, config, state_dir, json } => {
            commands::nodes::run(&cluster, config, state_dir, json)
        }
        Commands::Config => commands::config::run(),
    }
}
