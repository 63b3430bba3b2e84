//! Render command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cluster_roofline::config::{ClusterConfig, RoofConfig, SourceConfig};
use cluster_roofline::pipeline::{build_chart, render_chart};
use cluster_roofline::render::{GnuplotRenderer, Renderer, SvgRenderer, is_svg_path};
use cluster_roofline::{RenderOutcome, Style, TracingReporter};

#[derive(Args)]
pub struct RenderArgs {
    /// Configuration file
    #[arg(short, long, env = "ROOFLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Image file to write
    #[arg(short, long, env = "ROOFLINE_OUTPUT")]
    output: Option<PathBuf>,

    /// Directory for data files and the plot script
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Read `<cluster>.txt` state files from this directory
    #[arg(long, conflicts_with = "influx")]
    state_dir: Option<PathBuf>,

    /// InfluxDB address, e.g. http://localhost:8086
    #[arg(long, env = "ROOFLINE_INFLUX")]
    influx: Option<String>,

    /// InfluxDB database
    #[arg(long, default_value = "metrics")]
    database: String,

    /// Cluster to plot (repeatable, replaces the configured clusters)
    #[arg(long = "cluster")]
    clusters: Vec<String>,

    /// Peak memory bandwidth of a single roof (replaces the configured roofs)
    #[arg(long, requires = "peak_throughput")]
    peak_bandwidth: Option<f64>,

    /// Peak throughput of a single roof
    #[arg(long, requires = "peak_bandwidth")]
    peak_throughput: Option<f64>,

    /// Render in-process as SVG instead of running gnuplot
    #[arg(long)]
    svg: bool,

    /// gnuplot executable
    #[arg(long, default_value = "gnuplot")]
    gnuplot: String,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut config = super::load_config(args.config.as_ref())?;

    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }
    if let Some(dir) = args.state_dir {
        config.source = SourceConfig::StateDir { dir };
    }
    if let Some(address) = args.influx {
        config.source = SourceConfig::influx(address, args.database);
    }
    if !args.clusters.is_empty() {
        config.clusters = args.clusters.into_iter().map(ClusterConfig::new).collect();
    }
    if let (Some(bandwidth), Some(throughput)) = (args.peak_bandwidth, args.peak_throughput) {
        config.roofs = vec![RoofConfig {
            name: "Peak".to_string(),
            peak_memory_bandwidth: bandwidth,
            peak_throughput: throughput,
            style: Style::lines("red", 3.0),
        }];
    }

    if args.svg && !is_svg_path(&config.output) {
        config.output.set_extension("svg");
    }

    let reporter = TracingReporter;
    let source = config.source.build();
    let spec = build_chart(&config, source.as_ref(), &reporter)
        .context("Failed to build roofline chart")?;

    let renderer: Box<dyn Renderer> = if args.svg || is_svg_path(&config.output) {
        Box::new(SvgRenderer)
    } else {
        Box::new(GnuplotRenderer::new(&config.work_dir).with_program(args.gnuplot))
    };

    match render_chart(&spec, renderer.as_ref(), &reporter)? {
        RenderOutcome::Rendered(path) => println!("Wrote {}", path.display()),
        RenderOutcome::Failed(_) => {
            eprintln!(
                "No image written; data files and script remain in {}",
                config.work_dir.display()
            );
        }
    }

    Ok(())
}
