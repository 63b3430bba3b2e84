//! Node aggregation command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cluster_roofline::config::SourceConfig;
use cluster_roofline::{TracingReporter, aggregate};

pub fn run(cluster: &str, config: Option<PathBuf>, state_dir: Option<PathBuf>, json: bool) -> Result<()> {
    let mut config = super::load_config(config.as_ref())?;
    if let Some(dir) = state_dir {
        config.source = SourceConfig::StateDir { dir };
    }

    let source = config.source.build();
    let samples = source
        .fetch(cluster, &TracingReporter)
        .with_context(|| format!("Failed to read counters of cluster {}", cluster))?;

    let mut points = aggregate(&samples, &config.aggregation);
    points.sort_by(|a, b| a.label.cmp(&b.label));

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!("{} nodes in {} ({})", points.len(), cluster, source.describe());
    println!();
    println!("{:<16} {:>14} {:>14}", "Node", "Intensity", "Throughput");
    println!("{:-<46}", "");
    for p in &points {
        println!(
            "{:<16} {:>14.4} {:>14.4}",
            p.label.as_deref().unwrap_or("-"),
            p.x,
            p.y
        );
    }

    Ok(())
}
