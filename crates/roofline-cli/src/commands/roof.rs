//! Roof curve command.

use anyhow::Result;
use cluster_roofline::{PeakParameters, XBounds, compute_roof};

pub fn run(peak_bandwidth: f64, peak_throughput: f64, x_min: f64, x_max: f64, json: bool) -> Result<()> {
    let params = PeakParameters::new(peak_bandwidth, peak_throughput)?;
    let curve = compute_roof(params, XBounds::new(x_min, x_max)?);
    if !curve.is_monotonic() {
        eprintln!("Warning: peak throughput is below the bandwidth cutoff; the ramp starts above the plateau");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(curve.points())?);
        return Ok(());
    }

    println!("Knee at {:.4} flops/byte", curve.knee());
    println!();
    println!("{:>14} {:>14}", "Intensity", "Throughput");
    println!("{:-<29}", "");
    for p in curve.points() {
        println!("{:>14.4} {:>14.4}", p.x, p.y);
    }

    Ok(())
}
