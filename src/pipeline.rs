//! End-to-end chart generation.
//!
//! [`build_chart`] turns a configuration plus a counter source into a
//! finalized [`ChartSpec`]; [`render_chart`] hands it to a renderer.
//! Roof curves are added first, then one node series per cluster, so
//! roofs sit underneath the measured points in draw order.

use crate::chart::ChartSpec;
use crate::config::RooflineConfig;
use crate::error::{Error, Result};
use crate::render::{RenderOutcome, Renderer};
use crate::report::Reporter;
use crate::roof::{PeakParameters, compute_roof};
use crate::sample::aggregate;
use crate::source::CounterSource;

/// Build the chart described by `config`.
///
/// A roof with invalid peak parameters is reported and left out; the rest
/// of the chart is still built. An unreachable counter source or a
/// duplicate series name aborts the run.
pub fn build_chart(
    config: &RooflineConfig,
    source: &dyn CounterSource,
    reporter: &dyn Reporter,
) -> Result<ChartSpec> {
    config.validate()?;
    let mut builder = config.chart_builder();

    for roof in &config.roofs {
        let params = PeakParameters::new(roof.peak_memory_bandwidth, roof.peak_throughput);
        match params {
            Ok(params) => {
                let curve = compute_roof(params, config.roof_bounds);
                if !curve.is_monotonic() {
                    reporter.warn(&format!(
                        "Roof '{}': peak throughput {} is below the bandwidth cutoff",
                        roof.name, roof.peak_throughput
                    ));
                }
                tracing::debug!("Roof {}: knee at {:.3} flops/byte", roof.name, curve.knee());
                builder.add_series(&roof.name, curve.into_points(), roof.style.clone())?;
            }
            Err(err @ Error::InvalidParameter { .. }) => {
                reporter.error(&format!("Skipping roof '{}': {}", roof.name, err));
            }
            Err(err) => return Err(err),
        }
    }

    for cluster in &config.clusters {
        let samples = source.fetch(&cluster.name, reporter)?;
        let points = aggregate(&samples, &config.aggregation);
        tracing::info!(
            "Cluster {}: {} nodes from {}",
            cluster.name,
            points.len(),
            source.describe()
        );
        builder.add_series(cluster.legend(), points, cluster.style.clone())?;
    }

    Ok(builder.finalize())
}

/// Render a finalized chart.
///
/// A renderer invocation failure is reported as a warning and returned as
/// [`RenderOutcome::Failed`]; other errors (e.g. writing data files) are
/// propagated.
pub fn render_chart(
    spec: &ChartSpec,
    renderer: &dyn Renderer,
    reporter: &dyn Reporter,
) -> Result<RenderOutcome> {
    match renderer.render(spec, reporter) {
        Ok(()) => Ok(RenderOutcome::Rendered(spec.output_path().to_path_buf())),
        Err(Error::RenderInvocation(reason)) => {
            reporter.warn(&format!("Chart was not rendered: {}", reason));
            Ok(RenderOutcome::Failed(reason))
        }
        Err(err) => Err(err),
    }
}
