//! Per-node counter samples and their conversion to chart coordinates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::chart::CoordinatePoint;
use crate::error::Error;
use crate::report::Reporter;

/// Most recent measurement of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSample {
    /// Node identifier (host name).
    pub id: String,
    /// Achieved throughput in raw counter units (MFlop/s).
    pub throughput: f64,
    /// Achieved memory bandwidth in raw counter units (MByte/s).
    pub memory_bandwidth: f64,
}

impl NodeSample {
    #[must_use]
    pub fn new(id: impl Into<String>, throughput: f64, memory_bandwidth: f64) -> Self {
        Self {
            id: id.into(),
            throughput,
            memory_bandwidth,
        }
    }
}

/// Samples keyed by node identifier. Iteration order is unspecified.
pub type NodeSamples = HashMap<String, NodeSample>;

/// Insert a sample under its own id, replacing any earlier sample.
pub fn insert_sample(samples: &mut NodeSamples, sample: NodeSample) {
    samples.insert(sample.id.clone(), sample);
}

/// Numeric conventions for turning counters into chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Bandwidth substituted for nodes reporting exactly zero, so their
    /// intensity is a large finite number instead of a division error.
    pub zero_bandwidth_epsilon: f64,
    /// Multiplier from raw throughput units to the chart's y-axis unit.
    /// The default 0.001 divides raw counters by a thousand, which is the
    /// unit the default y-axis label assumes.
    pub throughput_scale: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            zero_bandwidth_epsilon: 1e-4,
            throughput_scale: 1e-3,
        }
    }
}

/// Convert samples into (intensity, throughput) points, one per sample.
///
/// The output has no defined order. Each point is labeled with its node id.
#[must_use]
pub fn aggregate(samples: &NodeSamples, config: &AggregationConfig) -> Vec<CoordinatePoint> {
    samples
        .values()
        .map(|s| {
            let bandwidth = if s.memory_bandwidth == 0.0 {
                config.zero_bandwidth_epsilon
            } else {
                s.memory_bandwidth
            };
            CoordinatePoint::labeled(
                s.throughput / bandwidth,
                s.throughput * config.throughput_scale,
                s.id.clone(),
            )
        })
        .collect()
}

/// Parse one counter field, falling back to 0.0.
///
/// Unparsable, non-finite and negative values are reported as a
/// [`Error::MalformedSample`] warning and replaced by 0.0 so the record
/// still makes it onto the chart.
pub fn parse_counter(raw: &str, node: &str, field: &'static str, reporter: &dyn Reporter) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            let err = Error::MalformedSample {
                node: node.to_string(),
                field,
                raw: raw.to_string(),
            };
            reporter.warn(&err.to_string());
            0.0
        }
    }
}
