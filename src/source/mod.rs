//! Raw counter sources.
//!
//! Every source yields the same normalized [`NodeSamples`] map, so the rest
//! of the pipeline does not care whether counters came from a state file
//! or a time-series database.
//!
//! - [`StateFileSource`]: `<dir>/<cluster>.txt`, one `id throughput bandwidth` line per node
//! - [`InfluxSource`]: latest sample per host from an InfluxDB v1 `/query` endpoint
//! - [`MemorySource`]: fixed in-memory samples

mod influx;
mod state_file;

use std::collections::HashMap;

pub use influx::InfluxSource;
pub use state_file::StateFileSource;

use crate::error::{Error, Result};
use crate::report::Reporter;
use crate::sample::NodeSamples;

/// Supplies the most recent counters of every node in a cluster.
pub trait CounterSource {
    /// Fetch samples for one cluster.
    ///
    /// Fails with [`Error::DataSourceUnavailable`] when the source cannot
    /// be reached. Malformed fields are recovered and reported instead.
    fn fetch(&self, cluster: &str, reporter: &dyn Reporter) -> Result<NodeSamples>;

    /// Human-readable description used in log messages.
    fn describe(&self) -> String;
}

/// Samples held in memory, keyed by cluster name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    clusters: HashMap<String, NodeSamples>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the samples of a cluster.
    #[must_use]
    pub fn with_cluster(mut self, cluster: impl Into<String>, samples: NodeSamples) -> Self {
        self.clusters.insert(cluster.into(), samples);
        self
    }
}

impl CounterSource for MemorySource {
    fn fetch(&self, cluster: &str, _reporter: &dyn Reporter) -> Result<NodeSamples> {
        self.clusters
            .get(cluster)
            .cloned()
            .ok_or_else(|| Error::DataSourceUnavailable {
                source_name: self.describe(),
                reason: format!("unknown cluster {cluster}"),
            })
    }

    fn describe(&self) -> String {
        "in-memory samples".to_string()
    }
}
