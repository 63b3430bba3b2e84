//! Flat-file counter source.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::report::Reporter;
use crate::sample::{NodeSample, NodeSamples, insert_sample, parse_counter};
use crate::source::CounterSource;

/// Reads `<dir>/<cluster>.txt`.
///
/// Each line is `id throughput bandwidth`, whitespace-separated. Lines with
/// fewer than three fields are skipped; extra fields are ignored. When a
/// node appears twice the later line wins.
#[derive(Debug, Clone)]
pub struct StateFileSource {
    dir: PathBuf,
}

impl StateFileSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the state file for a cluster.
    #[must_use]
    pub fn path_for(&self, cluster: &str) -> PathBuf {
        self.dir.join(format!("{cluster}.txt"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl CounterSource for StateFileSource {
    fn fetch(&self, cluster: &str, reporter: &dyn Reporter) -> Result<NodeSamples> {
        let path = self.path_for(cluster);
        let bytes = fs::read(&path).map_err(|e| Error::DataSourceUnavailable {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;

        // Invalid UTF-8 becomes U+FFFD and fails the counter parse for that field only.
        let content = String::from_utf8_lossy(&bytes);
        let samples = parse_state(&content, reporter);
        tracing::debug!("Read {} nodes from {}", samples.len(), path.display());
        Ok(samples)
    }

    fn describe(&self) -> String {
        format!("state files in {}", self.dir.display())
    }
}

/// Parse state file content into samples.
pub(crate) fn parse_state(content: &str, reporter: &dyn Reporter) -> NodeSamples {
    let mut samples = NodeSamples::new();

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            continue;
        }

        let id = fields[0];
        let throughput = parse_counter(fields[1], id, "throughput", reporter);
        let memory_bandwidth = parse_counter(fields[2], id, "memory_bandwidth", reporter);
        insert_sample(&mut samples, NodeSample::new(id, throughput, memory_bandwidth));
    }

    samples
}
