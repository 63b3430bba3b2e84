//! InfluxDB counter source.
//!
//! Fetches the latest throughput and memory-bandwidth sample of every host
//! in a cluster with a single `/query` request holding two statements, then
//! joins the two result sets per host into one [`NodeSample`] each.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::report::Reporter;
use crate::sample::{NodeSample, NodeSamples, insert_sample, parse_counter};
use crate::source::CounterSource;

/// Latest per-host counters from an InfluxDB v1 HTTP endpoint.
#[derive(Debug, Clone)]
pub struct InfluxSource {
    address: String,
    database: String,
    throughput_measurement: String,
    bandwidth_measurement: String,
    host_tag: String,
    window: String,
    timeout: Duration,
}

impl InfluxSource {
    /// Create a source for `address` (e.g. `http://localhost:8086`) and database.
    #[must_use]
    pub fn new(address: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            database: database.into(),
            throughput_measurement: "flops_any".to_string(),
            bandwidth_measurement: "mem_bw".to_string(),
            host_tag: "host".to_string(),
            window: "5m".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the measurements holding throughput and bandwidth counters.
    #[must_use]
    pub fn with_measurements(mut self, throughput: impl Into<String>, bandwidth: impl Into<String>) -> Self {
        self.throughput_measurement = throughput.into();
        self.bandwidth_measurement = bandwidth.into();
        self
    }

    /// Sets the tag that identifies a node.
    #[must_use]
    pub fn with_host_tag(mut self, tag: impl Into<String>) -> Self {
        self.host_tag = tag.into();
        self
    }

    /// Sets how far back to look for the latest sample (InfluxQL duration).
    #[must_use]
    pub fn with_window(mut self, window: impl Into<String>) -> Self {
        self.window = window.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the two-statement InfluxQL query for a cluster.
    #[must_use]
    pub fn query_for(&self, cluster: &str) -> String {
        let cluster = cluster.replace('\\', "\\\\").replace('\'', "\\'");
        [&self.throughput_measurement, &self.bandwidth_measurement]
            .iter()
            .map(|m| {
                format!(
                    "SELECT last(value) FROM \"{}\" WHERE cluster = '{}' AND time > now() - {} GROUP BY \"{}\"",
                    m, cluster, self.window, self.host_tag
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn unavailable(&self, reason: impl Into<String>) -> Error {
        Error::DataSourceUnavailable {
            source_name: self.describe(),
            reason: reason.into(),
        }
    }
}

impl CounterSource for InfluxSource {
    fn fetch(&self, cluster: &str, reporter: &dyn Reporter) -> Result<NodeSamples> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| self.unavailable(format!("failed to create HTTP client: {e}")))?;

        let url = format!("{}/query", self.address.trim_end_matches('/'));
        let query = self.query_for(cluster);
        tracing::debug!("Querying {}: {}", url, query);

        let response = client
            .get(&url)
            .query(&[("db", self.database.as_str()), ("q", query.as_str())])
            .send()
            .map_err(|e| self.unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .map_err(|e| self.unavailable(format!("failed to read response body: {e}")))?;

        decode_response(&body, &self.host_tag, reporter).map_err(|reason| self.unavailable(reason))
    }

    fn describe(&self) -> String {
        format!("influxdb {} (db {})", self.address, self.database)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    statement_id: Option<usize>,
    #[serde(default)]
    series: Vec<ResultSeries>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResultSeries {
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Last value of each host in one statement result.
type HostValues = HashMap<String, serde_json::Value>;

/// Decode a `/query` response whose statement 0 holds throughput and
/// statement 1 holds memory bandwidth.
fn decode_response(body: &str, host_tag: &str, reporter: &dyn Reporter) -> std::result::Result<NodeSamples, String> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| format!("undecodable response: {e}"))?;
    if let Some(err) = response.error {
        return Err(err);
    }

    let mut statements: [HostValues; 2] = [HostValues::new(), HostValues::new()];
    for (pos, result) in response.results.into_iter().enumerate() {
        if let Some(err) = result.error {
            return Err(format!("statement {pos} failed: {err}"));
        }
        let idx = result.statement_id.unwrap_or(pos);
        let Some(values) = statements.get_mut(idx) else {
            continue;
        };
        for series in result.series {
            let Some(host) = series.tags.get(host_tag) else {
                continue;
            };
            if let Some(value) = series.values.first().and_then(|row| row.last()) {
                values.insert(host.clone(), value.clone());
            }
        }
    }

    let [throughput, bandwidth] = statements;
    let hosts: BTreeSet<&String> = throughput.keys().chain(bandwidth.keys()).collect();

    let mut samples = NodeSamples::new();
    for host in hosts {
        let tp = counter_value(throughput.get(host), host, "throughput", reporter);
        let bw = counter_value(bandwidth.get(host), host, "memory_bandwidth", reporter);
        insert_sample(&mut samples, NodeSample::new(host.as_str(), tp, bw));
    }
    Ok(samples)
}

fn counter_value(value: Option<&serde_json::Value>, host: &str, field: &'static str, reporter: &dyn Reporter) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => parse_counter(&n.to_string(), host, field, reporter),
        Some(serde_json::Value::String(s)) => parse_counter(s, host, field, reporter),
        Some(other) => parse_counter(&other.to_string(), host, field, reporter),
        None => parse_counter("", host, field, reporter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Level, MemoryReporter};

    const BODY: &str = r#"{
  "results": [
    {
      "statement_id": 0,
      "series": [
        {"name": "flops_any", "tags": {"host": "m0101"}, "columns": ["time", "last"], "values": [["2024-01-01T00:00:00Z", 1200.5]]},
        {"name": "flops_any", "tags": {"host": "m0102"}, "columns": ["time", "last"], "values": [["2024-01-01T00:00:00Z", 30]]}
      ]
    },
    {
      "statement_id": 1,
      "series": [
        {"name": "mem_bw", "tags": {"host": "m0101"}, "columns": ["time", "last"], "values": [["2024-01-01T00:00:00Z", 40.0]]},
        {"name": "mem_bw", "tags": {"host": "m0103"}, "columns": ["time", "last"], "values": [["2024-01-01T00:00:00Z", null]]}
      ]
    }
  ]
}"#;

    #[test]
    fn test_decode_joins_statements_per_host() {
        let reporter = MemoryReporter::new();
        let samples = decode_response(BODY, "host", &reporter).unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples["m0101"], NodeSample::new("m0101", 1200.5, 40.0));
        assert_eq!(samples["m0102"].throughput, 30.0);
        assert_eq!(samples["m0102"].memory_bandwidth, 0.0);
        assert_eq!(samples["m0103"], NodeSample::new("m0103", 0.0, 0.0));

        // m0102 bandwidth missing, m0103 throughput missing and bandwidth null
        assert_eq!(reporter.messages(Level::Warn).len(), 3);
    }

    #[test]
    fn test_decode_statement_error() {
        let reporter = MemoryReporter::new();
        let body = r#"{"results": [{"statement_id": 0, "error": "database not found: metrics"}]}"#;
        let err = decode_response(body, "host", &reporter).unwrap_err();
        assert!(err.contains("database not found"));
    }

    #[test]
    fn test_decode_garbage() {
        let reporter = MemoryReporter::new();
        assert!(decode_response("<html>", "host", &reporter).is_err());
    }

    #[test]
    fn test_decode_empty_cluster() {
        let reporter = MemoryReporter::new();
        let body = r#"{"results": [{"statement_id": 0}, {"statement_id": 1}]}"#;
        assert!(decode_response(body, "host", &reporter).unwrap().is_empty());
    }

    #[test]
    fn test_query_escapes_cluster() {
        let source = InfluxSource::new("http://localhost:8086", "metrics").with_window("10m");
        let q = source.query_for("em'my");
        assert!(q.contains("cluster = 'em\\'my'"));
        assert!(q.contains("FROM \"flops_any\""));
        assert!(q.contains("FROM \"mem_bw\""));
        assert!(q.contains("now() - 10m"));
        assert_eq!(q.matches("SELECT").count(), 2);
    }

    #[test]
    fn test_unreachable_server() {
        let source = InfluxSource::new("http://127.0.0.1:9", "metrics").with_timeout(Duration::from_millis(500));
        let reporter = MemoryReporter::new();
        let err = source.fetch("emmy", &reporter).unwrap_err();
        assert!(matches!(err, Error::DataSourceUnavailable { .. }));
    }
}
