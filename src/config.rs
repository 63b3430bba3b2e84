//! Run configuration.
//!
//! Loaded from TOML. The default reproduces the reference deployment: two
//! Meggie roofs (SIMD and scalar peak) and the node sets of the Emmy, Woody
//! and Meggie clusters read from `./state`.
//!
//! ```toml
//! output = "roofline.png"
//! work_dir = "."
//! log_scale = "xy"
//!
//! [source]
//! kind = "influx"
//! address = "http://localhost:8086"
//! database = "metrics"
//!
//! [aggregation]
//! zero_bandwidth_epsilon = 1e-4
//! throughput_scale = 1e-3
//!
//! [[roofs]]
//! name = "Meggie - simd"
//! peak_memory_bandwidth = 100.0
//! peak_throughput = 1536.0
//! style = { kind = "lines", color = "red", line_width = 3.0 }
//!
//! [[clusters]]
//! name = "emmy"
//! title = "Emmy nodes"
//! style = { kind = "circles", color = "royalblue", fill = "solid 1.0", border = true }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chart::{AxisRange, ChartBuilder, LogScale, Style};
use crate::error::{Error, Result};
use crate::roof::XBounds;
use crate::sample::AggregationConfig;
use crate::source::{CounterSource, InfluxSource, StateFileSource};

/// Complete configuration of one chart-generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RooflineConfig {
    /// Image file to produce.
    pub output: PathBuf,
    /// Directory for intermediate data files and the plot script.
    pub work_dir: PathBuf,
    /// Chart title. Defaults to "last updated: <local time>".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub log_scale: LogScale,
    pub size: (u32, u32),
    /// Circle marker radius as a fraction of the plot width.
    pub circle_radius: f64,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    /// Intensity range every roof spans.
    pub roof_bounds: XBounds,
    pub aggregation: AggregationConfig,
    pub source: SourceConfig,
    pub roofs: Vec<RoofConfig>,
    pub clusters: Vec<ClusterConfig>,
}

/// Where raw counters come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// `<dir>/<cluster>.txt` state files.
    StateDir {
        dir: PathBuf,
    },
    /// InfluxDB v1 HTTP endpoint.
    Influx {
        address: String,
        database: String,
        #[serde(default = "default_throughput_measurement")]
        throughput_measurement: String,
        #[serde(default = "default_bandwidth_measurement")]
        bandwidth_measurement: String,
        #[serde(default = "default_host_tag")]
        host_tag: String,
        /// Look-back window for the latest sample (InfluxQL duration).
        #[serde(default = "default_window")]
        window: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_throughput_measurement() -> String {
    "flops_any".to_string()
}

fn default_bandwidth_measurement() -> String {
    "mem_bw".to_string()
}

fn default_host_tag() -> String {
    "host".to_string()
}

fn default_window() -> String {
    "5m".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::StateDir {
            dir: PathBuf::from("./state"),
        }
    }
}

impl SourceConfig {
    /// InfluxDB source with default measurement names.
    #[must_use]
    pub fn influx(address: impl Into<String>, database: impl Into<String>) -> Self {
        Self::Influx {
            address: address.into(),
            database: database.into(),
            throughput_measurement: default_throughput_measurement(),
            bandwidth_measurement: default_bandwidth_measurement(),
            host_tag: default_host_tag(),
            window: default_window(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Build the configured counter source.
    #[must_use]
    pub fn build(&self) -> Box<dyn CounterSource> {
        match self {
            Self::StateDir { dir } => Box::new(StateFileSource::new(dir)),
            Self::Influx {
                address,
                database,
                throughput_measurement,
                bandwidth_measurement,
                host_tag,
                window,
                timeout_secs,
            } => Box::new(
                InfluxSource::new(address, database)
                    .with_measurements(throughput_measurement, bandwidth_measurement)
                    .with_host_tag(host_tag)
                    .with_window(window)
                    .with_timeout(Duration::from_secs(*timeout_secs)),
            ),
        }
    }
}

/// One roof curve on the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoofConfig {
    /// Legend label.
    pub name: String,
    pub peak_memory_bandwidth: f64,
    pub peak_throughput: f64,
    #[serde(default)]
    pub style: Style,
}

/// Node set of one cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster selector passed to the counter source.
    pub name: String,
    /// Legend label. Defaults to the cluster name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_node_style")]
    pub style: Style,
}

fn default_node_style() -> Style {
    Style::circles("royalblue")
}

impl ClusterConfig {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            style: default_node_style(),
        }
    }

    /// Legend label of the node series.
    #[must_use]
    pub fn legend(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

impl Default for RooflineConfig {
    fn default() -> Self {
        let cluster = |name: &str, title: &str, color: &str| ClusterConfig {
            name: name.to_string(),
            title: Some(title.to_string()),
            style: Style::circles(color),
        };

        Self {
            output: PathBuf::from("roofline.png"),
            work_dir: PathBuf::from("."),
            title: None,
            x_label: "Intensity [flops/byte]".to_string(),
            y_label: "Performance [MFlops/s]".to_string(),
            log_scale: LogScale::XY,
            size: (1400, 768),
            circle_radius: 0.008,
            x_range: AxisRange::new(0.009, 1000.0),
            y_range: AxisRange::new(0.1, 1600.0),
            roof_bounds: XBounds::default(),
            aggregation: AggregationConfig::default(),
            source: SourceConfig::default(),
            roofs: vec![
                RoofConfig {
                    name: "Meggie - simd".to_string(),
                    peak_memory_bandwidth: 100.0,
                    peak_throughput: 1536.0,
                    style: Style::lines("red", 3.0),
                },
                RoofConfig {
                    name: "Meggie - scalar".to_string(),
                    peak_memory_bandwidth: 100.0,
                    peak_throughput: 44.0,
                    style: Style::lines("blue", 3.0),
                },
            ],
            clusters: vec![
                cluster("emmy", "Emmy nodes", "royalblue"),
                cluster("woody", "Woody nodes", "goldenrod"),
                cluster("meggie", "Meggie nodes", "purple"),
            ],
        }
    }
}

impl RooflineConfig {
    /// Read a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check ranges, series names and that the chart is not empty.
    pub fn validate(&self) -> Result<()> {
        if !self.x_range.is_valid(self.log_scale.x) {
            return Err(Error::Config(format!(
                "invalid x range {}..{} (log scale: {})",
                self.x_range.min, self.x_range.max, self.log_scale.x
            )));
        }
        if !self.y_range.is_valid(self.log_scale.y) {
            return Err(Error::Config(format!(
                "invalid y range {}..{} (log scale: {})",
                self.y_range.min, self.y_range.max, self.log_scale.y
            )));
        }
        if !(self.circle_radius.is_finite() && self.circle_radius > 0.0) {
            return Err(Error::Config(format!("invalid circle radius {}", self.circle_radius)));
        }
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(Error::Config("image size must be non-zero".to_string()));
        }
        let agg = &self.aggregation;
        if !(agg.zero_bandwidth_epsilon.is_finite() && agg.zero_bandwidth_epsilon > 0.0) {
            return Err(Error::Config(format!(
                "zero_bandwidth_epsilon must be positive, got {}",
                agg.zero_bandwidth_epsilon
            )));
        }
        if !(agg.throughput_scale.is_finite() && agg.throughput_scale > 0.0) {
            return Err(Error::Config(format!(
                "throughput_scale must be positive, got {}",
                agg.throughput_scale
            )));
        }

        if self.roofs.is_empty() && self.clusters.is_empty() {
            return Err(Error::Config("no roofs or clusters configured".to_string()));
        }

        let mut names = HashSet::new();
        let legends = self
            .roofs
            .iter()
            .map(|r| r.name.as_str())
            .chain(self.clusters.iter().map(|c| c.legend()));
        for name in legends {
            if !names.insert(name) {
                return Err(Error::Config(format!("series name '{}' is used twice", name)));
            }
        }

        Ok(())
    }

    /// Chart title, falling back to the current local time.
    #[must_use]
    pub fn resolved_title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => format!(
                "last updated: {}",
                chrono::Local::now().format("%a %b %-d %H:%M %Y")
            ),
        }
    }

    /// Start a chart carrying this configuration's global attributes.
    #[must_use]
    pub fn chart_builder(&self) -> ChartBuilder {
        ChartBuilder::new(&self.output)
            .with_title(self.resolved_title())
            .with_x_label(&self.x_label)
            .with_y_label(&self.y_label)
            .with_x_range(self.x_range)
            .with_y_range(self.y_range)
            .with_log_scale(self.log_scale)
            .with_size(self.size.0, self.size.1)
            .with_circle_radius(self.circle_radius)
    }
}
