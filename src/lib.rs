//! # cluster-roofline
//!
//! Roofline charts for compute clusters.
//!
//! Each compute node becomes one point: its operational intensity (flops
//! per byte of memory traffic) against its achieved throughput. One or more
//! roofs, derived from a machine's peak memory bandwidth and peak compute
//! throughput, show whether a node is memory-bound or compute-bound.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cluster_roofline::{RooflineConfig, TracingReporter, pipeline};
//! use cluster_roofline::render::GnuplotRenderer;
//!
//! let config = RooflineConfig::load("roofline.toml")?;
//! let source = config.source.build();
//!
//! let spec = pipeline::build_chart(&config, source.as_ref(), &TracingReporter)?;
//! let renderer = GnuplotRenderer::new(&config.work_dir);
//! pipeline::render_chart(&spec, &renderer, &TracingReporter)?;
//! ```
//!
//! ## Modules
//!
//! - [`roof`]: Roof curves from peak bandwidth and throughput
//! - [`sample`]: Per-node counter samples and their aggregation into points
//! - [`chart`]: Chart description model (series, axes, styles)
//! - [`source`]: Counter sources (state files, InfluxDB)
//! - [`render`]: Renderers (gnuplot, SVG)
//! - [`config`]: TOML run configuration
//! - [`pipeline`]: End-to-end chart generation
//! - [`report`]: Reporting of recovered problems
//! - [`error`]: Error types for the library

pub mod chart;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod roof;
pub mod sample;
pub mod source;

// Re-export commonly used types
pub use chart::{ChartBuilder, ChartSpec, CoordinatePoint, Series, Style};
pub use config::RooflineConfig;
pub use error::{Error, Result};
pub use render::{RenderOutcome, Renderer};
pub use report::{Reporter, TracingReporter};
pub use roof::{PeakParameters, RoofCurve, XBounds, compute_roof};
pub use sample::{AggregationConfig, NodeSample, NodeSamples, aggregate};
pub use source::CounterSource;
