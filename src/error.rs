//! Error types for roofline chart generation.

use thiserror::Error;

/// Result type alias for roofline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or rendering a roofline chart.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A peak parameter or curve bound was not a positive, finite number.
    #[error("Invalid parameter {name}: {value} ({reason})")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Value that was rejected.
        value: f64,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// A series with this name is already part of the chart.
    #[error("Duplicate series name: {0}")]
    DuplicateSeriesName(String),

    /// A series with this data reference is already part of the chart.
    #[error("Duplicate data reference: {0}")]
    DuplicateDataRef(String),

    /// A counter field could not be parsed. Recovered by substituting 0.0.
    #[error("Malformed sample for node {node}: {field} = {raw:?}, using 0.0")]
    MalformedSample {
        /// Node identifier of the record.
        node: String,
        /// Counter field that failed to parse.
        field: &'static str,
        /// Raw text of the field.
        raw: String,
    },

    /// The counter source could not be reached or opened.
    #[error("Data source unavailable ({source_name}): {reason}")]
    DataSourceUnavailable {
        /// Description of the source (path or address).
        source_name: String,
        /// Reason for the failure.
        reason: String,
    },

    /// The external renderer could not be launched or exited non-zero.
    #[error("Render invocation failed: {0}")]
    RenderInvocation(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
