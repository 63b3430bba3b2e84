//! Chart description model.
//!
//! A [`ChartBuilder`] collects global attributes and named series as data
//! becomes available. [`ChartBuilder::finalize`] consumes it and returns a
//! read-only [`ChartSpec`] that is handed to a renderer exactly once.
//!
//! ## Example
//!
//! ```rust
//! use cluster_roofline::chart::{ChartBuilder, CoordinatePoint, Style};
//!
//! let mut builder = ChartBuilder::new("roofline.png").with_title("Roofline");
//! builder
//!     .add_series(
//!         "Peak",
//!         vec![CoordinatePoint::new(0.01, 1.0), CoordinatePoint::new(10.0, 100.0)],
//!         Style::lines("red", 3.0),
//!     )
//!     .unwrap();
//!
//! let spec = builder.finalize();
//! assert_eq!(spec.series().len(), 1);
//! ```

pub mod style;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use style::{Fill, MarkKind, Style};

/// One point on the chart: operational intensity against throughput.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePoint {
    /// Operational intensity (flops/byte).
    pub x: f64,
    /// Throughput in display units.
    pub y: f64,
    /// Optional label (node id for measured points).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl CoordinatePoint {
    /// Create an unlabeled point.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, label: None }
    }

    /// Create a labeled point.
    #[must_use]
    pub fn labeled(x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            label: Some(label.into()),
        }
    }
}

/// Inclusive axis range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    /// Lower end of the axis.
    pub min: f64,
    /// Upper end of the axis.
    pub max: f64,
}

impl AxisRange {
    /// Create a range. Not validated; see [`AxisRange::is_valid`].
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check that the range is finite and ordered, and positive when the
    /// axis is logarithmic.
    #[must_use]
    pub fn is_valid(&self, log: bool) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min && (!log || self.min > 0.0)
    }

    /// Distance between the ends.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Set of axes drawn on a logarithmic scale.
///
/// Serialized the way gnuplot spells it: `"xy"`, `"x"`, `"y"` or `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogScale {
    pub x: bool,
    pub y: bool,
}

impl LogScale {
    /// Both axes logarithmic.
    pub const XY: Self = Self { x: true, y: true };
    /// Both axes linear.
    pub const NONE: Self = Self { x: false, y: false };

    /// Check whether any axis is logarithmic.
    #[must_use]
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

impl fmt::Display for LogScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.x {
            f.write_str("x")?;
        }
        if self.y {
            f.write_str("y")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for LogScale {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let mut scale = Self::NONE;
        for c in value.trim().chars() {
            match c.to_ascii_lowercase() {
                'x' => scale.x = true,
                'y' => scale.y = true,
                other => return Err(format!("unknown log-scale axis '{other}'")),
            }
        }
        Ok(scale)
    }
}

impl From<LogScale> for String {
    fn from(value: LogScale) -> Self {
        value.to_string()
    }
}

/// Opaque reference to the on-disk data of one series (a file stem).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataRef(String);

impl DataRef {
    /// Use `stem` as the data file stem verbatim.
    #[must_use]
    pub fn new(stem: impl Into<String>) -> Self {
        Self(stem.into())
    }

    /// Derive a file-name-safe reference from a series name.
    ///
    /// `"Meggie - simd"` becomes `"meggie-simd"`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        let slug = slug.trim_matches('-');
        if slug.is_empty() {
            Self("series".to_string())
        } else {
            Self(slug.to_string())
        }
    }

    /// The file stem.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One named line or marker set on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend label, unique within a chart.
    pub name: String,
    /// Points in draw order.
    pub points: Vec<CoordinatePoint>,
    /// Visual style.
    pub style: Style,
    /// Reference to the series' data file.
    pub data_ref: DataRef,
}

/// In-progress chart: global attributes plus series appended one at a time.
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    spec: ChartSpec,
}

impl ChartBuilder {
    /// Start an empty chart that will be written to `output_path`.
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            spec: ChartSpec {
                output_path: output_path.into(),
                title: String::new(),
                x_label: "Intensity [flops/byte]".to_string(),
                y_label: "Performance [MFlops/s]".to_string(),
                log_scale: LogScale::XY,
                x_range: AxisRange::new(0.009, 1000.0),
                y_range: AxisRange::new(0.1, 1600.0),
                size: (1400, 768),
                circle_radius: 0.008,
                series: Vec::new(),
            },
        }
    }

    /// Sets the chart title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.spec.title = title.into();
        self
    }

    /// Sets the X-axis label.
    #[must_use]
    pub fn with_x_label(mut self, label: impl Into<String>) -> Self {
        self.spec.x_label = label.into();
        self
    }

    /// Sets the Y-axis label.
    #[must_use]
    pub fn with_y_label(mut self, label: impl Into<String>) -> Self {
        self.spec.y_label = label.into();
        self
    }

    /// Sets the visible X range.
    #[must_use]
    pub fn with_x_range(mut self, range: AxisRange) -> Self {
        self.spec.x_range = range;
        self
    }

    /// Sets the visible Y range.
    #[must_use]
    pub fn with_y_range(mut self, range: AxisRange) -> Self {
        self.spec.y_range = range;
        self
    }

    /// Sets which axes are logarithmic.
    #[must_use]
    pub fn with_log_scale(mut self, log_scale: LogScale) -> Self {
        self.spec.log_scale = log_scale;
        self
    }

    /// Sets the image size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.spec.size = (width, height);
        self
    }

    /// Sets the circle marker radius as a fraction of the plot width.
    #[must_use]
    pub fn with_circle_radius(mut self, radius: f64) -> Self {
        self.spec.circle_radius = radius;
        self
    }

    /// Append a series whose data reference is derived from its name.
    ///
    /// If the derived reference is taken, a numeric suffix is added.
    pub fn add_series(
        &mut self,
        name: impl Into<String>,
        points: Vec<CoordinatePoint>,
        style: Style,
    ) -> Result<()> {
        let name = name.into();
        self.check_name(&name)?;

        let base = DataRef::from_name(&name);
        let mut data_ref = base.clone();
        let mut n = 2;
        while self.has_data_ref(&data_ref) {
            data_ref = DataRef::new(format!("{}-{}", base, n));
            n += 1;
        }

        self.push(name, points, style, data_ref);
        Ok(())
    }

    /// Append a series with an explicit data reference.
    pub fn add_series_with_ref(
        &mut self,
        name: impl Into<String>,
        points: Vec<CoordinatePoint>,
        style: Style,
        data_ref: DataRef,
    ) -> Result<()> {
        let name = name.into();
        self.check_name(&name)?;
        if self.has_data_ref(&data_ref) {
            return Err(Error::DuplicateDataRef(data_ref.to_string()));
        }

        self.push(name, points, style, data_ref);
        Ok(())
    }

    /// Number of series added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.spec.series.len()
    }

    /// Check if no series were added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spec.series.is_empty()
    }

    /// Names of the series added so far, in draw order.
    #[must_use]
    pub fn series_names(&self) -> Vec<&str> {
        self.spec.series.iter().map(|s| s.name.as_str()).collect()
    }

    /// Freeze the chart. No series can be added afterwards.
    #[must_use]
    pub fn finalize(self) -> ChartSpec {
        self.spec
    }

    fn check_name(&self, name: &str) -> Result<()> {
        if self.spec.series.iter().any(|s| s.name == name) {
            return Err(Error::DuplicateSeriesName(name.to_string()));
        }
        Ok(())
    }

    fn has_data_ref(&self, data_ref: &DataRef) -> bool {
        self.spec.series.iter().any(|s| &s.data_ref == data_ref)
    }

    fn push(&mut self, name: String, points: Vec<CoordinatePoint>, style: Style, data_ref: DataRef) {
        self.spec.series.push(Series {
            name,
            points,
            style,
            data_ref,
        });
    }
}

/// Finalized chart description.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    output_path: PathBuf,
    title: String,
    x_label: String,
    y_label: String,
    log_scale: LogScale,
    x_range: AxisRange,
    y_range: AxisRange,
    size: (u32, u32),
    circle_radius: f64,
    series: Vec<Series>,
}

impl ChartSpec {
    /// Image file the renderer writes.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Chart title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Intensity axis label.
    #[must_use]
    pub fn x_label(&self) -> &str {
        &self.x_label
    }

    /// Throughput axis label.
    #[must_use]
    pub fn y_label(&self) -> &str {
        &self.y_label
    }

    /// Axes drawn on a logarithmic scale.
    #[must_use]
    pub fn log_scale(&self) -> LogScale {
        self.log_scale
    }

    /// Visible intensity range.
    #[must_use]
    pub fn x_range(&self) -> AxisRange {
        self.x_range
    }

    /// Visible throughput range.
    #[must_use]
    pub fn y_range(&self) -> AxisRange {
        self.y_range
    }

    /// Image size in pixels (width, height).
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Circle marker radius as a fraction of the plot width.
    #[must_use]
    pub fn circle_radius(&self) -> f64 {
        self.circle_radius
    }

    /// Series in draw and legend order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Look up a series by its legend name.
    #[must_use]
    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_points() -> Vec<CoordinatePoint> {
        vec![CoordinatePoint::new(0.01, 1.0), CoordinatePoint::new(1.0, 100.0)]
    }

    #[test]
    fn test_add_series_preserves_order() {
        let mut builder = ChartBuilder::new("out.png");
        builder.add_series("b", two_points(), Style::default()).unwrap();
        builder.add_series("a", vec![], Style::circles("red")).unwrap();

        let spec = builder.finalize();
        let names: Vec<_> = spec.series().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(spec.series_named("a").unwrap().points.is_empty());
    }

    #[test]
    fn test_duplicate_name_leaves_series_unchanged() {
        let mut builder = ChartBuilder::new("out.png");
        builder.add_series("Emmy nodes", two_points(), Style::default()).unwrap();

        let err = builder
            .add_series("Emmy nodes", vec![], Style::circles("blue"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateSeriesName(ref n) if n == "Emmy nodes"));

        assert_eq!(builder.len(), 1);
        let spec = builder.finalize();
        assert_eq!(spec.series()[0].points, two_points());
        assert_eq!(spec.series()[0].style, Style::default());
    }

    #[test]
    fn test_data_ref_collision_gets_suffix() {
        let mut builder = ChartBuilder::new("out.png");
        builder.add_series("Meggie simd", vec![], Style::default()).unwrap();
        builder.add_series("Meggie - simd", vec![], Style::default()).unwrap();

        let spec = builder.finalize();
        assert_eq!(spec.series()[0].data_ref.as_str(), "meggie-simd");
        assert_eq!(spec.series()[1].data_ref.as_str(), "meggie-simd-2");
    }

    #[test]
    fn test_explicit_duplicate_data_ref() {
        let mut builder = ChartBuilder::new("out.png");
        builder
            .add_series_with_ref("one", vec![], Style::default(), DataRef::new("nodes"))
            .unwrap();
        let err = builder
            .add_series_with_ref("two", vec![], Style::default(), DataRef::new("nodes"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateDataRef(_)));
        assert_eq!(builder.series_names(), vec!["one"]);
    }

    #[test]
    fn test_data_ref_from_name() {
        assert_eq!(DataRef::from_name("Emmy nodes").as_str(), "emmy-nodes");
        assert_eq!(DataRef::from_name("  --").as_str(), "series");
    }

    #[test]
    fn test_log_scale_parse() {
        assert_eq!(LogScale::try_from("xy".to_string()).unwrap(), LogScale::XY);
        assert_eq!(LogScale::try_from("Y".to_string()).unwrap(), LogScale { x: false, y: true });
        assert_eq!(LogScale::try_from(String::new()).unwrap(), LogScale::NONE);
        assert!(LogScale::try_from("z".to_string()).is_err());
        assert_eq!(LogScale::XY.to_string(), "xy");
    }

    #[test]
    fn test_axis_range_validity() {
        assert!(AxisRange::new(0.009, 1000.0).is_valid(true));
        assert!(AxisRange::new(0.0, 1600.0).is_valid(false));
        assert!(!AxisRange::new(0.0, 1600.0).is_valid(true));
        assert!(!AxisRange::new(5.0, 1.0).is_valid(false));
    }

    #[test]
    fn test_builder_globals() {
        let spec = ChartBuilder::new("chart.svg")
            .with_title("t")
            .with_x_label("x")
            .with_y_label("y")
            .with_log_scale(LogScale::NONE)
            .with_size(800, 600)
            .finalize();
        assert_eq!(spec.output_path(), Path::new("chart.svg"));
        assert_eq!(spec.title(), "t");
        assert_eq!(spec.size(), (800, 600));
        assert!(!spec.log_scale().any());
        assert!(spec.series().is_empty());
    }
}
