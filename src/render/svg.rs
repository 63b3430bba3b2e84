//! In-process SVG rendering.
//!
//! Draws the roofline chart without any external program. Axes follow the
//! chart's ranges and log-scale settings; log axes get decade ticks.
//! The chart supports light and dark mode via CSS media queries.

use std::fmt::Write as _;
use std::fs;

use crate::chart::{AxisRange, ChartSpec, Fill, MarkKind};
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::report::Reporter;

const DEFAULT_COLOR: &str = "#3498db";

/// Writes the chart as an SVG document to its output path.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl Renderer for SvgRenderer {
    fn render(&self, spec: &ChartSpec, reporter: &dyn Reporter) -> Result<()> {
        check_range("x_range", spec.x_range(), spec.log_scale().x)?;
        check_range("y_range", spec.y_range(), spec.log_scale().y)?;

        let (svg, skipped) = build_svg(spec);
        if skipped > 0 {
            reporter.warn(&format!(
                "{} point(s) not shown: non-positive values on a log axis",
                skipped
            ));
        }
        if let Some(parent) = spec.output_path().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(spec.output_path(), svg)?;
        tracing::info!("Wrote {}", spec.output_path().display());
        Ok(())
    }
}

fn check_range(name: &'static str, range: AxisRange, log: bool) -> Result<()> {
    if range.is_valid(log) {
        return Ok(());
    }
    let value = if range.min.is_finite() && (!log || range.min > 0.0) {
        range.max
    } else {
        range.min
    };
    Err(Error::InvalidParameter {
        name,
        value,
        reason: if log {
            "axis range must be finite, increasing and positive on a log scale"
        } else {
            "axis range must be finite and increasing"
        },
    })
}

/// Generates the SVG document for `spec`.
///
/// An axis whose range is unusable for its scale gets no ticks and its
/// points are not placed; [`SvgRenderer`] rejects such charts up front.
///
/// # Example
///
/// ```rust
/// use cluster_roofline::chart::{ChartBuilder, Style};
/// use cluster_roofline::render::generate_svg;
/// use cluster_roofline::roof::RoofCurve;
///
/// let mut builder = ChartBuilder::new("roofline.svg").with_title("Roofline");
/// let roof = RoofCurve::from_peaks(100.0, 1536.0).unwrap();
/// builder.add_series("Peak", roof.into_points(), Style::lines("red", 3.0)).unwrap();
///
/// let svg = generate_svg(&builder.finalize());
/// assert!(svg.contains("Peak"));
/// ```
#[must_use]
pub fn generate_svg(spec: &ChartSpec) -> String {
    build_svg(spec).0
}

/// Maps data values onto one pixel axis.
struct Axis {
    range: AxisRange,
    log: bool,
    start: f64,
    length: f64,
}

impl Axis {
    fn fraction(&self, v: f64) -> f64 {
        if self.log {
            (v.log10() - self.range.min.log10()) / (self.range.max.log10() - self.range.min.log10())
        } else {
            (v - self.range.min) / self.range.span()
        }
    }

    fn can_show(&self, v: f64) -> bool {
        self.range.is_valid(self.log) && v.is_finite() && (!self.log || v > 0.0)
    }

    /// Tick values: decades on log axes, five equal steps otherwise.
    fn ticks(&self) -> Vec<f64> {
        if !self.range.is_valid(self.log) {
            return Vec::new();
        }
        if self.log {
            let lo = self.range.min.log10().ceil() as i32;
            let hi = self.range.max.log10().floor() as i32;
            (lo..=hi).map(|e| 10f64.powi(e)).collect()
        } else {
            (0..=5)
                .map(|i| self.range.min + f64::from(i) / 5.0 * self.range.span())
                .collect()
        }
    }
}

fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a == 0.0 || (0.1..10000.0).contains(&a) {
        let s = format!("{:.2}", v);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else if a < 0.1 && a >= 0.001 {
        format!("{}", v)
    } else {
        format!("{:e}", v)
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

/// Returns the document and the number of points that could not be drawn.
fn build_svg(spec: &ChartSpec) -> (String, usize) {
    let mut svg = String::with_capacity(8192);
    let mut skipped = 0;

    let (width, height) = spec.size();
    let margin_top = 50;
    let margin_right = 200;
    let margin_bottom = 70;
    let margin_left = 90;
    let plot_width = width.saturating_sub(margin_left + margin_right).max(1);
    let plot_height = height.saturating_sub(margin_top + margin_bottom).max(1);

    let x_axis = Axis {
        range: spec.x_range(),
        log: spec.log_scale().x,
        start: f64::from(margin_left),
        length: f64::from(plot_width),
    };
    let y_axis = Axis {
        range: spec.y_range(),
        log: spec.log_scale().y,
        start: f64::from(margin_top),
        length: f64::from(plot_height),
    };
    let scale_x = |v: f64| x_axis.start + x_axis.fraction(v) * x_axis.length;
    let scale_y = |v: f64| y_axis.start + (1.0 - y_axis.fraction(v)) * y_axis.length;

    // SVG header
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        width, height
    );

    // CSS with dark mode support
    svg.push_str(
        r#"<style>
  :root {
    --bg-color: #ffffff;
    --text-color: #1a1a1a;
    --grid-color: #e0e0e0;
    --axis-color: #333333;
    --legend-bg: #ffffff;
    --legend-border: #cccccc;
  }
  @media (prefers-color-scheme: dark) {
    :root {
      --bg-color: #1a1a1a;
      --text-color: #e0e0e0;
      --grid-color: #404040;
      --axis-color: #b0b0b0;
      --legend-bg: #2a2a2a;
      --legend-border: #505050;
    }
  }
  .background { fill: var(--bg-color); }
  .title { font: bold 18px system-ui, sans-serif; fill: var(--text-color); }
  .axis-label { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .tick-label { font: 11px system-ui, sans-serif; fill: var(--text-color); }
  .legend { font: 13px system-ui, sans-serif; fill: var(--text-color); }
  .grid { stroke: var(--grid-color); stroke-width: 1; }
  .axis { stroke: var(--axis-color); stroke-width: 1.5; }
  .legend-bg { fill: var(--legend-bg); stroke: var(--legend-border); }
</style>
"#,
    );

    let _ = writeln!(
        svg,
        r#"<defs><clipPath id="plot-area"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath></defs>"#,
        margin_left, margin_top, plot_width, plot_height
    );

    // Background
    let _ = writeln!(
        svg,
        r#"<rect class="background" width="{}" height="{}"/>"#,
        width, height
    );

    // Title
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="30" text-anchor="middle" class="title">{}</text>"#,
        f64::from(width) / 2.0,
        escape(spec.title())
    );

    let bottom = margin_top + plot_height;
    let right = margin_left + plot_width;

    // Grid lines and tick labels
    for v in x_axis.ticks() {
        let x = scale_x(v);
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{}" x2="{:.2}" y2="{}" class="grid"/>"#,
            x, margin_top, x, bottom
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" class="tick-label">{}</text>"#,
            x,
            bottom + 20,
            format_tick(v)
        );
    }
    for v in y_axis.ticks() {
        let y = scale_y(v);
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{:.2}" x2="{}" y2="{:.2}" class="grid"/>"#,
            margin_left, y, right, y
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" class="tick-label">{}</text>"#,
            margin_left - 10,
            y + 4.0,
            format_tick(v)
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        margin_left, bottom, right, bottom
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" class="axis"/>"#,
        margin_left, margin_top, margin_left, bottom
    );

    // X axis label
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" class="axis-label">{}</text>"#,
        f64::from(margin_left) + f64::from(plot_width) / 2.0,
        height - 20,
        escape(spec.x_label())
    );

    // Y axis label (rotated)
    let _ = writeln!(
        svg,
        r#"<text x="25" y="{}" text-anchor="middle" class="axis-label" transform="rotate(-90 25 {})">{}</text>"#,
        f64::from(height) / 2.0,
        f64::from(height) / 2.0,
        escape(spec.y_label())
    );

    // Plot series
    let radius = (spec.circle_radius() * f64::from(plot_width)).max(2.0);
    let _ = writeln!(svg, r#"<g clip-path="url(#plot-area)">"#);
    for s in spec.series() {
        let color = escape(s.style.color.as_deref().unwrap_or(DEFAULT_COLOR));
        let visible: Vec<_> = s
            .points
            .iter()
            .filter(|p| x_axis.can_show(p.x) && y_axis.can_show(p.y))
            .collect();
        skipped += s.points.len() - visible.len();

        match s.style.kind {
            MarkKind::Lines => {
                if visible.is_empty() {
                    continue;
                }
                let mut path = String::new();
                for (i, p) in visible.iter().enumerate() {
                    let prefix = if i == 0 { "M" } else { " L" };
                    let _ = write!(path, "{} {:.2},{:.2}", prefix, scale_x(p.x), scale_y(p.y));
                }
                let _ = writeln!(
                    svg,
                    r#"<path d="{}" stroke="{}" stroke-width="{}" fill="none"/>"#,
                    path,
                    color,
                    s.style.line_width.unwrap_or(2.5)
                );
            }
            MarkKind::Points | MarkKind::Circles => {
                let r = if s.style.kind == MarkKind::Points { 3.0 } else { radius };
                let (fill, opacity) = match s.style.fill {
                    Some(Fill::Solid { density }) => (color.as_str(), density),
                    Some(Fill::Empty) => ("none", 1.0),
                    None if s.style.kind == MarkKind::Points => (color.as_str(), 1.0),
                    None => ("none", 1.0),
                };
                let stroke = if s.style.border == Some(true) {
                    "var(--axis-color)"
                } else {
                    color.as_str()
                };
                for p in visible {
                    let title = p.label.as_deref().map(escape).unwrap_or_default();
                    let _ = writeln!(
                        svg,
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{:.1}" fill="{}" fill-opacity="{}" stroke="{}"><title>{}</title></circle>"#,
                        scale_x(p.x),
                        scale_y(p.y),
                        r,
                        fill,
                        opacity,
                        stroke,
                        title
                    );
                }
            }
        }
    }
    svg.push_str("</g>\n");

    // Legend
    let legend_x = right + 15;
    let legend_y = margin_top + 20;
    let legend_height = 20 + spec.series().len() as u32 * 25;

    let _ = writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="175" height="{}" rx="4" class="legend-bg"/>"#,
        legend_x,
        legend_y - 15,
        legend_height
    );

    for (i, s) in spec.series().iter().enumerate() {
        let y_offset = legend_y + i as u32 * 25;
        let color = escape(s.style.color.as_deref().unwrap_or(DEFAULT_COLOR));
        if s.style.kind == MarkKind::Lines {
            let _ = writeln!(
                svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="3"/>"#,
                legend_x + 8,
                y_offset + 5,
                legend_x + 22,
                y_offset + 5,
                color
            );
        } else {
            let _ = writeln!(
                svg,
                r#"<circle cx="{}" cy="{}" r="5" fill="{}"/>"#,
                legend_x + 15,
                y_offset + 5,
                color
            );
        }
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" class="legend">{}</text>"#,
            legend_x + 28,
            y_offset + 9,
            escape(&s.name)
        );
    }

    svg.push_str("</svg>\n");
    (svg, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartBuilder, CoordinatePoint, LogScale, Style};
    use crate::report::{Level, MemoryReporter};

    fn chart(output: impl Into<std::path::PathBuf>) -> ChartSpec {
        let mut builder = ChartBuilder::new(output).with_title("Cluster <roofline>");
        builder
            .add_series(
                "Meggie - simd",
                vec![
                    CoordinatePoint::new(0.01, 1.0),
                    CoordinatePoint::new(15.35, 1536.0),
                    CoordinatePoint::new(1000.0, 1536.0),
                ],
                Style::lines("red", 3.0),
            )
            .unwrap();
        builder
            .add_series(
                "Emmy nodes",
                vec![
                    CoordinatePoint::labeled(2.0, 40.0, "e0101"),
                    CoordinatePoint::labeled(0.5, 0.0, "e0102"),
                ],
                Style::circles("royalblue"),
            )
            .unwrap();
        builder.finalize()
    }

    #[test]
    fn test_generate_svg_basic() {
        let svg = generate_svg(&chart("out.svg"));

        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("Cluster &lt;roofline&gt;"));
        assert!(svg.contains("Meggie - simd"));
        assert!(svg.contains("Emmy nodes"));
        assert!(svg.contains("<title>e0101</title>"));
        // y = 0 cannot be placed on a log axis
        assert!(!svg.contains("<title>e0102</title>"));
    }

    #[test]
    fn test_log_ticks_are_decades() {
        let axis = Axis {
            range: AxisRange::new(0.009, 1000.0),
            log: true,
            start: 0.0,
            length: 100.0,
        };
        assert_eq!(axis.ticks(), vec![0.01, 0.1, 1.0, 10.0, 100.0, 1000.0]);
        assert!((axis.fraction(1000.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_axis() {
        let spec = ChartBuilder::new("lin.svg")
            .with_log_scale(LogScale::NONE)
            .with_y_range(AxisRange::new(0.0, 100.0))
            .finalize();
        let svg = generate_svg(&spec);
        assert!(svg.contains(">100</text>"));
    }

    #[test]
    fn test_render_writes_file_and_reports_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("roofline.svg");
        let reporter = MemoryReporter::new();

        SvgRenderer.render(&chart(&path), &reporter).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg"));
        assert_eq!(reporter.messages(Level::Warn).len(), 1);
    }

    #[test]
    fn test_zero_minimum_on_log_axis() {
        let mut builder = ChartBuilder::new("zero.svg").with_y_range(AxisRange::new(0.0, 1600.0));
        builder
            .add_series("Peak", vec![CoordinatePoint::new(1.0, 10.0)], Style::lines("red", 3.0))
            .unwrap();
        let spec = builder.finalize();

        let axis = Axis {
            range: spec.y_range(),
            log: true,
            start: 0.0,
            length: 100.0,
        };
        assert!(axis.ticks().is_empty());

        let svg = generate_svg(&spec);
        assert!(svg.ends_with("</svg>\n"));
        assert!(!svg.contains("<path"));

        let dir = tempfile::tempdir().unwrap();
        let mut builder = ChartBuilder::new(dir.path().join("zero.svg"))
            .with_y_range(AxisRange::new(0.0, 1600.0));
        builder
            .add_series("Peak", vec![CoordinatePoint::new(1.0, 10.0)], Style::lines("red", 3.0))
            .unwrap();
        let err = SvgRenderer.render(&builder.finalize(), &MemoryReporter::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "y_range", value, .. } if value == 0.0));
        assert!(!dir.path().join("zero.svg").exists());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(1000.0), "1000");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(0.01), "0.01");
        assert_eq!(format_tick(0.0), "0");
    }
}
