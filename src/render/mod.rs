//! Chart renderers.
//!
//! A renderer turns a finalized [`ChartSpec`] into an image at
//! [`ChartSpec::output_path`]:
//!
//! - [`GnuplotRenderer`]: writes per-series data files plus a script and runs `gnuplot`
//! - [`SvgRenderer`]: draws the chart in-process as SVG

mod gnuplot;
mod svg;

use std::path::Path;

pub use gnuplot::{GnuplotRenderer, gnuplot_style, gnuplot_script, write_data_file};
pub use svg::{SvgRenderer, generate_svg};

use crate::chart::ChartSpec;
use crate::error::Result;
use crate::report::Reporter;

/// Produces an image file from a chart description.
pub trait Renderer {
    /// Render `spec` to its output path.
    ///
    /// Fails with [`crate::Error::RenderInvocation`] when an external
    /// program cannot be launched or exits non-zero.
    fn render(&self, spec: &ChartSpec, reporter: &dyn Reporter) -> Result<()>;
}

/// Result of a render attempt that did not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The image was written to this path.
    Rendered(std::path::PathBuf),
    /// The renderer failed; intermediate files were left in place.
    Failed(String),
}

/// Check whether a path names an SVG file.
#[must_use]
pub fn is_svg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_svg_path() {
        assert!(is_svg_path(Path::new("out/roofline.SVG")));
        assert!(!is_svg_path(Path::new("roofline.png")));
        assert!(!is_svg_path(Path::new("roofline")));
    }
}
