//! Rendering through an external `gnuplot` process.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::chart::{ChartSpec, Fill, MarkKind, Series, Style};
use crate::error::{Error, Result};
use crate::render::{Renderer, is_svg_path};
use crate::report::Reporter;

/// File name of the generated gnuplot script inside the work directory.
pub const SCRIPT_NAME: &str = "roofline.plot";

/// Writes one `<data_ref>.dat` file per series and a script into
/// `work_dir`, then runs `<program> <script>`.
///
/// The files are kept after the run so a failed render can be inspected
/// and replayed by hand.
#[derive(Debug, Clone)]
pub struct GnuplotRenderer {
    work_dir: PathBuf,
    program: String,
}

impl GnuplotRenderer {
    /// Renderer writing into `work_dir` and running `gnuplot`.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            program: "gnuplot".to_string(),
        }
    }

    /// Sets the program to invoke instead of `gnuplot`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Path of the data file for a series.
    #[must_use]
    pub fn data_path(&self, series: &Series) -> PathBuf {
        self.work_dir.join(format!("{}.dat", series.data_ref))
    }

    /// Path of the generated script.
    #[must_use]
    pub fn script_path(&self) -> PathBuf {
        self.work_dir.join(SCRIPT_NAME)
    }

    /// Write all data files and the script. Returns the script path.
    pub fn write_files(&self, spec: &ChartSpec) -> Result<PathBuf> {
        fs::create_dir_all(&self.work_dir)?;

        let mut data_files = Vec::with_capacity(spec.series().len());
        for series in spec.series() {
            let path = self.data_path(series);
            write_data_file(&path, series)?;
            data_files.push(path);
        }

        let script = gnuplot_script(spec, &data_files);
        let script_path = self.script_path();
        fs::write(&script_path, script)?;
        Ok(script_path)
    }
}

impl Renderer for GnuplotRenderer {
    fn render(&self, spec: &ChartSpec, reporter: &dyn Reporter) -> Result<()> {
        if spec.series().is_empty() {
            return Err(Error::RenderInvocation("chart has no series to plot".to_string()));
        }

        let script_path = self.write_files(spec)?;

        tracing::info!("Running {} and waiting for it to finish...", self.program);
        let output = Command::new(&self.program)
            .arg(&script_path)
            .output()
            .map_err(|e| Error::RenderInvocation(format!("failed to launch {}: {}", self.program, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(Error::RenderInvocation(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
            reporter.warn(&format!("{}: {}", self.program, line));
        }
        tracing::info!("Wrote {}", spec.output_path().display());
        Ok(())
    }
}

/// Write `# <name>` followed by one `x y` line per point.
pub fn write_data_file(path: &Path, series: &Series) -> Result<()> {
    let mut f = fs::File::create(path)?;
    writeln!(f, "# {}", series.name)?;
    for p in &series.points {
        writeln!(f, "{} {}", p.x, p.y)?;
    }
    Ok(())
}

/// Build the gnuplot script for `spec`, reading series `i` from `data_files[i]`.
#[must_use]
pub fn gnuplot_script(spec: &ChartSpec, data_files: &[PathBuf]) -> String {
    let mut script = String::with_capacity(1024);
    let (width, height) = spec.size();

    let terminal = if is_svg_path(spec.output_path()) {
        "svg"
    } else {
        "png"
    };
    let _ = writeln!(script, "set terminal {} size {},{} enhanced font ',12'", terminal, width, height);
    let _ = writeln!(script, "set output {}", quote(&spec.output_path().display().to_string()));
    let _ = writeln!(script, "set title {}", quote(spec.title()));
    let _ = writeln!(script, "set xlabel {}", quote(spec.x_label()));
    let _ = writeln!(script, "set ylabel {}", quote(spec.y_label()));
    let _ = writeln!(script, "set xrange [{}:{}]", spec.x_range().min, spec.x_range().max);
    let _ = writeln!(script, "set yrange [{}:{}]", spec.y_range().min, spec.y_range().max);
    if spec.log_scale().any() {
        let _ = writeln!(script, "set logscale {}", spec.log_scale());
    }
    let _ = writeln!(script, "set style circle radius graph {}", spec.circle_radius());

    let clauses: Vec<String> = spec
        .series()
        .iter()
        .zip(data_files)
        .map(|(series, file)| {
            format!(
                "{} using 1:2 title {} with {}",
                quote(&file.display().to_string()),
                quote(&series.name),
                gnuplot_style(&series.style)
            )
        })
        .collect();
    if !clauses.is_empty() {
        let _ = writeln!(script, "plot {}", clauses.join(", \\\n     "));
    }

    script
}

/// Translate a series style into a gnuplot `with` clause.
#[must_use]
pub fn gnuplot_style(style: &Style) -> String {
    let mut out = match style.kind {
        MarkKind::Lines => "lines".to_string(),
        MarkKind::Points => "points pt 7".to_string(),
        MarkKind::Circles => "circles".to_string(),
    };

    if let Some(fill) = style.fill {
        match fill {
            Fill::Solid { density } => {
                let _ = write!(out, " fs solid {}", density);
            }
            Fill::Empty => out.push_str(" fs empty"),
        }
        match style.border {
            Some(true) => out.push_str(" border -1"),
            Some(false) => out.push_str(" noborder"),
            None => {}
        }
    }

    if let Some(color) = &style.color {
        let key = if style.kind == MarkKind::Circles { "fc" } else { "lc" };
        let _ = write!(out, " {} rgb {}", key, quote(color));
    }
    if let Some(width) = style.line_width {
        let _ = write!(out, " lw {}", width);
    }

    out
}

/// Single-quote a gnuplot string; embedded quotes are doubled.
fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartBuilder, CoordinatePoint};
    use crate::report::{Level, MemoryReporter};

    fn sample_spec(output: &Path) -> ChartSpec {
        let mut builder = ChartBuilder::new(output).with_title("last updated: now");
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
        builder.add_series("Emmy nodes", vec![], Style::circles("royalblue")).unwrap();
        builder.finalize()
    }

    #[test]
    fn test_style_translation() {
        assert_eq!(gnuplot_style(&Style::lines("red", 3.0)), "lines lc rgb 'red' lw 3");
        assert_eq!(
            gnuplot_style(&Style::circles("royalblue")),
            "circles fs solid 1 border -1 fc rgb 'royalblue'"
        );
        let translucent = Style {
            fill: Some(Fill::Solid { density: 0.25 }),
            border: Some(false),
            ..Style::circles("goldenrod")
        };
        assert_eq!(
            gnuplot_style(&translucent),
            "circles fs solid 0.25 noborder fc rgb 'goldenrod'"
        );
        assert_eq!(gnuplot_style(&Style::points("black")), "points pt 7 lc rgb 'black'");
        assert_eq!(gnuplot_style(&Style::default()), "lines");
    }

    #[test]
    fn test_script_has_single_plot_command() {
        let spec = sample_spec(Path::new("roofline.png"));
        let files = vec![PathBuf::from("meggie-simd.dat"), PathBuf::from("emmy-nodes.dat")];
        let script = gnuplot_script(&spec, &files);

        assert!(script.contains("set terminal png size 1400,768"));
        assert!(script.contains("set output 'roofline.png'"));
        assert!(script.contains("set logscale xy"));
        assert!(script.contains("set style circle radius graph 0.008"));
        assert_eq!(script.matches("plot '").count(), 1);
        assert!(script.contains("'meggie-simd.dat' using 1:2 title 'Meggie - simd' with lines"));
        assert!(script.contains("'emmy-nodes.dat' using 1:2 title 'Emmy nodes' with circles"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), "'it''s'");
    }

    #[test]
    fn test_write_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let spec = sample_spec(&dir.path().join("out.png"));
        let path = dir.path().join("roof.dat");
        write_data_file(&path, &spec.series()[0]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "# Meggie - simd");
        assert_eq!(lines[1], "0.01 1");
        assert_eq!(lines[2], "15.35 1536");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_missing_program_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let spec = sample_spec(&dir.path().join("out.png"));
        let renderer = GnuplotRenderer::new(&work).with_program("definitely-not-gnuplot-xyz");
        let reporter = MemoryReporter::new();

        let err = renderer.render(&spec, &reporter).unwrap_err();
        assert!(matches!(err, Error::RenderInvocation(_)));

        assert!(renderer.script_path().exists());
        for series in spec.series() {
            assert!(renderer.data_path(series).exists());
        }
        assert!(reporter.messages(Level::Warn).is_empty());
        assert!(!dir.path().join("out.png").exists());
    }

    #[test]
    fn test_failing_program_keeps_files() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let spec = sample_spec(&dir.path().join("out.png"));
        let renderer = GnuplotRenderer::new(&work).with_program("false");
        let reporter = MemoryReporter::new();

        let err = renderer.render(&spec, &reporter).unwrap_err();
        assert!(matches!(err, Error::RenderInvocation(ref msg) if msg.contains("exited with")));

        assert!(renderer.script_path().exists());
        for series in spec.series() {
            assert!(renderer.data_path(series).exists());
        }
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_successful_program() {
        let dir = tempfile::tempdir().unwrap();
        let spec = sample_spec(&dir.path().join("out.png"));
        let renderer = GnuplotRenderer::new(dir.path()).with_program("true");
        let reporter = MemoryReporter::new();

        renderer.render(&spec, &reporter).unwrap();
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_empty_chart_is_not_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let spec = ChartBuilder::new(dir.path().join("out.png")).finalize();
        let renderer = GnuplotRenderer::new(dir.path());
        let err = renderer.render(&spec, &MemoryReporter::new()).unwrap_err();
        assert!(matches!(err, Error::RenderInvocation(_)));
    }
}
