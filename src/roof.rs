//! Roofline ceilings.
//!
//! A roof is a three-point piecewise-linear boundary: a memory-bound ramp
//! rising to a compute-bound plateau at the machine's peak throughput.
//! Several roofs (e.g. scalar and SIMD peaks) can be drawn on one chart;
//! each is computed independently from its own [`PeakParameters`].

use serde::{Deserialize, Serialize};

use crate::chart::CoordinatePoint;
use crate::error::{Error, Result};

/// Fraction of peak bandwidth used as the starting throughput of a roof.
///
/// Keeps the low-intensity end of the ramp legible on a log-scale plot.
pub const BANDWIDTH_CUTOFF_FRACTION: f64 = 0.01;

/// Hardware ceiling of one machine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakParameters {
    peak_memory_bandwidth: f64,
    peak_throughput: f64,
}

impl PeakParameters {
    /// Create peak parameters. Both values must be positive and finite.
    pub fn new(peak_memory_bandwidth: f64, peak_throughput: f64) -> Result<Self> {
        check_positive("peak_memory_bandwidth", peak_memory_bandwidth)?;
        check_positive("peak_throughput", peak_throughput)?;
        Ok(Self {
            peak_memory_bandwidth,
            peak_throughput,
        })
    }

    /// Peak memory bandwidth, the slope of the ramp.
    #[must_use]
    pub fn peak_memory_bandwidth(&self) -> f64 {
        self.peak_memory_bandwidth
    }

    /// Peak compute throughput, the height of the plateau.
    #[must_use]
    pub fn peak_throughput(&self) -> f64 {
        self.peak_throughput
    }
}

/// Chart-wide intensity bounds where every roof starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBounds")]
pub struct XBounds {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawBounds {
    min: f64,
    max: f64,
}

impl TryFrom<RawBounds> for XBounds {
    type Error = Error;

    fn try_from(raw: RawBounds) -> Result<Self> {
        Self::new(raw.min, raw.max)
    }
}

impl Default for XBounds {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 1000.0,
        }
    }
}

impl XBounds {
    /// Create bounds with `0 < min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        check_positive("x_min", min)?;
        check_positive("x_max", max)?;
        if max <= min {
            return Err(Error::InvalidParameter {
                name: "x_max",
                value: max,
                reason: "must exceed x_min",
            });
        }
        Ok(Self { min, max })
    }

    /// Intensity where every roof starts.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Intensity where every roof ends.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Three-point roof boundary.
///
/// Non-decreasing in throughput whenever the peak throughput is at least
/// the bandwidth cutoff; see [`RoofCurve::is_monotonic`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoofCurve {
    points: [CoordinatePoint; 3],
}

impl RoofCurve {
    /// Compute a roof with the default intensity bounds.
    pub fn from_peaks(peak_memory_bandwidth: f64, peak_throughput: f64) -> Result<Self> {
        let params = PeakParameters::new(peak_memory_bandwidth, peak_throughput)?;
        Ok(compute_roof(params, XBounds::default()))
    }

    /// Ramp start, knee and plateau end.
    #[must_use]
    pub fn points(&self) -> &[CoordinatePoint; 3] {
        &self.points
    }

    /// Intensity where the memory-bound ramp meets the plateau.
    #[must_use]
    pub fn knee(&self) -> f64 {
        self.points[1].x
    }

    /// Peak throughput of the plateau.
    #[must_use]
    pub fn plateau(&self) -> f64 {
        self.points[2].y
    }

    /// Check that throughput never falls along the curve.
    ///
    /// False only when the peak throughput lies below the cutoff, in which
    /// case the ramp starts above the plateau.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.points.windows(2).all(|w| w[0].y <= w[1].y)
    }

    /// Hand the points over to a chart series.
    #[must_use]
    pub fn into_points(self) -> Vec<CoordinatePoint> {
        self.points.into()
    }
}

/// Derive the roof boundary for one machine.
///
/// With `y_cut = 0.01 * bandwidth` the curve runs through
/// `(min, y_cut)`, `(knee, peak)` and `(max, peak)` where
/// `knee = (peak - y_cut) / bandwidth`.
///
/// Any validated parameters yield a curve. A peak below `y_cut` puts the
/// knee at a negative intensity and the ramp start above the plateau.
#[must_use]
pub fn compute_roof(params: PeakParameters, bounds: XBounds) -> RoofCurve {
    let bandwidth = params.peak_memory_bandwidth;
    let peak = params.peak_throughput;

    let y_cut = BANDWIDTH_CUTOFF_FRACTION * bandwidth;
    let knee = (peak - y_cut) / bandwidth;

    RoofCurve {
        points: [
            CoordinatePoint::new(bounds.min, y_cut),
            CoordinatePoint::new(knee, peak),
            CoordinatePoint::new(bounds.max, peak),
        ],
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must be positive and finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_memory_bound_example() {
        let roof = RoofCurve::from_peaks(80.0, 704.0).unwrap();
        let p = roof.points();

        assert_close(p[0].x, 0.01);
        assert_close(p[0].y, 0.8);
        assert_close(p[1].x, 8.79);
        assert_eq!(p[1].y, 704.0);
        assert_eq!(p[2].x, 1000.0);
        assert_eq!(p[2].y, 704.0);
        assert_close(roof.knee(), (704.0 - 0.8) / 80.0);
    }

    #[test]
    fn test_shape_for_many_peaks() {
        for &(bw, tp) in &[(100.0, 1536.0), (100.0, 44.0), (1.0, 0.5), (3.5e5, 7.2e6)] {
            let roof = RoofCurve::from_peaks(bw, tp).unwrap();
            let p = roof.points();

            assert_eq!(p.len(), 3);
            assert_eq!(p[1].y, tp);
            assert_eq!(p[2].y, p[1].y);
            assert_eq!(p[0].y, 0.01 * bw);
            assert!(p[0].y <= p[1].y && p[1].y <= p[2].y);
            assert!(roof.is_monotonic());
        }
    }

    #[test]
    fn test_custom_bounds() {
        let params = PeakParameters::new(100.0, 44.0).unwrap();
        let roof = compute_roof(params, XBounds::new(0.1, 100.0).unwrap());
        assert_eq!(roof.points()[0].x, 0.1);
        assert_eq!(roof.points()[2].x, 100.0);
        assert_eq!(roof.plateau(), 44.0);
    }

    #[test]
    fn test_roofs_are_independent() {
        let simd = RoofCurve::from_peaks(100.0, 1536.0).unwrap();
        let _scalar = RoofCurve::from_peaks(100.0, 44.0).unwrap();
        assert_eq!(simd, RoofCurve::from_peaks(100.0, 1536.0).unwrap());
    }

    #[test]
    fn test_invalid_parameters() {
        for &(bw, tp) in &[(0.0, 10.0), (-1.0, 10.0), (10.0, 0.0), (f64::NAN, 1.0), (1.0, f64::INFINITY)] {
            let err = PeakParameters::new(bw, tp).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter { .. }));
        }
    }

    #[test]
    fn test_peak_below_cutoff_still_yields_curve() {
        let params = PeakParameters::new(1000.0, 5.0).unwrap();
        let roof = compute_roof(params, XBounds::default());
        let p = roof.points();

        assert_eq!(p[0].y, 10.0);
        assert_eq!(p[1].y, 5.0);
        assert_eq!(p[2].y, 5.0);
        assert_close(roof.knee(), -0.005);
        assert!(!roof.is_monotonic());
    }

    #[test]
    fn test_bounds_validation() {
        assert!(XBounds::new(0.01, 1000.0).is_ok());
        assert!(XBounds::new(10.0, 1.0).is_err());
        assert!(XBounds::new(0.0, 1.0).is_err());

        let bounds: XBounds = toml::from_str("min = 0.1\nmax = 10.0").unwrap();
        assert_eq!(bounds.min(), 0.1);
        assert!(toml::from_str::<XBounds>("min = 5.0\nmax = 1.0").is_err());
    }
}
