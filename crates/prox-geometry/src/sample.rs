//! Sampling utilities: adaptive polylines and uniform parameter grids used
//! to seed local searches.

use prox_math::Point3;

use crate::curve::ParametricCurve;

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;

/// Initial uniform split before adaptive refinement, so symmetric wiggles
/// whose midpoint lies on the chord are not missed.
const MIN_SEGMENTS: usize = 4;

/// Relative chord deviation used to measure a curve's complexity.
const COMPLEXITY_TOLERANCE: f64 = 1e-2;

/// Parameters of an adaptive polyline through `f` over `[t0, t1]`.
///
/// Segments are subdivided while the midpoint deviation from the chord
/// exceeds `tolerance`.
pub fn adaptive_parameters(
    f: &impl Fn(f64) -> Point3,
    (t0, t1): (f64, f64),
    tolerance: f64,
) -> Vec<f64> {
    let mut params = vec![t0];
    let step = (t1 - t0) / MIN_SEGMENTS as f64;
    for i in 0..MIN_SEGMENTS {
        let a = t0 + step * i as f64;
        let b = if i + 1 == MIN_SEGMENTS { t1 } else { a + step };
        subdivide(f, a, b, tolerance, &mut params, 0);
    }
    params
}

fn subdivide(
    f: &impl Fn(f64) -> Point3,
    t0: f64,
    t1: f64,
    tolerance: f64,
    params: &mut Vec<f64>,
    depth: u32,
) {
    if depth >= MAX_DEPTH {
        params.push(t1);
        return;
    }

    let t_mid = (t0 + t1) * 0.5;
    let p0 = f(t0);
    let p1 = f(t1);
    let p_mid = f(t_mid);

    // Chord midpoint
    let chord_mid = (p0 + p1) * 0.5;
    let deviation = (p_mid - chord_mid).length();

    if deviation > tolerance {
        subdivide(f, t0, t_mid, tolerance, params, depth + 1);
        subdivide(f, t_mid, t1, tolerance, params, depth + 1);
    } else {
        params.push(t1);
    }
}

/// Convert a curve to a polyline using adaptive subdivision.
pub fn curve_to_polyline(curve: &dyn ParametricCurve, tolerance: f64) -> Vec<Point3> {
    adaptive_parameters(&|t| curve.point_at(t), curve.domain(), tolerance)
        .into_iter()
        .map(|t| curve.point_at(t))
        .collect()
}

/// Number of adaptive polyline segments needed to follow `f` within a
/// deviation relative to its size. Lines give `MIN_SEGMENTS`.
pub fn complexity(f: &impl Fn(f64) -> Point3, range: (f64, f64)) -> usize {
    let coarse = sample_parameters(range, 9, false);
    let length: f64 = coarse
        .windows(2)
        .map(|w| f(w[0]).distance(f(w[1])))
        .sum();
    if length < 1e-12 {
        return MIN_SEGMENTS;
    }
    adaptive_parameters(f, range, COMPLEXITY_TOLERANCE * length).len() - 1
}

/// Sample count for a curve: its complexity clamped into `[min, max]`.
pub fn curve_sample_count(curve: &dyn ParametricCurve, min: usize, max: usize) -> usize {
    complexity(&|t| curve.point_at(t), curve.domain()).clamp(min, max.max(min))
}

/// `n` uniformly spaced parameters over `[a, b]`.
///
/// Periodic domains omit the end, which repeats the start.
pub fn sample_parameters((a, b): (f64, f64), n: usize, periodic: bool) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![(a + b) * 0.5],
        _ => {
            let divs = if periodic { n } else { n - 1 };
            let step = (b - a) / divs as f64;
            (0..n).map(|i| a + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{CircularArc, LineSegment};
    use prox_math::DVec3;

    #[test]
    fn test_curve_to_polyline_line() {
        let line = LineSegment::new(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0));
        let points = curve_to_polyline(&line, 0.01);
        // No subdivision beyond the initial split
        assert_eq!(points.len(), MIN_SEGMENTS + 1);
        assert!((points[0] - DVec3::ZERO).length() < 1e-10);
        assert!((points[MIN_SEGMENTS] - DVec3::new(10.0, 0.0, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_curve_to_polyline_circle() {
        let circle = CircularArc::full_circle(DVec3::ZERO, DVec3::Z, 1.0);
        let points = curve_to_polyline(&circle, 0.01);
        // Circle should produce many points due to curvature
        assert!(
            points.len() > 10,
            "Circle should produce many points, got {}",
            points.len()
        );

        for p in &points {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 1.0).abs() < 0.02, "Point not on circle: r={}", r);
        }
    }

    #[test]
    fn test_complexity_orders_curves() {
        let line = LineSegment::new(DVec3::ZERO, DVec3::X);
        let circle = CircularArc::full_circle(DVec3::ZERO, DVec3::Z, 1.0);
        assert_eq!(curve_sample_count(&line, 10, 20), 10);
        let n = curve_sample_count(&circle, 10, 20);
        assert!(n > 10 && n <= 20, "circle sample count {n}");
    }

    #[test]
    fn test_sample_parameters() {
        assert_eq!(sample_parameters((0.0, 1.0), 3, false), vec![0.0, 0.5, 1.0]);
        assert_eq!(sample_parameters((0.0, 4.0), 4, true), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(sample_parameters((0.0, 2.0), 1, false), vec![1.0]);
    }
}
