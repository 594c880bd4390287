//! Distance from a point to points, curves and faces.

use std::f64::consts::TAU;

use prox_geometry::analytic::angle_in_sweep;
use prox_geometry::curve::{CircularArc, Curve, CurveOnSurface, LineSegment};
use prox_geometry::sample::{curve_sample_count, sample_parameters};
use prox_geometry::ParametricCurve;
use prox_math::Point3;
use prox_topology::Face;
use tracing::{debug, instrument, warn};

use crate::config::ProximityConfig;
use crate::optimize::scalar::minimize_bracketed;
use crate::pair;
use crate::patch::{FacePatch, ParamRange, PointPatch};
use crate::result::{closest, Parameter, Proximity, Quality, Witness};

pub fn point_point(p: Point3, q: Point3) -> Proximity {
    Proximity::new(Witness::point(p), Witness::point(q), Quality::Converged)
}

/// Orthogonal projection onto the segment, clamped to its ends.
pub fn point_segment(p: Point3, segment: &LineSegment) -> Proximity {
    let dir = segment.direction();
    let len2 = dir.length_squared();
    let t = if len2 > 0.0 {
        ((p - segment.start).dot(dir) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    on_curve(p, segment.point_at(t), t)
}

/// Radial projection onto the arc's circle, or the nearer arc end when the
/// projection falls outside the sweep.
pub fn point_arc(p: Point3, arc: &CircularArc) -> Proximity {
    let local = arc.frame.to_local(p);
    let (start, end) = arc.domain();

    // On the axis every point of the circle is equally close
    if local.truncate().length() < 1e-12 {
        return on_curve(p, arc.point_at(start), start);
    }

    let theta = local.y.atan2(local.x);
    if angle_in_sweep(theta, start, end) {
        let t = (start + (theta - start).rem_euclid(TAU)).min(end);
        return on_curve(p, arc.point_at(t), t);
    }

    let at_start = on_curve(p, arc.point_at(start), start);
    let at_end = on_curve(p, arc.point_at(end), end);
    at_start.min(at_end)
}

/// Closest point of any curve to `p`.
#[instrument(skip_all, fields(kind = curve_kind(curve)))]
pub fn point_curve(p: Point3, curve: &Curve, config: &ProximityConfig) -> Proximity {
    match curve {
        Curve::Line(line) => point_segment(p, line),
        Curve::Arc(arc) => point_arc(p, arc),
        _ => point_parametric_curve(p, curve, config),
    }
}

/// Bracketed search over the discrete local minima of uniform samples.
///
/// The best `config.seeds` local minima are each refined inside the bracket
/// formed by their neighbouring samples, so a shallow minimum next to an
/// inflection cannot capture the search.
pub(crate) fn point_parametric_curve(
    p: Point3,
    curve: &dyn ParametricCurve,
    config: &ProximityConfig,
) -> Proximity {
    let (lo, hi) = curve.domain();
    let range = ParamRange::new(lo, hi, curve.is_periodic());
    let samples = config.point_curve_samples;
    let n = curve_sample_count(curve, samples.min, samples.max);
    let ts = sample_parameters((lo, hi), n, range.periodic);
    let dist: Vec<f64> = ts.iter().map(|&t| curve.point_at(t).distance(p)).collect();

    let sample = |i: usize, quality: Quality| Proximity {
        quality,
        ..on_curve(p, curve.point_at(ts[i]), ts[i])
    };

    let minima = local_minima(&dist, range.periodic);
    let Some(&first) = minima.first() else {
        return on_curve(p, curve.point_at(lo), lo);
    };
    if dist[first] <= config.tolerance {
        debug!(distance = dist[first], "curve sample within tolerance");
        return sample(first, Quality::Converged);
    }

    let m = ts.len();
    let step = if m > 1 { ts[1] - ts[0] } else { hi - lo };
    let eval = |t: f64| {
        let d = curve.derivatives(t, 2);
        let r = d[0] - p;
        (0.5 * r.length_squared(), r.dot(d[1]), d[1].length_squared() + r.dot(d[2]))
    };

    let refined = minima.iter().take(config.seeds).map(|&i| {
        let bracket = if m == 1 {
            (lo, hi)
        } else if range.periodic {
            (ts[i] - step, ts[i] + step)
        } else {
            (ts[i.saturating_sub(1)], ts[(i + 1).min(m - 1)])
        };
        match minimize_bracketed(eval, bracket, config.tolerance * 1e-3, config.max_iterations) {
            Ok(min) => {
                debug!(iterations = min.iterations, t = min.t, "point-curve descent converged");
                let t = range.fit(min.t);
                on_curve(p, curve.point_at(t), t).min(sample(i, Quality::Converged))
            }
            Err(err) => {
                warn!(%err, "point-curve descent failed, keeping the seed sample");
                sample(i, Quality::Fallback)
            }
        }
    });

    closest(refined).unwrap_or_else(|| sample(first, Quality::Converged))
}

/// Closest point of a face to `p`, boundary included.
///
/// Planar faces project in closed form. Other surfaces run the grid-seeded
/// two-parameter search. Boundary curves always compete, which settles
/// optima the trimming cuts off.
#[instrument(skip_all)]
pub fn point_face(p: Point3, face: &Face, config: &ProximityConfig) -> Proximity {
    let interior = match face.surface().as_plane() {
        Some(plane) => {
            let uv = plane.project(p).truncate();
            if face.contains(uv) {
                return Proximity::new(
                    Witness::point(p),
                    Witness::new(face.point_at(uv), Parameter::Surface(uv)),
                    Quality::Converged,
                );
            }
            None
        }
        None => pair::search(&PointPatch(p), &FacePatch::new(face, config), config, "point-face"),
    };

    let boundary = face.loops().flat_map(|lp| lp.curves()).map(|curve| {
        let prox = match (face.surface().as_plane(), curve.as_line()) {
            (Some(_), Some(line)) => {
                let lifted = LineSegment::new(
                    face.point_at(line.start.truncate()),
                    face.point_at(line.end.truncate()),
                );
                point_segment(p, &lifted)
            }
            _ => {
                let lifted = CurveOnSurface::new(face.surface(), curve);
                point_parametric_curve(p, &lifted, config)
            }
        };
        prox.map_second(|w| w.on_boundary(curve))
    });

    closest(interior.into_iter().chain(boundary))
        .unwrap_or_else(|| point_point(p, face.point_at(face.outer().polygon()[0])))
}

fn on_curve(p: Point3, q: Point3, t: f64) -> Proximity {
    Proximity::new(
        Witness::point(p),
        Witness::new(q, Parameter::Curve(t)),
        Quality::Converged,
    )
}

/// Indices of samples no farther than their neighbours, nearest first.
fn local_minima(dist: &[f64], periodic: bool) -> Vec<usize> {
    let n = dist.len();
    let neighbour = |i: usize, offset: isize| -> f64 {
        let j = i as isize + offset;
        if (0..n as isize).contains(&j) {
            dist[j as usize]
        } else if periodic {
            dist[j.rem_euclid(n as isize) as usize]
        } else {
            f64::INFINITY
        }
    };
    let mut minima: Vec<usize> = (0..n)
        .filter(|&i| dist[i] <= neighbour(i, -1) && dist[i] <= neighbour(i, 1))
        .collect();
    minima.sort_by(|&a, &b| dist[a].total_cmp(&dist[b]).then(a.cmp(&b)));
    minima
}

pub(crate) fn curve_kind(curve: &Curve) -> &'static str {
    match curve {
        Curve::Line(_) => "line",
        Curve::Arc(_) => "arc",
        Curve::Ellipse(_) => "ellipse",
        Curve::BSpline(_) => "bspline",
        Curve::Nurbs(_) => "nurbs",
    }
}
