//! Curve-curve minimum distance.

use prox_geometry::curve::{Curve, LineSegment};
use prox_geometry::ParametricCurve;
use tracing::instrument;

use crate::config::ProximityConfig;
use crate::pair;
use crate::patch::CurvePatch;
use crate::point::curve_kind;
use crate::result::{Parameter, Proximity, Quality, Witness};

/// Closest points of two segments in closed form.
///
/// Minimizes over the parameter square, clamping one parameter and
/// re-solving the other; parallel segments take `s = 0`.
pub fn segment_segment(a: &LineSegment, b: &LineSegment) -> Proximity {
    let d1 = a.direction();
    let d2 = b.direction();
    let r = a.start - b.start;
    let aa = d1.length_squared();
    let ee = d2.length_squared();
    let f = d2.dot(r);
    let eps = 1e-300;

    let (s, t) = if aa <= eps && ee <= eps {
        (0.0, 0.0)
    } else if aa <= eps {
        (0.0, (f / ee).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if ee <= eps {
            ((-c / aa).clamp(0.0, 1.0), 0.0)
        } else {
            let bb = d1.dot(d2);
            let denom = aa * ee - bb * bb;
            let mut s = if denom > 1e-12 * aa * ee {
                ((bb * f - c * ee) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (bb * s + f) / ee;
            if t < 0.0 {
                t = 0.0;
                s = (-c / aa).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((bb - c) / aa).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    Proximity::new(
        Witness::new(a.point_at(s), Parameter::Curve(s)),
        Witness::new(b.point_at(t), Parameter::Curve(t)),
        Quality::Converged,
    )
}

/// Minimum distance between two curves.
#[instrument(skip_all, fields(a = curve_kind(a), b = curve_kind(b)))]
pub fn curve_curve(a: &Curve, b: &Curve, config: &ProximityConfig) -> Proximity {
    match (a, b) {
        (Curve::Line(la), Curve::Line(lb)) => segment_segment(la, lb),
        _ => parametric_curve_curve(a, b, config),
    }
}

/// Multi-start search over both parameter ranges.
pub(crate) fn parametric_curve_curve(
    a: &dyn ParametricCurve,
    b: &dyn ParametricCurve,
    config: &ProximityConfig,
) -> Proximity {
    let pa = CurvePatch::new(a, config.pair_curve_samples);
    let pb = CurvePatch::new(b, config.pair_curve_samples);
    pair::search(&pa, &pb, config, "curve-curve").unwrap_or_else(|| {
        let (ta, _) = a.domain();
        let (tb, _) = b.domain();
        Proximity::new(
            Witness::new(a.point_at(ta), Parameter::Curve(ta)),
            Witness::new(b.point_at(tb), Parameter::Curve(tb)),
            Quality::Fallback,
        )
    })
}
