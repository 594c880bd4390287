//! Face-face and curve-face minimum distance.

use prox_core::traits::BoundingBox;
use prox_geometry::curve::{Curve, CurveOnSurface};
use prox_geometry::ParametricCurve;
use prox_math::Aabb3;
use prox_topology::Face;
use tracing::{debug, instrument};

use crate::config::ProximityConfig;
use crate::curve::parametric_curve_curve;
use crate::pair;
use crate::patch::{CurvePatch, FacePatch};
use crate::point::curve_kind;
use crate::result::{closest, Proximity};

/// Conservative box of a face boundary curve lifted onto the surface.
pub(crate) fn lifted_bounds(face: &Face, curve: &Curve) -> Aabb3 {
    let uv = curve.bounding_box();
    face.surface()
        .patch_bounds((uv.min.x, uv.max.x), (uv.min.y, uv.max.y))
}

/// Minimum distance between a curve and a face.
#[instrument(skip_all, fields(kind = curve_kind(curve)))]
pub fn curve_face(curve: &Curve, face: &Face, config: &ProximityConfig) -> Proximity {
    parametric_curve_face(curve, curve.bounding_box(), face, config)
}

/// Three-parameter search, then the face boundary curves whose boxes could
/// still beat the best distance found.
pub(crate) fn parametric_curve_face(
    curve: &dyn ParametricCurve,
    curve_box: Aabb3,
    face: &Face,
    config: &ProximityConfig,
) -> Proximity {
    let interior = pair::search(
        &CurvePatch::new(curve, config.pair_curve_samples),
        &FacePatch::new(face, config),
        config,
        "curve-face",
    );

    let mut best = interior;
    for edge in face.loops().flat_map(|lp| lp.curves()) {
        let cutoff = best.as_ref().map_or(f64::INFINITY, |b| b.distance);
        if cutoff <= config.tolerance {
            break;
        }
        if lifted_bounds(face, edge).distance(&curve_box) > cutoff {
            continue;
        }
        let lifted = CurveOnSurface::new(face.surface(), edge);
        let candidate =
            parametric_curve_curve(curve, &lifted, config).map_second(|w| w.on_boundary(edge));
        best = closest(best.into_iter().chain(Some(candidate)));
    }

    // A face always has at least one boundary curve
    best.unwrap_or_else(|| {
        let edge = &face.outer().curves()[0];
        parametric_curve_curve(curve, &CurveOnSurface::new(face.surface(), edge), config)
            .map_second(|w| w.on_boundary(edge))
    })
}

/// Minimum distance between two faces.
///
/// The four-parameter search covers interior optima; every boundary curve
/// of either face is then matched against the other face unless its box
/// is already farther than the best distance.
#[instrument(skip_all)]
pub fn face_face(a: &Face, b: &Face, config: &ProximityConfig) -> Proximity {
    let box_a = a.bounding_box();
    let box_b = b.bounding_box();

    let mut best = pair::search(
        &FacePatch::new(a, config),
        &FacePatch::new(b, config),
        config,
        "face-face",
    );

    let mut examined = 0usize;
    let mut pruned = 0usize;
    let sides = [(a, b, &box_b, false), (b, a, &box_a, true)];
    for (owner, other, other_box, swap) in sides {
        for edge in owner.loops().flat_map(|lp| lp.curves()) {
            let cutoff = best.as_ref().map_or(f64::INFINITY, |p| p.distance);
            if cutoff <= config.tolerance {
                break;
            }
            let edge_box = lifted_bounds(owner, edge);
            if edge_box.distance(other_box) > cutoff {
                pruned += 1;
                continue;
            }
            examined += 1;
            let lifted = CurveOnSurface::new(owner.surface(), edge);
            let candidate = parametric_curve_face(&lifted, edge_box, other, config)
                .map_first(|w| w.on_boundary(edge));
            let candidate = if swap { candidate.swapped() } else { candidate };
            best = closest(best.into_iter().chain(Some(candidate)));
        }
    }
    debug!(examined, pruned, "face boundary refinement");

    best.unwrap_or_else(|| {
        let edge = &a.outer().curves()[0];
        let lifted = CurveOnSurface::new(a.surface(), edge);
        parametric_curve_face(&lifted, lifted_bounds(a, edge), b, config)
            .map_first(|w| w.on_boundary(edge))
    })
}

/// [`face_face`] unless the boxes are farther apart than `cutoff`.
pub fn face_face_within(
    a: &Face,
    b: &Face,
    cutoff: f64,
    config: &ProximityConfig,
) -> Option<Proximity> {
    if a.bounding_box().distance(&b.bounding_box()) > cutoff {
        return None;
    }
    Some(face_face(a, b, config))
}
