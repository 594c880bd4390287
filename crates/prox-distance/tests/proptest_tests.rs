//! Property-based tests for proximity query invariants using `proptest`.

use proptest::prelude::*;

use prox_core::traits::BoundingBox;
use prox_distance::curve::segment_segment;
use prox_distance::face::face_face;
use prox_distance::point::{point_arc, point_segment};
use prox_distance::shell::shell_shell;
use prox_distance::{proximity, Entity, ProximityConfig};
use prox_geometry::curve::{BSplineCurve, CircularArc, Curve, EllipticalArc, LineSegment};
use prox_geometry::nurbs::KnotVector;
use prox_geometry::surface::{BSplineSurface, Cylinder, Plane, Sphere, Torus};
use prox_geometry::{ParametricCurve, Surface};
use prox_math::{Aabb3, DVec2, DVec3, Frame3, Transform};
use prox_topology::{Face, Shell};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Point in a modest cube around the origin.
fn arb_point() -> impl Strategy<Value = DVec3> {
    (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

/// Segment with a length bounded away from zero.
fn arb_segment() -> impl Strategy<Value = LineSegment> {
    (arb_point(), arb_point())
        .prop_filter("segment too short", |(a, b)| a.distance(*b) > 1e-3)
        .prop_map(|(a, b)| LineSegment::new(a, b))
}

/// Unit direction from spherical angles.
fn arb_direction() -> impl Strategy<Value = DVec3> {
    (0.0f64..std::f64::consts::TAU, -1.0f64..1.0).prop_map(|(phi, z)| {
        let r = (1.0 - z * z).sqrt();
        DVec3::new(r * phi.cos(), r * phi.sin(), z)
    })
}

/// Arc with radius in `[0.5, 5)` and sweep below a full turn.
fn arb_arc() -> impl Strategy<Value = CircularArc> {
    (arb_point(), arb_direction(), 0.5f64..5.0, -3.0f64..3.0, 0.1f64..6.0).prop_map(
        |(center, normal, radius, start, sweep)| {
            CircularArc::new(Frame3::from_normal(center, normal), radius, start, start + sweep)
        },
    )
}

/// Planar square of half-width `half` in a random frame.
fn arb_square() -> impl Strategy<Value = Face> {
    (arb_point(), arb_direction(), 0.2f64..3.0).prop_map(|(center, normal, half)| {
        let plane = Plane::new(Frame3::from_normal(center, normal));
        Face::rectangle(Surface::from(plane), (-half, half), (-half, half))
            .expect("positive half-width")
    })
}

/// Axis-aligned cuboid as (min corner, size).
fn arb_cuboid() -> impl Strategy<Value = (DVec3, DVec3)> {
    (
        arb_point(),
        (0.2f64..4.0, 0.2f64..4.0, 0.2f64..4.0).prop_map(|(x, y, z)| DVec3::new(x, y, z)),
    )
}

/// Random frame: origin in the cube, random z axis.
fn arb_frame() -> impl Strategy<Value = Frame3> {
    (arb_point(), arb_direction()).prop_map(|(origin, normal)| Frame3::from_normal(origin, normal))
}

/// Closed ellipse with semi-axes in `[0.5, 4)`.
fn arb_ellipse() -> impl Strategy<Value = EllipticalArc> {
    (arb_frame(), 1.0f64..4.0, 0.2f64..1.0)
        .prop_map(|(frame, major, ratio)| EllipticalArc::full(frame, major, major * ratio))
}

/// Clamped cubic through six random control points.
fn arb_spline() -> impl Strategy<Value = BSplineCurve> {
    prop::collection::vec(arb_point(), 6).prop_map(|cps| {
        BSplineCurve::new(3, KnotVector::uniform_clamped(3, 6), cps).expect("clamped cubic")
    })
}

fn arb_curve() -> impl Strategy<Value = Curve> {
    prop_oneof![
        arb_arc().prop_map(Curve::from),
        arb_ellipse().prop_map(Curve::from),
        arb_spline().prop_map(Curve::from),
    ]
}

/// Cylinder patch below a full turn.
fn arb_cylinder_patch() -> impl Strategy<Value = Face> {
    (arb_frame(), 0.5f64..3.0, -3.0f64..3.0, 0.3f64..4.0, -2.0f64..2.0, 0.3f64..3.0).prop_map(
        |(frame, radius, u0, du, v0, dv)| {
            Face::rectangle(Surface::from(Cylinder::new(frame, radius)), (u0, u0 + du), (v0, v0 + dv))
                .expect("non-empty patch")
        },
    )
}

/// Sphere patch clear of the poles.
fn arb_sphere_patch() -> impl Strategy<Value = Face> {
    (arb_frame(), 0.5f64..3.0, -3.0f64..3.0, 0.3f64..4.0, -1.4f64..0.5, 0.2f64..0.9).prop_map(
        |(frame, radius, u0, du, v0, dv)| {
            Face::rectangle(Surface::from(Sphere::new(frame, radius)), (u0, u0 + du), (v0, v0 + dv))
                .expect("non-empty patch")
        },
    )
}

/// Torus patch below a full turn in either direction.
fn arb_torus_patch() -> impl Strategy<Value = Face> {
    (
        arb_frame(),
        2.0f64..4.0,
        0.3f64..1.0,
        (-3.0f64..3.0, 0.3f64..4.0),
        (-3.0f64..3.0, 0.3f64..4.0),
    )
        .prop_map(|(frame, major, minor, (u0, du), (v0, dv))| {
            let torus = Torus::new(frame, major, minor);
            Face::rectangle(Surface::from(torus), (u0, u0 + du), (v0, v0 + dv))
                .expect("non-empty patch")
        })
}

/// Bicubic height field over a 3 x 3 square.
fn arb_spline_patch() -> impl Strategy<Value = Face> {
    (arb_point(), prop::collection::vec(-1.0f64..1.0, 16)).prop_map(|(origin, heights)| {
        let net = (0..4)
            .map(|i| {
                (0..4)
                    .map(|j| origin + DVec3::new(i as f64, j as f64, heights[4 * i + j]))
                    .collect()
            })
            .collect();
        let surface = BSplineSurface::new(
            3,
            3,
            KnotVector::uniform_clamped(3, 4),
            KnotVector::uniform_clamped(3, 4),
            net,
        )
        .expect("bicubic net");
        Face::rectangle(Surface::from(surface), (0.0, 1.0), (0.0, 1.0)).expect("unit patch")
    })
}

fn arb_curved_face() -> impl Strategy<Value = Face> {
    prop_oneof![
        arb_cylinder_patch(),
        arb_sphere_patch(),
        arb_torus_patch(),
        arb_spline_patch(),
    ]
}

/// Cuboid under a random rotation.
fn arb_rotated_cuboid() -> impl Strategy<Value = Shell> {
    (arb_cuboid(), arb_direction(), -3.0f64..3.0).prop_map(|((min, size), axis, angle)| {
        Shell::cuboid(min, min + size)
            .expect("positive size")
            .transformed(&Transform::rotation(min, axis, angle))
    })
}

fn dist(a: Entity<'_>, b: Entity<'_>) -> f64 {
    proximity(a, b, &ProximityConfig::default())
        .expect("valid entities")
        .distance
}

const TOL: f64 = 1e-9;

/// Slack for results of iterative searches.
const SEARCH_TOL: f64 = 1e-6;

// ---------------------------------------------------------------------------
// 1. Segment distance symmetry: d(a, b) == d(b, a)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn segment_distance_symmetry(a in arb_segment(), b in arb_segment()) {
        let ab = segment_segment(&a, &b);
        let ba = segment_segment(&b, &a);
        prop_assert!((ab.distance - ba.distance).abs() < TOL,
            "d(a,b)={} != d(b,a)={}", ab.distance, ba.distance);
        prop_assert!(ab.distance >= 0.0);
    }
}

// ---------------------------------------------------------------------------
// 2. Witnesses realize the distance and lie on their segments
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn segment_witnesses_realize_distance(a in arb_segment(), b in arb_segment()) {
        let prox = segment_segment(&a, &b);
        let (p, q) = prox.points();
        prop_assert!((p.distance(q) - prox.distance).abs() < TOL);
        prop_assert!(point_segment(p, &a).distance < 1e-7);
        prop_assert!(point_segment(q, &b).distance < 1e-7);
    }
}

// ---------------------------------------------------------------------------
// 3. Triangle inequality: d(p, S) <= |p - q| + d(q, S)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn point_segment_triangle_inequality(
        p in arb_point(),
        q in arb_point(),
        s in arb_segment(),
    ) {
        let dp = point_segment(p, &s).distance;
        let dq = point_segment(q, &s).distance;
        prop_assert!(dp <= p.distance(q) + dq + TOL,
            "d(p,S)={} > |p-q|+d(q,S)={}", dp, p.distance(q) + dq);
    }
}

// ---------------------------------------------------------------------------
// 4. Point to arc: zero on the arc, never above sampled distances
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn point_on_arc_has_zero_distance(arc in arb_arc(), s in 0.0f64..1.0) {
        let (lo, hi) = arc.domain();
        let on = arc.point_at(lo + s * (hi - lo));
        prop_assert!(point_arc(on, &arc).distance < 1e-9);
    }

    #[test]
    fn point_arc_below_samples(arc in arb_arc(), p in arb_point()) {
        let prox = point_arc(p, &arc);
        let (lo, hi) = arc.domain();
        for i in 0..=64 {
            let sample = arc.point_at(lo + (hi - lo) * i as f64 / 64.0);
            prop_assert!(prox.distance <= p.distance(sample) + TOL);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Face boxes bound face distances from below
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn face_box_distance_is_lower_bound(a in arb_square(), b in arb_square()) {
        let prox = face_face(&a, &b, &ProximityConfig::default());
        let lower = a.bounding_box().distance(&b.bounding_box());
        prop_assert!(lower <= prox.distance + 1e-9,
            "box distance {} exceeds face distance {}", lower, prox.distance);
        prop_assert!(prox.distance >= 0.0);
    }
}

// ---------------------------------------------------------------------------
// 6. Separated axis-aligned cuboids: shell distance equals box distance,
//    and is unchanged by a rigid motion applied to both
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn cuboid_distance_matches_boxes(
        (min_a, size_a) in arb_cuboid(),
        (min_b, size_b) in arb_cuboid(),
    ) {
        let a = Shell::cuboid(min_a, min_a + size_a).expect("positive size");
        let b = Shell::cuboid(min_b, min_b + size_b).expect("positive size");
        let expected = Aabb3::new(min_a, min_a + size_a).distance(&Aabb3::new(min_b, min_b + size_b));

        // Nested boxes have disjoint surfaces, so only separated pairs compare
        prop_assume!(expected > 0.1);

        let prox = shell_shell(&a, &b, &ProximityConfig::default()).expect("cuboids have faces");
        prop_assert!((prox.distance - expected).abs() < 1e-7,
            "shell distance {} vs box distance {}", prox.distance, expected);
    }

    #[test]
    fn cuboid_distance_is_rigid_invariant(
        (min_a, size_a) in arb_cuboid(),
        offset in arb_point(),
        axis in arb_direction(),
        angle in -3.0f64..3.0,
    ) {
        let a = Shell::cuboid(min_a, min_a + size_a).expect("positive size");
        let b = a.transformed(&Transform::from_translation(offset + DVec3::splat(16.0)));
        let motion = Transform::rotation(DVec3::new(1.0, -2.0, 0.5), axis, angle);

        let config = ProximityConfig::default();
        let before = shell_shell(&a, &b, &config).expect("cuboids have faces");
        let after = shell_shell(&a.transformed(&motion), &b.transformed(&motion), &config)
            .expect("cuboids have faces");
        prop_assert!((before.distance - after.distance).abs() < 1e-7,
            "distance changed from {} to {} under a rigid motion", before.distance, after.distance);
    }
}

// ---------------------------------------------------------------------------
// 7. Symmetry through the query entry point: curves, curved faces, shells
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn curve_curve_symmetry(a in arb_curve(), b in arb_curve()) {
        let ab = dist(Entity::from(&a), Entity::from(&b));
        let ba = dist(Entity::from(&b), Entity::from(&a));
        prop_assert!((ab - ba).abs() < SEARCH_TOL, "d(a,b)={} != d(b,a)={}", ab, ba);
    }

    #[test]
    fn curved_face_face_symmetry(a in arb_curved_face(), b in arb_curved_face()) {
        let ab = dist(Entity::from(&a), Entity::from(&b));
        let ba = dist(Entity::from(&b), Entity::from(&a));
        prop_assert!((ab - ba).abs() < SEARCH_TOL, "d(a,b)={} != d(b,a)={}", ab, ba);
    }

    #[test]
    fn curve_face_symmetry(c in arb_curve(), f in arb_curved_face()) {
        let cf = proximity(Entity::from(&c), Entity::from(&f), &ProximityConfig::default())
            .expect("valid entities");
        let fc = proximity(Entity::from(&f), Entity::from(&c), &ProximityConfig::default())
            .expect("valid entities");
        prop_assert!((cf.distance - fc.distance).abs() < SEARCH_TOL);
        // Witnesses follow the argument order
        prop_assert!(cf.first.point.distance(fc.second.point) < SEARCH_TOL);
        prop_assert!(cf.second.point.distance(fc.first.point) < SEARCH_TOL);
    }

    #[test]
    fn shell_shell_symmetry(a in arb_rotated_cuboid(), b in arb_rotated_cuboid()) {
        let ab = dist(Entity::from(&a), Entity::from(&b));
        let ba = dist(Entity::from(&b), Entity::from(&a));
        prop_assert!((ab - ba).abs() < SEARCH_TOL, "d(a,b)={} != d(b,a)={}", ab, ba);
    }
}

// ---------------------------------------------------------------------------
// 8. Identity: every entity is at distance zero from itself
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn curve_self_distance_is_zero(c in arb_curve()) {
        let d = dist(Entity::from(&c), Entity::from(&c));
        prop_assert!(d <= ProximityConfig::default().tolerance, "d(c,c)={}", d);
    }

    #[test]
    fn curved_face_self_distance_is_zero(f in arb_curved_face()) {
        let d = dist(Entity::from(&f), Entity::from(&f));
        prop_assert!(d <= ProximityConfig::default().tolerance, "d(f,f)={}", d);
    }

    #[test]
    fn shell_self_distance_is_zero(s in arb_rotated_cuboid()) {
        let d = dist(Entity::from(&s), Entity::from(&s));
        prop_assert!(d <= ProximityConfig::default().tolerance, "d(s,s)={}", d);
    }
}

// ---------------------------------------------------------------------------
// 9. Triangle inequalities with curves and faces as the measured sets:
//    d(p, X) <= |p - q| + d(q, X), and d(A, C) <= d(A, B) + diam(B) + d(B, C)
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn point_curve_triangle_inequality(p in arb_point(), q in arb_point(), c in arb_curve()) {
        let dp = dist(Entity::Point(p), Entity::from(&c));
        let dq = dist(Entity::Point(q), Entity::from(&c));
        prop_assert!(dp <= p.distance(q) + dq + SEARCH_TOL,
            "d(p,C)={} > |p-q|+d(q,C)={}", dp, p.distance(q) + dq);
    }

    #[test]
    fn point_face_triangle_inequality(p in arb_point(), q in arb_point(), f in arb_curved_face()) {
        let dp = dist(Entity::Point(p), Entity::from(&f));
        let dq = dist(Entity::Point(q), Entity::from(&f));
        prop_assert!(dp <= p.distance(q) + dq + SEARCH_TOL,
            "d(p,F)={} > |p-q|+d(q,F)={}", dp, p.distance(q) + dq);
    }

    #[test]
    fn curve_between_faces_triangle_inequality(
        a in arb_curved_face(),
        c in arb_curve(),
        b in arb_curved_face(),
    ) {
        let ab = dist(Entity::from(&a), Entity::from(&b));
        let ac = dist(Entity::from(&a), Entity::from(&c));
        let cb = dist(Entity::from(&c), Entity::from(&b));
        let diam = c.bounding_box().diagonal();
        prop_assert!(ab <= ac + diam + cb + SEARCH_TOL,
            "d(A,B)={} > d(A,C)+diam(C)+d(C,B)={}", ab, ac + diam + cb);
    }

    #[test]
    fn face_between_curves_triangle_inequality(
        a in arb_curve(),
        f in arb_curved_face(),
        b in arb_curve(),
    ) {
        let ab = dist(Entity::from(&a), Entity::from(&b));
        let af = dist(Entity::from(&a), Entity::from(&f));
        let fb = dist(Entity::from(&f), Entity::from(&b));
        let diam = f.bounding_box().diagonal();
        prop_assert!(ab <= af + diam + fb + SEARCH_TOL,
            "d(A,B)={} > d(A,F)+diam(F)+d(F,B)={}", ab, af + diam + fb);
    }
}

// ---------------------------------------------------------------------------
// 10. Curved face boxes: they contain the patch and bound distances from below
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn curved_face_box_contains_patch(f in arb_curved_face(), s in 0.0f64..1.0, t in 0.0f64..1.0) {
        let bb = f.bounding_box();
        let ((u0, u1), (v0, v1)) = f.param_bounds();
        let p = f.point_at(DVec2::new(u0 + s * (u1 - u0), v0 + t * (v1 - v0)));
        prop_assert!(bb.distance_to_point(p) < TOL, "{:?} outside {:?}", p, bb);
    }

    #[test]
    fn curved_face_box_distance_is_lower_bound(a in arb_curved_face(), b in arb_curved_face()) {
        let prox = face_face(&a, &b, &ProximityConfig::default());
        let lower = a.bounding_box().distance(&b.bounding_box());
        prop_assert!(lower <= prox.distance + TOL,
            "box distance {} exceeds face distance {}", lower, prox.distance);
    }
}
