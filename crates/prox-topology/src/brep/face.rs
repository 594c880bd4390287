//! Bounded faces: a surface trimmed by an outer loop and optional holes.

use prox_core::traits::Validate;
use prox_core::Result;
use prox_geometry::curve::{Curve, CurveOnSurface, LineSegment};
use prox_geometry::{ParametricSurface, Surface};
use prox_math::{Point2, Point3, Transform};
use serde::{Deserialize, Serialize};

use super::loops::Loop;

/// Parametric slack when testing region membership.
pub const CONTAINMENT_TOLERANCE: f64 = 1e-9;

/// A surface bounded by loops in its parameter plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    surface: Surface,
    outer: Loop,
    #[serde(default)]
    inner: Vec<Loop>,
}

impl Face {
    /// Build a face. Holes must lie inside the outer loop without crossing it
    /// or each other.
    pub fn new(surface: Surface, outer: Loop, inner: Vec<Loop>) -> Result<Self> {
        let face = Self {
            surface,
            outer,
            inner,
        };
        face.validate()?;
        Ok(face)
    }

    /// Face over the parameter rectangle `u_range x v_range`.
    pub fn rectangle(surface: Surface, u_range: (f64, f64), v_range: (f64, f64)) -> Result<Self> {
        let (u0, u1) = u_range;
        let (v0, v1) = v_range;
        let corners = [
            Point2::new(u0, v0),
            Point2::new(u1, v0),
            Point2::new(u1, v1),
            Point2::new(u0, v1),
        ];
        let outer = Loop::new(
            (0..4)
                .map(|i| Curve::from(LineSegment::from_2d(corners[i], corners[(i + 1) % 4])))
                .collect(),
        )?;
        Self::new(surface, outer, Vec::new())
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn outer(&self) -> &Loop {
        &self.outer
    }

    pub fn inner(&self) -> &[Loop] {
        &self.inner
    }

    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        std::iter::once(&self.outer).chain(self.inner.iter())
    }

    /// Parameter rectangle enclosing the face region.
    pub fn param_bounds(&self) -> ((f64, f64), (f64, f64)) {
        let (min, max) = self.outer.param_bounds();
        ((min.x, max.x), (min.y, max.y))
    }

    /// Period of `u` when the face wraps all the way around a periodic surface.
    pub fn periodic_u(&self) -> Option<f64> {
        let ((u0, u1), _) = self.param_bounds();
        self.surface
            .period_u()
            .filter(|&p| u1 - u0 >= p - CONTAINMENT_TOLERANCE)
    }

    /// Period of `v` when the face wraps all the way around a periodic surface.
    pub fn periodic_v(&self) -> Option<f64> {
        let (_, (v0, v1)) = self.param_bounds();
        self.surface
            .period_v()
            .filter(|&p| v1 - v0 >= p - CONTAINMENT_TOLERANCE)
    }

    /// Shift periodic coordinates into the face's parameter rectangle.
    pub fn canonical(&self, uv: Point2) -> Point2 {
        let ((u0, _), (v0, _)) = self.param_bounds();
        let mut uv = uv;
        if let Some(p) = self.surface.period_u() {
            uv.x = u0 + (uv.x - u0).rem_euclid(p);
        }
        if let Some(p) = self.surface.period_v() {
            uv.y = v0 + (uv.y - v0).rem_euclid(p);
        }
        uv
    }

    /// Whether `uv` lies in the face region (boundary included).
    pub fn contains(&self, uv: Point2) -> bool {
        let uv = self.canonical(uv);
        self.outer.contains(uv, CONTAINMENT_TOLERANCE)
            && self.inner.iter().all(|hole| {
                hole.winding_number(uv) == 0
                    || hole.distance_to_boundary(uv) <= CONTAINMENT_TOLERANCE
            })
    }

    /// `uv` itself when inside the region, otherwise the nearest boundary point.
    pub fn project_inside(&self, uv: Point2) -> Point2 {
        let uv = self.canonical(uv);
        if self.contains(uv) {
            return uv;
        }
        self.loops()
            .map(|lp| lp.closest_boundary_point(uv))
            .min_by(|a, b| a.distance_squared(uv).total_cmp(&b.distance_squared(uv)))
            .unwrap_or(uv)
    }

    pub fn point_at(&self, uv: Point2) -> Point3 {
        self.surface.point_at(uv.x, uv.y)
    }

    /// Boundary curves lifted onto the surface, outer loop first.
    pub fn boundary_curves(&self) -> impl Iterator<Item = CurveOnSurface<'_>> {
        self.loops()
            .flat_map(|lp| lp.curves().iter())
            .map(move |curve| CurveOnSurface::new(&self.surface, curve))
    }

    /// Apply a rigid transform. The parameterization, and so the loops, are unchanged.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            surface: self.surface.transformed(transform),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_core::ProxError;
    use prox_geometry::surface::{Cylinder, Plane};
    use prox_math::{DVec2, DVec3, Frame3};
    use std::f64::consts::TAU;

    fn square(center: DVec2, half: f64) -> Loop {
        Loop::polygon_from_points(&[
            center + DVec2::new(-half, -half),
            center + DVec2::new(half, -half),
            center + DVec2::new(half, half),
            center + DVec2::new(-half, half),
        ])
        .unwrap()
    }

    #[test]
    fn test_rectangle_face() {
        let face = Face::rectangle(Surface::from(Plane::xy()), (-1.0, 1.0), (-1.0, 1.0)).unwrap();
        assert!(face.contains(DVec2::ZERO));
        assert!(!face.contains(DVec2::new(1.5, 0.0)));
        assert_eq!(face.boundary_curves().count(), 4);
        let p = face.project_inside(DVec2::new(3.0, 0.5));
        assert!((p - DVec2::new(1.0, 0.5)).length() < 1e-12);
    }

    #[test]
    fn test_hole_excluded() {
        let face = Face::new(
            Surface::from(Plane::xy()),
            square(DVec2::ZERO, 2.0),
            vec![square(DVec2::ZERO, 0.5)],
        )
        .unwrap();
        assert!(!face.contains(DVec2::ZERO));
        assert!(face.contains(DVec2::new(1.0, 1.0)));
        assert!(face.contains(DVec2::new(0.5, 0.0)));
        let p = face.project_inside(DVec2::new(0.1, 0.0));
        assert!((p - DVec2::new(0.5, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_hole_outside_rejected() {
        let res = Face::new(
            Surface::from(Plane::xy()),
            square(DVec2::ZERO, 1.0),
            vec![square(DVec2::new(5.0, 0.0), 0.5)],
        );
        assert!(matches!(res, Err(ProxError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_periodic_cylinder_face() {
        let surface = Surface::from(Cylinder::new(Frame3::world(), 1.0));
        let face = Face::rectangle(surface, (0.0, TAU), (0.0, 2.0)).unwrap();
        assert!(face.periodic_u().is_some());
        assert!(face.periodic_v().is_none());
        assert!(face.contains(DVec2::new(-0.5, 1.0)));
        assert!(face.contains(DVec2::new(TAU + 0.5, 1.0)));
    }

    #[test]
    fn test_partial_cylinder_not_periodic() {
        let surface = Surface::from(Cylinder::new(Frame3::world(), 1.0));
        let face = Face::rectangle(surface, (0.0, 1.0), (0.0, 2.0)).unwrap();
        assert!(face.periodic_u().is_none());
        assert!(!face.contains(DVec2::new(2.0, 1.0)));
    }

    #[test]
    fn test_transformed_keeps_parameters() {
        let face = Face::rectangle(Surface::from(Plane::xy()), (0.0, 1.0), (0.0, 1.0)).unwrap();
        let moved = face.transformed(&Transform::from_translation(DVec3::Z));
        let p = moved.point_at(DVec2::new(0.5, 0.5));
        assert!((p - DVec3::new(0.5, 0.5, 1.0)).length() < 1e-12);
        assert_eq!(moved.outer(), face.outer());
    }
}
