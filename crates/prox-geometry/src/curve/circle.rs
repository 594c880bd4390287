//! Circular arc curve.

use std::f64::consts::TAU;

use prox_core::traits::{BoundingBox, Validate};
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Frame3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricCurve;
use crate::analytic::{arc_bounds, cos_sin_derivative};

/// A circular arc lying in the xy-plane of `frame`, centered at its origin.
///
/// `P(t) = origin + radius * (cos(t) * x + sin(t) * y)` for `t` in
/// `[start_angle, end_angle]`. A sweep of 2π makes the arc a periodic
/// full circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircularArc {
    pub frame: Frame3,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl CircularArc {
    pub fn new(frame: Frame3, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            frame,
            radius,
            start_angle,
            end_angle,
        }
    }

    /// Full circle around `normal`, starting on an axis picked from the normal.
    pub fn full_circle(center: Point3, normal: Vector3, radius: f64) -> Self {
        Self::new(Frame3::from_normal(center, normal), radius, 0.0, TAU)
    }

    /// Arc from `start` through `interior` to `end`.
    pub fn from_three_points(start: Point3, interior: Point3, end: Point3) -> Result<Self> {
        let a = interior - start;
        let b = end - start;
        let w = a.cross(b);
        let w2 = w.length_squared();
        if w2 < 1e-24 {
            return Err(ProxError::DegenerateGeometry(format!(
                "arc points {start:?}, {interior:?}, {end:?} are collinear"
            )));
        }

        let center = start + (a.length_squared() * b - b.length_squared() * a).cross(w) / (2.0 * w2);
        let radius = start.distance(center);
        let frame = Frame3::new(center, start - center, w.cross(start - center))?;

        let local = frame.to_local(end);
        let mut end_angle = local.y.atan2(local.x).rem_euclid(TAU);
        if end_angle < 1e-12 {
            end_angle = TAU;
        }
        Ok(Self::new(frame, radius, 0.0, end_angle))
    }

    pub fn center(&self) -> Point3 {
        self.frame.origin
    }

    pub fn normal(&self) -> Vector3 {
        self.frame.z
    }

    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            frame: self.frame.transformed(transform),
            ..self.clone()
        }
    }
}

impl ParametricCurve for CircularArc {
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        let mut ders: Vec<Vector3> = (0..=order)
            .map(|k| {
                let (c, s) = cos_sin_derivative(t, k);
                self.radius * (c * self.frame.x + s * self.frame.y)
            })
            .collect();
        ders[0] += self.frame.origin;
        ders
    }

    fn domain(&self) -> (f64, f64) {
        (self.start_angle, self.end_angle)
    }

    fn is_periodic(&self) -> bool {
        self.sweep() >= TAU - 1e-12
    }
}

impl Validate for CircularArc {
    fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ProxError::DegenerateGeometry(format!(
                "arc radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.sweep() > 0.0) {
            return Err(ProxError::DegenerateGeometry(format!(
                "arc has empty sweep [{}, {}]",
                self.start_angle, self.end_angle
            )));
        }
        Ok(())
    }
}

impl BoundingBox for CircularArc {
    type Bounds = Aabb3;

    fn bounding_box(&self) -> Aabb3 {
        arc_bounds(
            self.frame.origin,
            self.radius * self.frame.x,
            self.radius * self.frame.y,
            self.start_angle,
            self.end_angle,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use prox_math::DVec3;

    #[test]
    fn test_circle_points_on_circle() {
        let circle = CircularArc::full_circle(DVec3::ZERO, DVec3::Z, 1.0);
        for i in 0..8 {
            let t = i as f64 * PI / 4.0;
            let p = circle.point_at(t);
            let dist = p.length();
            assert!(
                (dist - 1.0).abs() < 1e-10,
                "Point at t={} not on circle: dist={}",
                t,
                dist
            );
            assert!(p.z.abs() < 1e-10, "Point not in XY plane");
        }
    }

    #[test]
    fn test_circle_cardinal_points() {
        let circle = CircularArc::full_circle(DVec3::ZERO, DVec3::Z, 2.0);
        let (u, v) = (circle.frame.x, circle.frame.y);

        let p0 = circle.point_at(0.0);
        assert!((p0 - 2.0 * u).length() < 1e-10);

        let p1 = circle.point_at(PI / 2.0);
        assert!((p1 - 2.0 * v).length() < 1e-10);

        let p2 = circle.point_at(PI);
        assert!((p2 + 2.0 * u).length() < 1e-10);
    }

    #[test]
    fn test_circle_tangent_perpendicular() {
        let circle = CircularArc::full_circle(DVec3::ZERO, DVec3::Z, 1.0);
        for i in 0..8 {
            let t = i as f64 * PI / 4.0;
            let p = circle.point_at(t);
            let tang = circle.tangent_at(t);
            let dot = p.dot(tang);
            assert!(
                dot.abs() < 1e-10,
                "Tangent not perpendicular at t={}: dot={}",
                t,
                dot
            );
        }
    }

    #[test]
    fn test_second_derivative_points_to_center() {
        let arc = CircularArc::new(Frame3::at(DVec3::ONE), 3.0, 0.0, 1.0);
        let ders = arc.derivatives(0.4, 2);
        let inward = (arc.center() - ders[0]) / 3.0;
        assert!((ders[2] / 3.0 - inward).length() < 1e-12);
    }

    #[test]
    fn test_from_three_points() {
        let arc = CircularArc::from_three_points(
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
        )
        .unwrap();
        assert!((arc.radius - 1.0).abs() < 1e-12);
        assert!(arc.center().length() < 1e-12);
        assert!((arc.sweep() - PI).abs() < 1e-12);
        let mid = arc.point_at(arc.start_angle + arc.sweep() / 2.0);
        assert!((mid - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-12);
        assert!((arc.point_at(arc.end_angle) - DVec3::new(-1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_from_three_points_collinear() {
        let res = CircularArc::from_three_points(DVec3::ZERO, DVec3::X, DVec3::X * 2.0);
        assert!(matches!(res, Err(ProxError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_invalid_radius() {
        let arc = CircularArc::new(Frame3::world(), 0.0, 0.0, 1.0);
        assert!(arc.validate().is_err());
        let arc = CircularArc::new(Frame3::world(), 1.0, 1.0, 1.0);
        assert!(arc.validate().is_err());
    }
}
