//! Elliptical arc curve.

use std::f64::consts::TAU;

use prox_core::traits::{BoundingBox, Validate};
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Frame3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricCurve;
use crate::analytic::{arc_bounds, cos_sin_derivative};

/// An elliptical arc in the xy-plane of `frame`, major axis along `frame.x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipticalArc {
    pub frame: Frame3,
    pub major_radius: f64,
    pub minor_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl EllipticalArc {
    pub fn new(
        frame: Frame3,
        major_radius: f64,
        minor_radius: f64,
        start_angle: f64,
        end_angle: f64,
    ) -> Self {
        Self {
            frame,
            major_radius,
            minor_radius,
            start_angle,
            end_angle,
        }
    }

    pub fn full(frame: Frame3, major_radius: f64, minor_radius: f64) -> Self {
        Self::new(frame, major_radius, minor_radius, 0.0, TAU)
    }

    fn semi_axes(&self) -> (Vector3, Vector3) {
        (
            self.major_radius * self.frame.x,
            self.minor_radius * self.frame.y,
        )
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            frame: self.frame.transformed(transform),
            ..self.clone()
        }
    }
}

impl ParametricCurve for EllipticalArc {
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        let (a, b) = self.semi_axes();
        let mut ders: Vec<Vector3> = (0..=order)
            .map(|k| {
                let (c, s) = cos_sin_derivative(t, k);
                c * a + s * b
            })
            .collect();
        ders[0] += self.frame.origin;
        ders
    }

    fn domain(&self) -> (f64, f64) {
        (self.start_angle, self.end_angle)
    }

    fn is_periodic(&self) -> bool {
        self.end_angle - self.start_angle >= TAU - 1e-12
    }
}

impl Validate for EllipticalArc {
    fn validate(&self) -> Result<()> {
        for (name, r) in [("major", self.major_radius), ("minor", self.minor_radius)] {
            if !(r.is_finite() && r > 0.0) {
                return Err(ProxError::DegenerateGeometry(format!(
                    "ellipse {name} radius must be positive, got {r}"
                )));
            }
        }
        if !(self.end_angle > self.start_angle) {
            return Err(ProxError::DegenerateGeometry(format!(
                "ellipse arc has empty sweep [{}, {}]",
                self.start_angle, self.end_angle
            )));
        }
        Ok(())
    }
}

impl BoundingBox for EllipticalArc {
    type Bounds = Aabb3;

    fn bounding_box(&self) -> Aabb3 {
        let (a, b) = self.semi_axes();
        arc_bounds(self.frame.origin, a, b, self.start_angle, self.end_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_math::DVec3;
    use std::f64::consts::PI;

    #[test]
    fn test_ellipse_points() {
        let ellipse = EllipticalArc::full(Frame3::world(), 3.0, 1.0);
        let p0 = ellipse.point_at(0.0);
        assert!((p0 - DVec3::new(3.0, 0.0, 0.0)).length() < 1e-10);
        let p1 = ellipse.point_at(PI / 2.0);
        assert!((p1 - DVec3::new(0.0, 1.0, 0.0)).length() < 1e-10);
        assert!(ellipse.is_periodic());
    }

    #[test]
    fn test_ellipse_bounds_exact() {
        let ellipse = EllipticalArc::full(Frame3::world(), 3.0, 1.0);
        let aabb = ellipse.bounding_box();
        assert!((aabb.min - DVec3::new(-3.0, -1.0, 0.0)).length() < 1e-10);
        assert!((aabb.max - DVec3::new(3.0, 1.0, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_ellipse_derivative_finite_difference() {
        let frame = Frame3::new(DVec3::ONE, DVec3::new(1.0, 1.0, 0.0), DVec3::Z).unwrap();
        let ellipse = EllipticalArc::new(frame, 2.0, 0.5, 0.0, 2.0);
        let h = 1e-6;
        let t = 0.8;
        let fd = (ellipse.point_at(t + h) - ellipse.point_at(t - h)) / (2.0 * h);
        assert!((ellipse.tangent_at(t) - fd).length() < 1e-6);
    }
}
