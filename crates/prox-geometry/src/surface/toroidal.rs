//! Toroidal surface.

use std::f64::consts::TAU;

use prox_core::traits::Validate;
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Frame3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::{radial, zero_derivatives, ParametricSurface};
use crate::analytic::{cos_sin_derivative, cos_sin_range, revolved_bounds};

/// A torus around the z axis of its frame.
///
/// `P(u, v) = center + (R + r cos v) * radial(u) + r sin v * z`,
/// periodic in both `u` and `v`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Torus {
    pub frame: Frame3,
    pub major_radius: f64,
    pub minor_radius: f64,
}

impl Torus {
    pub fn new(frame: Frame3, major_radius: f64, minor_radius: f64) -> Self {
        Self {
            frame,
            major_radius,
            minor_radius,
        }
    }

    pub fn patch_bounds(&self, (u0, u1): (f64, f64), (v0, v1): (f64, f64)) -> Aabb3 {
        let ((cmin, cmax), (smin, smax)) = cos_sin_range(v0, v1);
        let (big, small) = (self.major_radius, self.minor_radius);
        revolved_bounds(
            &self.frame,
            (big + small * cmin, big + small * cmax),
            (small * smin, small * smax),
            u0,
            u1,
        )
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            frame: self.frame.transformed(transform),
            ..self.clone()
        }
    }
}

impl ParametricSurface for Torus {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let mut d = zero_derivatives(order);
        for k in 0..=order {
            let radial_k = radial(&self.frame, u, k);
            for l in 0..=(order - k) {
                let (cv, sv) = cos_sin_derivative(v, l);
                let mut val = self.minor_radius * cv * radial_k;
                if l == 0 {
                    val += self.major_radius * radial_k;
                }
                if k == 0 {
                    val += self.minor_radius * sv * self.frame.z;
                }
                d[k][l] = val;
            }
        }
        d[0][0] += self.frame.origin;
        d
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }

    fn period_v(&self) -> Option<f64> {
        Some(TAU)
    }
}

impl Validate for Torus {
    fn validate(&self) -> Result<()> {
        if !(self.minor_radius.is_finite() && self.minor_radius > 0.0) {
            return Err(ProxError::DegenerateGeometry(format!(
                "torus minor radius must be positive, got {}",
                self.minor_radius
            )));
        }
        if !(self.major_radius.is_finite() && self.major_radius > 0.0) {
            return Err(ProxError::DegenerateGeometry(format!(
                "torus major radius must be positive, got {}",
                self.major_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_toroidal_outer_point() {
        let torus = Torus::new(Frame3::world(), 5.0, 1.0);
        let p = torus.point_at(0.0, 0.0);
        let r_xy = (p.x * p.x + p.y * p.y).sqrt();
        assert!((r_xy - 6.0).abs() < 1e-10, "Outer radius should be R + r");
    }

    #[test]
    fn test_toroidal_inner_point() {
        let torus = Torus::new(Frame3::world(), 5.0, 1.0);
        let p = torus.point_at(0.0, PI);
        let r_xy = (p.x * p.x + p.y * p.y).sqrt();
        assert!((r_xy - 4.0).abs() < 1e-10, "Inner radius should be R - r");
    }
}
