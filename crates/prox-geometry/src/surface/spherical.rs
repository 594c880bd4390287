//! Spherical surface.

use std::f64::consts::{FRAC_PI_2, TAU};

use prox_core::traits::Validate;
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Frame3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::{radial, zero_derivatives, ParametricSurface};
use crate::analytic::{cos_sin_derivative, cos_sin_range, revolved_bounds};

/// A sphere centered at its frame origin.
///
/// `u` is longitude in `[0, 2*PI]`, `v` latitude in `[-PI/2, PI/2]`:
/// `P(u, v) = center + radius * (cos(v) * radial(u) + sin(v) * z)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub frame: Frame3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(frame: Frame3, radius: f64) -> Self {
        Self { frame, radius }
    }

    pub fn center(&self) -> prox_math::Point3 {
        self.frame.origin
    }

    pub fn patch_bounds(&self, (u0, u1): (f64, f64), (v0, v1): (f64, f64)) -> Aabb3 {
        let ((cmin, cmax), (smin, smax)) = cos_sin_range(v0, v1);
        let r = self.radius;
        revolved_bounds(&self.frame, (r * cmin, r * cmax), (r * smin, r * smax), u0, u1)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(self.frame.transformed(transform), self.radius)
    }
}

impl ParametricSurface for Sphere {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let mut d = zero_derivatives(order);
        for k in 0..=order {
            let radial_k = radial(&self.frame, u, k);
            for l in 0..=(order - k) {
                let (cv, sv) = cos_sin_derivative(v, l);
                let mut val = cv * radial_k;
                if k == 0 {
                    val += sv * self.frame.z;
                }
                d[k][l] = self.radius * val;
            }
        }
        d[0][0] += self.frame.origin;
        d
    }

    fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        let (s, c) = v.sin_cos();
        c * radial(&self.frame, u, 0) + s * self.frame.z
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn domain_v(&self) -> (f64, f64) {
        (-FRAC_PI_2, FRAC_PI_2)
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }
}

impl Validate for Sphere {
    fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ProxError::DegenerateGeometry(format!(
                "sphere radius must be positive, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}
