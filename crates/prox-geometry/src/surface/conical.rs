//! Conical surface.

use std::f64::consts::{FRAC_PI_2, TAU};

use prox_core::traits::Validate;
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Frame3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::{radial, zero_derivatives, ParametricSurface};
use crate::analytic::revolved_bounds;

/// A conical surface parameterized by angle `u` in `[0, 2*PI]` and distance `v` from apex.
///
/// The apex is the frame origin and the axis its z direction:
/// `P(u, v) = apex + v * (sin(half_angle) * radial(u) + cos(half_angle) * axis)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cone {
    pub frame: Frame3,
    pub half_angle: f64,
}

impl Cone {
    pub fn new(frame: Frame3, half_angle: f64) -> Self {
        Self { frame, half_angle }
    }

    pub fn patch_bounds(&self, (u0, u1): (f64, f64), (v0, v1): (f64, f64)) -> Aabb3 {
        let (s, c) = self.half_angle.sin_cos();
        let rho = (v0 * s, v1 * s);
        let height = (v0 * c, v1 * c);
        revolved_bounds(
            &self.frame,
            (rho.0.min(rho.1), rho.0.max(rho.1)),
            (height.0.min(height.1), height.0.max(height.1)),
            u0,
            u1,
        )
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(self.frame.transformed(transform), self.half_angle)
    }
}

impl ParametricSurface for Cone {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let (s, c) = self.half_angle.sin_cos();
        let mut d = zero_derivatives(order);
        for k in 0..=order {
            let r = s * radial(&self.frame, u, k);
            d[k][0] = v * r;
            if k < order {
                d[k][1] = r;
            }
        }
        d[0][0] += self.frame.origin + v * c * self.frame.z;
        if order >= 1 {
            d[0][1] += c * self.frame.z;
        }
        d
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn domain_v(&self) -> (f64, f64) {
        (0.0, 1e6)
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }
}

impl Validate for Cone {
    fn validate(&self) -> Result<()> {
        if !(self.half_angle > 0.0 && self.half_angle < FRAC_PI_2) {
            return Err(ProxError::DegenerateGeometry(format!(
                "cone half angle must lie in (0, pi/2), got {}",
                self.half_angle
            )));
        }
        Ok(())
    }
}
