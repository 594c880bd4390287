//! Cylindrical surface.

use std::f64::consts::TAU;

use prox_core::traits::Validate;
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Frame3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::{radial, zero_derivatives, ParametricSurface};
use crate::analytic::revolved_bounds;

/// A cylindrical surface around the z axis of its frame.
///
/// `P(u, v) = origin + radius * (cos(u) * x + sin(u) * y) + v * z`,
/// periodic in `u` over `[0, 2*PI]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cylinder {
    pub frame: Frame3,
    pub radius: f64,
}

impl Cylinder {
    pub fn new(frame: Frame3, radius: f64) -> Self {
        Self { frame, radius }
    }

    pub fn patch_bounds(&self, (u0, u1): (f64, f64), (v0, v1): (f64, f64)) -> Aabb3 {
        revolved_bounds(&self.frame, (self.radius, self.radius), (v0, v1), u0, u1)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(self.frame.transformed(transform), self.radius)
    }
}

impl ParametricSurface for Cylinder {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let mut d = zero_derivatives(order);
        for (k, row) in d.iter_mut().enumerate() {
            row[0] = self.radius * radial(&self.frame, u, k);
        }
        d[0][0] += self.frame.origin + v * self.frame.z;
        if order >= 1 {
            d[0][1] = self.frame.z;
        }
        d
    }

    fn domain_u(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn domain_v(&self) -> (f64, f64) {
        (-1e6, 1e6)
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }
}

impl Validate for Cylinder {
    fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ProxError::DegenerateGeometry(format!(
                "cylinder radius must be positive, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}
