//! Planar surface.

use prox_math::{Aabb3, Frame3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::{zero_derivatives, ParametricSurface};

/// A planar surface parameterized by `origin + u * x + v * y` of its frame.
///
/// The domain defaults to `[-1e6, 1e6]` in both u and v (effectively infinite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub frame: Frame3,
}

impl Plane {
    pub fn new(frame: Frame3) -> Self {
        Self { frame }
    }

    /// XY plane centered at origin.
    pub fn xy() -> Self {
        Self::new(Frame3::world())
    }

    /// Local coordinates `(u, v, height)` of a point relative to the plane.
    pub fn project(&self, p: Point3) -> Vector3 {
        self.frame.to_local(p)
    }

    pub fn patch_bounds(&self, (u0, u1): (f64, f64), (v0, v1): (f64, f64)) -> Aabb3 {
        self.frame
            .aabb_of_local(Vector3::new(u0, v0, 0.0), Vector3::new(u1, v1, 0.0))
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(self.frame.transformed(transform))
    }
}

impl ParametricSurface for Plane {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let mut d = zero_derivatives(order);
        d[0][0] = self.frame.origin + u * self.frame.x + v * self.frame.y;
        if order >= 1 {
            d[1][0] = self.frame.x;
            d[0][1] = self.frame.y;
        }
        d
    }

    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.frame.origin + u * self.frame.x + v * self.frame.y
    }

    fn normal_at(&self, _u: f64, _v: f64) -> Vector3 {
        self.frame.z
    }

    fn domain_u(&self) -> (f64, f64) {
        (-1e6, 1e6)
    }

    fn domain_v(&self) -> (f64, f64) {
        (-1e6, 1e6)
    }
}
