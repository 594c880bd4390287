//! Line segment curve.

use prox_core::traits::{BoundingBox, Validate};
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Point2, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricCurve;

/// A line segment from `start` to `end`, parameterized over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point3,
    pub end: Point3,
}

impl LineSegment {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Segment in the z = 0 plane.
    pub fn from_2d(start: Point2, end: Point2) -> Self {
        Self::new(start.extend(0.0), end.extend(0.0))
    }

    pub fn direction(&self) -> Vector3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self::new(
            transform.transform_point(self.start),
            transform.transform_point(self.end),
        )
    }
}

impl ParametricCurve for LineSegment {
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        let mut ders = vec![Vector3::ZERO; order + 1];
        ders[0] = self.start + t * self.direction();
        if order >= 1 {
            ders[1] = self.direction();
        }
        ders
    }

    fn point_at(&self, t: f64) -> Point3 {
        self.start + t * (self.end - self.start)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }
}

impl Validate for LineSegment {
    fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ProxError::DegenerateGeometry(
                "line segment has non-finite endpoints".into(),
            ));
        }
        if self.length() < 1e-12 {
            return Err(ProxError::DegenerateGeometry(format!(
                "zero-length line segment at {:?}",
                self.start
            )));
        }
        Ok(())
    }
}

impl BoundingBox for LineSegment {
    type Bounds = Aabb3;

    fn bounding_box(&self) -> Aabb3 {
        let mut aabb = Aabb3::from_point(self.start);
        aabb.include_point(self.end);
        aabb
    }
}
