use prox_core::{ProxError, Result};
use serde::{Deserialize, Serialize};

use crate::{Aabb3, Point3, Transform, Vector3};

/// Right-handed orthonormal frame: an origin and three unit axes.
///
/// Analytic curves and surfaces are parameterized in a frame so that rigid
/// transforms move them without changing their parameterization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame3 {
    pub origin: Point3,
    pub x: Vector3,
    pub y: Vector3,
    pub z: Vector3,
}

impl Frame3 {
    /// Build a frame from an origin, an x direction and a direction in the
    /// xy-plane. `y_dir` is re-orthogonalized against `x_dir`.
    pub fn new(origin: Point3, x_dir: Vector3, y_dir: Vector3) -> Result<Self> {
        let x = x_dir.try_normalize().ok_or_else(|| {
            ProxError::DegenerateGeometry(format!("frame x axis {x_dir:?} has zero length"))
        })?;
        let z = x.cross(y_dir).try_normalize().ok_or_else(|| {
            ProxError::DegenerateGeometry(format!(
                "frame axes {x_dir:?} and {y_dir:?} are parallel"
            ))
        })?;
        let y = z.cross(x);
        Ok(Self { origin, x, y, z })
    }

    /// Global XYZ frame translated to `origin`.
    pub fn at(origin: Point3) -> Self {
        Self {
            origin,
            x: Vector3::X,
            y: Vector3::Y,
            z: Vector3::Z,
        }
    }

    pub fn world() -> Self {
        Self::at(Point3::ZERO)
    }

    /// Frame whose z axis is `normal`, with x chosen from the world axes.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Self {
        let z = normal.try_normalize().unwrap_or(Vector3::Z);
        // Choose a vector not parallel to the normal to build the frame
        let ref_vec = if z.x.abs() < 0.9 { Vector3::X } else { Vector3::Y };
        let x = ref_vec.cross(z).normalize();
        let y = z.cross(x);
        Self { origin, x, y, z }
    }

    /// Map local coordinates to global coordinates.
    pub fn to_global(&self, local: Vector3) -> Point3 {
        self.origin + self.vector_to_global(local)
    }

    pub fn vector_to_global(&self, local: Vector3) -> Vector3 {
        local.x * self.x + local.y * self.y + local.z * self.z
    }

    /// Map a global point to local coordinates.
    pub fn to_local(&self, global: Point3) -> Vector3 {
        let d = global - self.origin;
        Vector3::new(d.dot(self.x), d.dot(self.y), d.dot(self.z))
    }

    /// Apply a rigid transform to the frame.
    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            origin: transform.transform_point(self.origin),
            x: transform.transform_vector(self.x).normalize(),
            y: transform.transform_vector(self.y).normalize(),
            z: transform.transform_vector(self.z).normalize(),
        }
    }

    /// Global bounding box of a box given in local coordinates.
    pub fn aabb_of_local(&self, local_min: Vector3, local_max: Vector3) -> Aabb3 {
        let mut aabb = Aabb3::from_point(self.to_global(local_min));
        for i in 1..8 {
            let corner = Vector3::new(
                if i & 1 == 0 { local_min.x } else { local_max.x },
                if i & 2 == 0 { local_min.y } else { local_max.y },
                if i & 4 == 0 { local_min.z } else { local_max.z },
            );
            aabb.include_point(self.to_global(corner));
        }
        aabb
    }
}

impl Default for Frame3 {
    fn default() -> Self {
        Self::world()
    }
}
