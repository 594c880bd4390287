//! Shells: ordered collections of faces.

use prox_core::traits::Validate;
use prox_core::{ProxError, Result};
use prox_geometry::surface::Plane;
use prox_geometry::Surface;
use prox_math::{Frame3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::face::Face;

/// An ordered list of faces. No adjacency between faces is assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shell {
    faces: Vec<Face>,
}

impl Shell {
    pub fn new(faces: Vec<Face>) -> Result<Self> {
        let shell = Self { faces };
        shell.validate()?;
        Ok(shell)
    }

    /// Closed axis-aligned box from `min` to `max`, six planar faces.
    pub fn cuboid(min: Point3, max: Point3) -> Result<Self> {
        let size = max - min;
        if size.min_element() <= 0.0 {
            return Err(ProxError::DegenerateGeometry(format!(
                "cuboid from {min:?} to {max:?} has no volume"
            )));
        }

        // (origin, u axis, v axis, u extent, v extent)
        let sides = [
            (min, Vector3::Y, Vector3::X, size.y, size.x),
            (min + size.z * Vector3::Z, Vector3::X, Vector3::Y, size.x, size.y),
            (min, Vector3::X, Vector3::Z, size.x, size.z),
            (min + size.y * Vector3::Y, Vector3::Z, Vector3::X, size.z, size.x),
            (min, Vector3::Z, Vector3::Y, size.z, size.y),
            (min + size.x * Vector3::X, Vector3::Y, Vector3::Z, size.y, size.z),
        ];

        let faces = sides
            .into_iter()
            .map(|(origin, u_axis, v_axis, u_len, v_len)| {
                let plane = Plane::new(Frame3::new(origin, u_axis, v_axis)?);
                Face::rectangle(Surface::from(plane), (0.0, u_len), (0.0, v_len))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(faces)
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            faces: self.faces.iter().map(|f| f.transformed(transform)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_geometry::ParametricSurface;
    use prox_math::{DVec2, DVec3};

    #[test]
    fn test_cuboid_faces_cover_box() {
        let shell = Shell::cuboid(DVec3::ZERO, DVec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(shell.len(), 6);
        for face in shell.faces() {
            let ((u0, u1), (v0, v1)) = face.param_bounds();
            for (u, v) in [(u0, v0), (u1, v1), ((u0 + u1) / 2.0, (v0 + v1) / 2.0)] {
                let p = face.point_at(DVec2::new(u, v));
                assert!(p.x > -1e-12 && p.x < 1.0 + 1e-12);
                assert!(p.y > -1e-12 && p.y < 2.0 + 1e-12);
                assert!(p.z > -1e-12 && p.z < 3.0 + 1e-12);
            }
        }
    }

    #[test]
    fn test_cuboid_normals_point_outward() {
        let shell = Shell::cuboid(DVec3::ZERO, DVec3::ONE).unwrap();
        let center = DVec3::splat(0.5);
        for face in shell.faces() {
            let p = face.point_at(DVec2::splat(0.5));
            let n = face.surface().normal_at(0.5, 0.5);
            assert!(n.dot(p - center) > 0.0, "inward normal at {p:?}");
        }
    }

    #[test]
    fn test_empty_shell_rejected() {
        assert!(matches!(
            Shell::new(Vec::new()),
            Err(ProxError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_flat_cuboid_rejected() {
        assert!(Shell::cuboid(DVec3::ZERO, DVec3::new(1.0, 0.0, 1.0)).is_err());
    }
}
