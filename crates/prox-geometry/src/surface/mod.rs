//! Surface traits and implementations.

mod bspline;
mod conical;
mod cylindrical;
mod planar;
mod spherical;
mod toroidal;

use prox_core::traits::Validate;
use prox_core::Result;
use prox_math::{Aabb3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

pub use bspline::{BSplineSurface, NurbsSurface};
pub use conical::Cone;
pub use cylindrical::Cylinder;
pub use planar::Plane;
pub use spherical::Sphere;
pub use toroidal::Torus;

/// Parametric surface in 3D space.
pub trait ParametricSurface: Send + Sync {
    /// Mixed partial derivatives up to total order `order`.
    ///
    /// `d[k][l]` is d^(k+l) S / du^k dv^l; `d[0][0]` is the point. The
    /// result is `(order + 1) x (order + 1)`, entries with `k + l > order`
    /// are zero.
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>>;

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (f64, f64);

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (f64, f64);

    fn period_u(&self) -> Option<f64> {
        None
    }

    fn period_v(&self) -> Option<f64> {
        None
    }

    /// Evaluate the surface at parameters `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.derivatives(u, v, 0)[0][0]
    }

    /// Unit normal `S_u x S_v` at `(u, v)`; `Z` where the surface is singular.
    fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        let d = self.derivatives(u, v, 1);
        d[1][0].cross(d[0][1]).try_normalize().unwrap_or(Vector3::Z)
    }
}

/// Any surface the proximity engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Surface {
    Plane(Plane),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    Torus(Torus),
    BSpline(BSplineSurface),
    Nurbs(NurbsSurface),
}

impl Surface {
    /// Conservative box of the patch over `u_range x v_range`.
    pub fn patch_bounds(&self, u_range: (f64, f64), v_range: (f64, f64)) -> Aabb3 {
        match self {
            Surface::Plane(s) => s.patch_bounds(u_range, v_range),
            Surface::Cylinder(s) => s.patch_bounds(u_range, v_range),
            Surface::Cone(s) => s.patch_bounds(u_range, v_range),
            Surface::Sphere(s) => s.patch_bounds(u_range, v_range),
            Surface::Torus(s) => s.patch_bounds(u_range, v_range),
            Surface::BSpline(s) => s.control_bounds(),
            Surface::Nurbs(s) => s.control_bounds(),
        }
    }

    /// Apply a rigid transform, returning a new surface.
    pub fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Surface::Plane(s) => Surface::Plane(s.transformed(transform)),
            Surface::Cylinder(s) => Surface::Cylinder(s.transformed(transform)),
            Surface::Cone(s) => Surface::Cone(s.transformed(transform)),
            Surface::Sphere(s) => Surface::Sphere(s.transformed(transform)),
            Surface::Torus(s) => Surface::Torus(s.transformed(transform)),
            Surface::BSpline(s) => Surface::BSpline(s.transformed(transform)),
            Surface::Nurbs(s) => Surface::Nurbs(s.transformed(transform)),
        }
    }

    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            Surface::Plane(plane) => Some(plane),
            _ => None,
        }
    }
}

impl ParametricSurface for Surface {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        match self {
            Surface::Plane(s) => s.derivatives(u, v, order),
            Surface::Cylinder(s) => s.derivatives(u, v, order),
            Surface::Cone(s) => s.derivatives(u, v, order),
            Surface::Sphere(s) => s.derivatives(u, v, order),
            Surface::Torus(s) => s.derivatives(u, v, order),
            Surface::BSpline(s) => s.derivatives(u, v, order),
            Surface::Nurbs(s) => s.derivatives(u, v, order),
        }
    }

    fn domain_u(&self) -> (f64, f64) {
        match self {
            Surface::Plane(s) => s.domain_u(),
            Surface::Cylinder(s) => s.domain_u(),
            Surface::Cone(s) => s.domain_u(),
            Surface::Sphere(s) => s.domain_u(),
            Surface::Torus(s) => s.domain_u(),
            Surface::BSpline(s) => s.domain_u(),
            Surface::Nurbs(s) => s.domain_u(),
        }
    }

    fn domain_v(&self) -> (f64, f64) {
        match self {
            Surface::Plane(s) => s.domain_v(),
            Surface::Cylinder(s) => s.domain_v(),
            Surface::Cone(s) => s.domain_v(),
            Surface::Sphere(s) => s.domain_v(),
            Surface::Torus(s) => s.domain_v(),
            Surface::BSpline(s) => s.domain_v(),
            Surface::Nurbs(s) => s.domain_v(),
        }
    }

    fn period_u(&self) -> Option<f64> {
        match self {
            Surface::Plane(s) => s.period_u(),
            Surface::Cylinder(s) => s.period_u(),
            Surface::Cone(s) => s.period_u(),
            Surface::Sphere(s) => s.period_u(),
            Surface::Torus(s) => s.period_u(),
            Surface::BSpline(s) => s.period_u(),
            Surface::Nurbs(s) => s.period_u(),
        }
    }

    fn period_v(&self) -> Option<f64> {
        match self {
            Surface::Torus(s) => s.period_v(),
            _ => None,
        }
    }

    fn normal_at(&self, u: f64, v: f64) -> Vector3 {
        match self {
            Surface::Plane(s) => s.normal_at(u, v),
            Surface::Sphere(s) => s.normal_at(u, v),
            _ => {
                let d = self.derivatives(u, v, 1);
                d[1][0].cross(d[0][1]).try_normalize().unwrap_or(Vector3::Z)
            }
        }
    }
}

impl Validate for Surface {
    fn validate(&self) -> Result<()> {
        match self {
            Surface::Plane(_) => Ok(()),
            Surface::Cylinder(s) => s.validate(),
            Surface::Cone(s) => s.validate(),
            Surface::Sphere(s) => s.validate(),
            Surface::Torus(s) => s.validate(),
            Surface::BSpline(s) => s.validate(),
            Surface::Nurbs(s) => s.validate(),
        }
    }
}

macro_rules! impl_from_surface {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Surface {
                fn from(s: $ty) -> Self {
                    Surface::$variant(s)
                }
            }
        )*
    };
}

impl_from_surface!(
    Plane(Plane),
    Cylinder(Cylinder),
    Cone(Cone),
    Sphere(Sphere),
    Torus(Torus),
    BSpline(BSplineSurface),
    Nurbs(NurbsSurface),
);

/// `(order + 1)^2` table of zero vectors.
pub(crate) fn zero_derivatives(order: usize) -> Vec<Vec<Vector3>> {
    vec![vec![Vector3::ZERO; order + 1]; order + 1]
}

/// Unit radial direction `cos u x + sin u y` of a frame, differentiated `k` times in `u`.
pub(crate) fn radial(frame: &prox_math::Frame3, u: f64, k: usize) -> Vector3 {
    let (c, s) = crate::analytic::cos_sin_derivative(u, k);
    c * frame.x + s * frame.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_math::{DVec3, Frame3};

    /// Compare analytic first and second derivatives against central differences.
    pub(crate) fn check_derivatives(surface: &Surface, u: f64, v: f64) {
        let h = 1e-5;
        let d = surface.derivatives(u, v, 2);
        let p = |du: f64, dv: f64| surface.point_at(u + du, v + dv);
        let su = (p(h, 0.0) - p(-h, 0.0)) / (2.0 * h);
        let sv = (p(0.0, h) - p(0.0, -h)) / (2.0 * h);
        let suu = (p(h, 0.0) - 2.0 * p(0.0, 0.0) + p(-h, 0.0)) / (h * h);
        let svv = (p(0.0, h) - 2.0 * p(0.0, 0.0) + p(0.0, -h)) / (h * h);
        let suv = (p(h, h) - p(h, -h) - p(-h, h) + p(-h, -h)) / (4.0 * h * h);
        assert!((d[0][0] - p(0.0, 0.0)).length() < 1e-12);
        assert!((d[1][0] - su).length() < 1e-6, "S_u {:?} vs {:?}", d[1][0], su);
        assert!((d[0][1] - sv).length() < 1e-6, "S_v {:?} vs {:?}", d[0][1], sv);
        assert!((d[2][0] - suu).length() < 1e-3, "S_uu {:?} vs {:?}", d[2][0], suu);
        assert!((d[0][2] - svv).length() < 1e-3, "S_vv {:?} vs {:?}", d[0][2], svv);
        assert!((d[1][1] - suv).length() < 1e-3, "S_uv {:?} vs {:?}", d[1][1], suv);
    }

    fn tilted() -> Frame3 {
        Frame3::new(
            DVec3::new(0.5, -1.0, 2.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn test_analytic_derivatives() {
        let surfaces = [
            Surface::from(Plane::new(tilted())),
            Surface::from(Cylinder::new(tilted(), 1.5)),
            Surface::from(Cone::new(tilted(), 0.4)),
            Surface::from(Sphere::new(tilted(), 2.0)),
            Surface::from(Torus::new(tilted(), 3.0, 1.0)),
        ];
        for surface in &surfaces {
            check_derivatives(surface, 0.7, 0.3);
        }
    }

    #[test]
    fn test_patch_bounds_contain_samples() {
        let surfaces = [
            Surface::from(Cylinder::new(tilted(), 1.5)),
            Surface::from(Cone::new(tilted(), 0.4)),
            Surface::from(Sphere::new(tilted(), 2.0)),
            Surface::from(Torus::new(tilted(), 3.0, 1.0)),
        ];
        let (u0, u1, v0, v1) = (0.3, 2.5, 0.2, 1.1);
        for surface in &surfaces {
            let aabb = surface.patch_bounds((u0, u1), (v0, v1)).expand(1e-9);
            for i in 0..=12 {
                for j in 0..=12 {
                    let u = u0 + (u1 - u0) * i as f64 / 12.0;
                    let v = v0 + (v1 - v0) * j as f64 / 12.0;
                    assert!(
                        aabb.contains_point(surface.point_at(u, v)),
                        "{surface:?} escapes its box at ({u}, {v})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_periods() {
        let torus = Surface::from(Torus::new(Frame3::world(), 2.0, 0.5));
        assert!(torus.period_u().is_some());
        assert!(torus.period_v().is_some());
        let sphere = Surface::from(Sphere::new(Frame3::world(), 1.0));
        assert!(sphere.period_u().is_some());
        assert!(sphere.period_v().is_none());
        assert!(Surface::from(Plane::xy()).period_u().is_none());
    }

    #[test]
    fn test_serde_round_trip() {
        let surface = Surface::from(Torus::new(tilted(), 3.0, 1.0));
        let json = serde_json::to_string(&surface).unwrap();
        let back: Surface = serde_json::from_str(&json).unwrap();
        assert_eq!(surface, back);
    }
}
