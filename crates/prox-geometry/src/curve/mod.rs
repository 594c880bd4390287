//! Curve traits and implementations.

mod bspline;
mod circle;
mod ellipse;
mod line;
mod on_surface;

use prox_core::traits::{BoundingBox, Validate};
use prox_core::Result;
use prox_math::{Aabb3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

pub use bspline::{BSplineCurve, NurbsCurve};
pub(crate) use bspline::{check_control_points, check_weights, control_box};
pub use circle::CircularArc;
pub use ellipse::EllipticalArc;
pub use line::LineSegment;
pub use on_surface::CurveOnSurface;

/// Parametric curve in 3D space.
///
/// Implementors provide `derivatives`; everything else derives from it.
pub trait ParametricCurve: Send + Sync {
    /// Point and derivatives up to `order` at parameter `t`.
    ///
    /// Index 0 is the point, index k the k-th derivative. The returned
    /// vector always has `order + 1` entries.
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3>;

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Whether parameters wrap modulo the domain length.
    fn is_periodic(&self) -> bool {
        false
    }

    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Point3 {
        self.derivatives(t, 0)[0]
    }

    /// The `order`-th derivative at `t`.
    fn derivative(&self, t: f64, order: usize) -> Vector3 {
        self.derivatives(t, order)[order]
    }

    /// First derivative at `t` (not normalized).
    fn tangent_at(&self, t: f64) -> Vector3 {
        self.derivative(t, 1)
    }

    fn period(&self) -> Option<f64> {
        if self.is_periodic() {
            let (a, b) = self.domain();
            Some(b - a)
        } else {
            None
        }
    }

    /// Whether the curve is closed (start == end).
    fn is_closed(&self) -> bool {
        let (a, b) = self.domain();
        self.point_at(a).distance(self.point_at(b)) < 1e-9
    }
}

/// Any curve the proximity engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    Line(LineSegment),
    Arc(CircularArc),
    Ellipse(EllipticalArc),
    BSpline(BSplineCurve),
    Nurbs(NurbsCurve),
}

impl Curve {
    /// Polynomial degree of the representation; 2 for conics.
    pub fn degree(&self) -> usize {
        match self {
            Curve::Line(_) => 1,
            Curve::Arc(_) | Curve::Ellipse(_) => 2,
            Curve::BSpline(c) => c.degree,
            Curve::Nurbs(c) => c.degree,
        }
    }

    /// Apply a rigid transform, returning a new curve.
    pub fn transformed(&self, transform: &Transform) -> Self {
        match self {
            Curve::Line(c) => Curve::Line(c.transformed(transform)),
            Curve::Arc(c) => Curve::Arc(c.transformed(transform)),
            Curve::Ellipse(c) => Curve::Ellipse(c.transformed(transform)),
            Curve::BSpline(c) => Curve::BSpline(c.transformed(transform)),
            Curve::Nurbs(c) => Curve::Nurbs(c.transformed(transform)),
        }
    }

    pub fn as_line(&self) -> Option<&LineSegment> {
        match self {
            Curve::Line(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_arc(&self) -> Option<&CircularArc> {
        match self {
            Curve::Arc(arc) => Some(arc),
            _ => None,
        }
    }
}

impl ParametricCurve for Curve {
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        match self {
            Curve::Line(c) => c.derivatives(t, order),
            Curve::Arc(c) => c.derivatives(t, order),
            Curve::Ellipse(c) => c.derivatives(t, order),
            Curve::BSpline(c) => c.derivatives(t, order),
            Curve::Nurbs(c) => c.derivatives(t, order),
        }
    }

    fn domain(&self) -> (f64, f64) {
        match self {
            Curve::Line(c) => c.domain(),
            Curve::Arc(c) => c.domain(),
            Curve::Ellipse(c) => c.domain(),
            Curve::BSpline(c) => c.domain(),
            Curve::Nurbs(c) => c.domain(),
        }
    }

    fn is_periodic(&self) -> bool {
        match self {
            Curve::Line(c) => c.is_periodic(),
            Curve::Arc(c) => c.is_periodic(),
            Curve::Ellipse(c) => c.is_periodic(),
            Curve::BSpline(c) => c.is_periodic(),
            Curve::Nurbs(c) => c.is_periodic(),
        }
    }
}

impl Validate for Curve {
    fn validate(&self) -> Result<()> {
        match self {
            Curve::Line(c) => c.validate(),
            Curve::Arc(c) => c.validate(),
            Curve::Ellipse(c) => c.validate(),
            Curve::BSpline(c) => c.validate(),
            Curve::Nurbs(c) => c.validate(),
        }
    }
}

impl BoundingBox for Curve {
    type Bounds = Aabb3;

    fn bounding_box(&self) -> Aabb3 {
        match self {
            Curve::Line(c) => c.bounding_box(),
            Curve::Arc(c) => c.bounding_box(),
            Curve::Ellipse(c) => c.bounding_box(),
            Curve::BSpline(c) => c.bounding_box(),
            Curve::Nurbs(c) => c.bounding_box(),
        }
    }
}

impl From<LineSegment> for Curve {
    fn from(c: LineSegment) -> Self {
        Curve::Line(c)
    }
}

impl From<CircularArc> for Curve {
    fn from(c: CircularArc) -> Self {
        Curve::Arc(c)
    }
}

impl From<EllipticalArc> for Curve {
    fn from(c: EllipticalArc) -> Self {
        Curve::Ellipse(c)
    }
}

impl From<BSplineCurve> for Curve {
    fn from(c: BSplineCurve) -> Self {
        Curve::BSpline(c)
    }
}

impl From<NurbsCurve> for Curve {
    fn from(c: NurbsCurve) -> Self {
        Curve::Nurbs(c)
    }
}
