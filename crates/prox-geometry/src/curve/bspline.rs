//! B-spline and NURBS curve implementations.

use prox_core::traits::{BoundingBox, Validate};
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricCurve;
use crate::nurbs::{deboor, Basis, KnotVector};

/// A B-spline curve defined by degree, knot vector, and control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSplineCurve {
    pub degree: usize,
    pub knots: KnotVector,
    pub control_points: Vec<Point3>,
    #[serde(default)]
    pub periodic: bool,
}

impl BSplineCurve {
    pub fn new(degree: usize, knots: KnotVector, control_points: Vec<Point3>) -> Result<Self> {
        check_control_points(&control_points)?;
        knots.validate_for(degree, control_points.len())?;
        Ok(Self {
            degree,
            knots,
            control_points,
            periodic: false,
        })
    }

    /// Mark the curve periodic. Fails unless its ends coincide.
    pub fn with_periodic(mut self) -> Result<Self> {
        check_closed(&self)?;
        self.periodic = true;
        Ok(self)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            control_points: transform_points(&self.control_points, transform),
            ..self.clone()
        }
    }

    pub fn basis(&self) -> Basis<'_> {
        Basis::checked_by_owner(self.degree, &self.knots, self.control_points.len())
            .periodic(self.periodic)
    }
}

impl ParametricCurve for BSplineCurve {
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        deboor::curve_derivatives(&self.basis(), &self.control_points, t, order)
    }

    fn point_at(&self, t: f64) -> Point3 {
        deboor::curve_point(&self.basis(), &self.control_points, t)
    }

    fn domain(&self) -> (f64, f64) {
        self.knots.domain(self.degree)
    }

    fn is_periodic(&self) -> bool {
        self.periodic
    }
}

impl Validate for BSplineCurve {
    fn validate(&self) -> Result<()> {
        check_control_points(&self.control_points)?;
        self.knots.validate_for(self.degree, self.control_points.len())?;
        if self.periodic {
            check_closed(self)?;
        }
        Ok(())
    }
}

impl BoundingBox for BSplineCurve {
    type Bounds = Aabb3;

    /// Control polygon box; the curve lies in the convex hull of its control points.
    fn bounding_box(&self) -> Aabb3 {
        control_box(&self.control_points)
    }
}

/// A NURBS (Non-Uniform Rational B-Spline) curve.
///
/// Extends `BSplineCurve` with weights for rational evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsCurve {
    pub degree: usize,
    pub knots: KnotVector,
    pub control_points: Vec<Point3>,
    pub weights: Vec<f64>,
    #[serde(default)]
    pub periodic: bool,
}

impl NurbsCurve {
    pub fn new(
        degree: usize,
        knots: KnotVector,
        control_points: Vec<Point3>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        check_control_points(&control_points)?;
        check_weights(&weights, control_points.len())?;
        knots.validate_for(degree, control_points.len())?;
        Ok(Self {
            degree,
            knots,
            control_points,
            weights,
            periodic: false,
        })
    }

    /// Mark the curve periodic. Fails unless its ends coincide.
    pub fn with_periodic(mut self) -> Result<Self> {
        check_closed(&self)?;
        self.periodic = true;
        Ok(self)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            control_points: transform_points(&self.control_points, transform),
            ..self.clone()
        }
    }

    pub fn basis(&self) -> Basis<'_> {
        Basis::checked_by_owner(self.degree, &self.knots, self.control_points.len())
            .periodic(self.periodic)
    }
}

impl ParametricCurve for NurbsCurve {
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        deboor::nurbs_curve_derivatives(&self.basis(), &self.control_points, &self.weights, t, order)
    }

    fn point_at(&self, t: f64) -> Point3 {
        deboor::nurbs_curve_point(&self.basis(), &self.control_points, &self.weights, t)
    }

    fn domain(&self) -> (f64, f64) {
        self.knots.domain(self.degree)
    }

    fn is_periodic(&self) -> bool {
        self.periodic
    }
}

impl Validate for NurbsCurve {
    fn validate(&self) -> Result<()> {
        check_control_points(&self.control_points)?;
        check_weights(&self.weights, self.control_points.len())?;
        self.knots.validate_for(self.degree, self.control_points.len())?;
        if self.periodic {
            check_closed(self)?;
        }
        Ok(())
    }
}

impl BoundingBox for NurbsCurve {
    type Bounds = Aabb3;

    /// Positive weights keep the curve inside the control polygon's convex hull.
    fn bounding_box(&self) -> Aabb3 {
        control_box(&self.control_points)
    }
}

pub(crate) fn check_control_points(points: &[Point3]) -> Result<()> {
    if points.is_empty() {
        return Err(ProxError::InvalidControlNet("no control points".into()));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(ProxError::InvalidControlNet(format!(
            "control point {i} is not finite: {:?}",
            points[i]
        )));
    }
    Ok(())
}

pub(crate) fn check_weights(weights: &[f64], n_control: usize) -> Result<()> {
    if weights.len() != n_control {
        return Err(ProxError::InvalidControlNet(format!(
            "{} weights for {n_control} control points",
            weights.len()
        )));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
        return Err(ProxError::InvalidControlNet(format!(
            "weights must be positive, got {w}"
        )));
    }
    Ok(())
}

pub(crate) fn control_box(points: &[Point3]) -> Aabb3 {
    Aabb3::from_points(points).unwrap_or_else(|| Aabb3::from_point(Point3::ZERO))
}

fn transform_points(points: &[Point3], transform: &Transform) -> Vec<Point3> {
    points.iter().map(|&p| transform.transform_point(p)).collect()
}

fn check_closed(curve: &impl ParametricCurve) -> Result<()> {
    if curve.is_closed() {
        Ok(())
    } else {
        let (a, b) = curve.domain();
        Err(ProxError::DegenerateGeometry(format!(
            "periodic spline must be closed, ends differ: {:?} vs {:?}",
            curve.point_at(a),
            curve.point_at(b)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_math::DVec3;

    fn quadratic() -> BSplineCurve {
        BSplineCurve::new(
            2,
            KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap(),
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(0.5, 1.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bspline_endpoints_and_mid() {
        let curve = quadratic();
        assert!((curve.point_at(0.0) - DVec3::ZERO).length() < 1e-10);
        assert!((curve.point_at(1.0) - DVec3::X).length() < 1e-10);
        let mid = curve.point_at(0.5);
        assert!((mid - DVec3::new(0.5, 0.5, 0.0)).length() < 1e-10);
    }

    #[test]
    fn test_parameters_clamped_outside_domain() {
        let curve = quadratic();
        assert_eq!(curve.point_at(-1.0), curve.point_at(0.0));
        assert_eq!(curve.point_at(2.0), curve.point_at(1.0));
    }

    #[test]
    fn test_knot_length_mismatch_rejected() {
        let res = BSplineCurve::new(
            2,
            KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 1.0]).unwrap(),
            vec![DVec3::ZERO, DVec3::X, DVec3::Y],
        );
        assert!(matches!(res, Err(ProxError::InvalidKnotVector(_))));
    }

    #[test]
    fn test_nurbs_weights_validated() {
        let knots = KnotVector::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let cps = vec![DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y];
        let res = NurbsCurve::new(2, knots.clone(), cps.clone(), vec![1.0, 1.0]);
        assert!(matches!(res, Err(ProxError::InvalidControlNet(_))));
        let res = NurbsCurve::new(2, knots, cps, vec![1.0, -1.0, 1.0]);
        assert!(matches!(res, Err(ProxError::InvalidControlNet(_))));
    }

    #[test]
    fn test_open_curve_cannot_be_periodic() {
        assert!(matches!(
            quadratic().with_periodic(),
            Err(ProxError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_open_curve_flagged_periodic_fails_validation() {
        let mut curve = quadratic();
        curve.periodic = true;
        assert!(matches!(curve.validate(), Err(ProxError::DegenerateGeometry(_))));

        let json = r#"{"degree":2,"knots":[0.0,0.0,0.0,1.0,1.0,1.0],
            "control_points":[[0.0,0.0,0.0],[0.5,1.0,0.0],[1.0,0.0,0.0]],
            "weights":[1.0,1.0,1.0],"periodic":true}"#;
        let nurbs: NurbsCurve = serde_json::from_str(json).unwrap();
        assert!(matches!(nurbs.validate(), Err(ProxError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_periodic_curve_wraps() {
        // Closed degree-1 triangle
        let curve = BSplineCurve::new(
            1,
            KnotVector::new(vec![0.0, 0.0, 1.0, 2.0, 3.0, 3.0]).unwrap(),
            vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::ZERO],
        )
        .unwrap()
        .with_periodic()
        .unwrap();
        assert!((curve.point_at(3.5) - curve.point_at(0.5)).length() < 1e-12);
        assert!((curve.point_at(-0.5) - curve.point_at(2.5)).length() < 1e-12);
    }

    #[test]
    fn test_control_box_contains_curve() {
        let curve = quadratic();
        let aabb = curve.bounding_box();
        for i in 0..=20 {
            assert!(aabb.contains_point(curve.point_at(i as f64 / 20.0)));
        }
    }
}
