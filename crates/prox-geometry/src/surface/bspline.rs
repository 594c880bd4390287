//! B-spline and NURBS surface implementations.

use prox_core::traits::Validate;
use prox_core::{ProxError, Result};
use prox_math::{Aabb3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::ParametricSurface;
use crate::curve::{check_control_points, check_weights, control_box};
use crate::nurbs::{deboor, Basis, KnotVector};

/// A B-spline surface defined by degrees, knot vectors, and a 2D grid of control points.
///
/// `control_points[i][j]` is the control point at row `i` (u-direction) and column `j` (v-direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BSplineSurface {
    pub degree_u: usize,
    pub degree_v: usize,
    pub knots_u: KnotVector,
    pub knots_v: KnotVector,
    pub control_points: Vec<Vec<Point3>>,
}

impl BSplineSurface {
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: KnotVector,
        knots_v: KnotVector,
        control_points: Vec<Vec<Point3>>,
    ) -> Result<Self> {
        let surface = Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
        };
        surface.validate()?;
        Ok(surface)
    }

    pub fn control_bounds(&self) -> Aabb3 {
        net_bounds(&self.control_points)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            control_points: transform_net(&self.control_points, transform),
            ..self.clone()
        }
    }

    /// Bases in u and v; parameters outside the domain are clamped.
    pub fn bases(&self) -> (Basis<'_>, Basis<'_>) {
        net_bases(
            (self.degree_u, self.degree_v),
            (&self.knots_u, &self.knots_v),
            &self.control_points,
        )
    }
}

impl ParametricSurface for BSplineSurface {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let (bu, bv) = self.bases();
        deboor::surface_derivatives(&bu, &bv, &self.control_points, u, v, order)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.knots_u.domain(self.degree_u)
    }

    fn domain_v(&self) -> (f64, f64) {
        self.knots_v.domain(self.degree_v)
    }
}

impl Validate for BSplineSurface {
    fn validate(&self) -> Result<()> {
        let (n_u, n_v) = check_net(&self.control_points)?;
        self.knots_u.validate_for(self.degree_u, n_u)?;
        self.knots_v.validate_for(self.degree_v, n_v)
    }
}

/// A NURBS surface (rational B-spline surface).
///
/// Extends `BSplineSurface` with a 2D grid of weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NurbsSurface {
    pub degree_u: usize,
    pub degree_v: usize,
    pub knots_u: KnotVector,
    pub knots_v: KnotVector,
    pub control_points: Vec<Vec<Point3>>,
    pub weights: Vec<Vec<f64>>,
}

impl NurbsSurface {
    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: KnotVector,
        knots_v: KnotVector,
        control_points: Vec<Vec<Point3>>,
        weights: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let surface = Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
            weights,
        };
        surface.validate()?;
        Ok(surface)
    }

    pub fn control_bounds(&self) -> Aabb3 {
        net_bounds(&self.control_points)
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            control_points: transform_net(&self.control_points, transform),
            ..self.clone()
        }
    }

    pub fn bases(&self) -> (Basis<'_>, Basis<'_>) {
        net_bases(
            (self.degree_u, self.degree_v),
            (&self.knots_u, &self.knots_v),
            &self.control_points,
        )
    }
}

impl ParametricSurface for NurbsSurface {
    fn derivatives(&self, u: f64, v: f64, order: usize) -> Vec<Vec<Vector3>> {
        let (bu, bv) = self.bases();
        deboor::nurbs_surface_derivatives(&bu, &bv, &self.control_points, &self.weights, u, v, order)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.knots_u.domain(self.degree_u)
    }

    fn domain_v(&self) -> (f64, f64) {
        self.knots_v.domain(self.degree_v)
    }
}

impl Validate for NurbsSurface {
    fn validate(&self) -> Result<()> {
        let (n_u, n_v) = check_net(&self.control_points)?;
        if self.weights.len() != n_u {
            return Err(ProxError::InvalidControlNet(format!(
                "{} weight rows for {n_u} control point rows",
                self.weights.len()
            )));
        }
        for row in &self.weights {
            check_weights(row, n_v)?;
        }
        self.knots_u.validate_for(self.degree_u, n_u)?;
        self.knots_v.validate_for(self.degree_v, n_v)
    }
}

/// Check a control net is a non-empty rectangle of finite points.
fn check_net(net: &[Vec<Point3>]) -> Result<(usize, usize)> {
    let n_v = net.first().map_or(0, Vec::len);
    if net.is_empty() || n_v == 0 {
        return Err(ProxError::InvalidControlNet("empty control net".into()));
    }
    for (i, row) in net.iter().enumerate() {
        if row.len() != n_v {
            return Err(ProxError::InvalidControlNet(format!(
                "control net row {i} has {} points, expected {n_v}",
                row.len()
            )));
        }
        check_control_points(row)?;
    }
    Ok((net.len(), n_v))
}

fn net_bases<'a>(
    (degree_u, degree_v): (usize, usize),
    (knots_u, knots_v): (&'a KnotVector, &'a KnotVector),
    net: &[Vec<Point3>],
) -> (Basis<'a>, Basis<'a>) {
    let n_v = net.first().map_or(0, Vec::len);
    (
        Basis::checked_by_owner(degree_u, knots_u, net.len()),
        Basis::checked_by_owner(degree_v, knots_v, n_v),
    )
}

fn net_bounds(net: &[Vec<Point3>]) -> Aabb3 {
    let points: Vec<Point3> = net.iter().flatten().copied().collect();
    control_box(&points)
}

fn transform_net(net: &[Vec<Point3>], transform: &Transform) -> Vec<Vec<Point3>> {
    net.iter()
        .map(|row| row.iter().map(|&p| transform.transform_point(p)).collect())
        .collect()
}
