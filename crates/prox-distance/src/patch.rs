//! Uniform view of points, curves and faces as maps from at most two
//! parameters into space, for the multi-start search.

use prox_geometry::sample::{complexity, curve_sample_count, sample_parameters};
use prox_geometry::{ParametricCurve, ParametricSurface};
use prox_math::{Point2, Point3, Vector3};
use prox_topology::Face;

use crate::config::{ProximityConfig, SampleRange};
use crate::result::{Parameter, Witness};

pub(crate) type Params = [f64; 2];

/// Admissible interval of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ParamRange {
    pub lo: f64,
    pub hi: f64,
    /// Values wrap modulo the width instead of clamping.
    pub periodic: bool,
}

impl ParamRange {
    pub fn new(lo: f64, hi: f64, periodic: bool) -> Self {
        Self { lo, hi, periodic }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }

    /// Wrap or clamp `t` into the range.
    pub fn fit(&self, t: f64) -> f64 {
        if self.periodic && self.width() > 0.0 {
            self.lo + (t - self.lo).rem_euclid(self.width())
        } else {
            t.clamp(self.lo, self.hi)
        }
    }
}

/// Point, first and second derivatives with respect to each parameter.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Jet {
    pub point: Point3,
    pub first: [Vector3; 2],
    pub second: [[Vector3; 2]; 2],
}

impl Jet {
    fn constant(point: Point3) -> Self {
        Self {
            point,
            first: [Vector3::ZERO; 2],
            second: [[Vector3::ZERO; 2]; 2],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Sample {
    pub x: Params,
    pub point: Point3,
}

pub(crate) trait Patch: Sync {
    /// Number of parameters in use (0, 1 or 2).
    fn dim(&self) -> usize;

    fn range(&self, i: usize) -> ParamRange;

    fn point(&self, x: Params) -> Point3;

    fn jet(&self, x: Params) -> Jet;

    fn parameter(&self, x: Params) -> Parameter;

    /// Seed samples, all inside the admissible region.
    fn samples(&self) -> Vec<Sample>;

    /// Move `x` into the admissible region.
    fn project(&self, x: &mut Params) {
        for (i, xi) in x.iter_mut().enumerate().take(self.dim()) {
            *xi = self.range(i).fit(*xi);
        }
    }

    fn witness(&self, x: Params) -> Witness {
        Witness::new(self.point(x), self.parameter(x))
    }
}

pub(crate) struct PointPatch(pub Point3);

impl Patch for PointPatch {
    fn dim(&self) -> usize {
        0
    }

    fn range(&self, _i: usize) -> ParamRange {
        ParamRange::new(0.0, 0.0, false)
    }

    fn point(&self, _x: Params) -> Point3 {
        self.0
    }

    fn jet(&self, _x: Params) -> Jet {
        Jet::constant(self.0)
    }

    fn parameter(&self, _x: Params) -> Parameter {
        Parameter::Point
    }

    fn samples(&self) -> Vec<Sample> {
        vec![Sample {
            x: [0.0; 2],
            point: self.0,
        }]
    }
}

pub(crate) struct CurvePatch<'a> {
    curve: &'a dyn ParametricCurve,
    range: ParamRange,
    count: usize,
}

impl<'a> CurvePatch<'a> {
    /// Sample count follows the curve's complexity within `samples`.
    pub fn new(curve: &'a dyn ParametricCurve, samples: SampleRange) -> Self {
        let (lo, hi) = curve.domain();
        Self {
            curve,
            range: ParamRange::new(lo, hi, curve.is_periodic()),
            count: curve_sample_count(curve, samples.min, samples.max),
        }
    }
}

impl Patch for CurvePatch<'_> {
    fn dim(&self) -> usize {
        1
    }

    fn range(&self, _i: usize) -> ParamRange {
        self.range
    }

    fn point(&self, x: Params) -> Point3 {
        self.curve.point_at(x[0])
    }

    fn jet(&self, x: Params) -> Jet {
        let d = self.curve.derivatives(x[0], 2);
        let mut jet = Jet::constant(d[0]);
        jet.first[0] = d[1];
        jet.second[0][0] = d[2];
        jet
    }

    fn parameter(&self, x: Params) -> Parameter {
        Parameter::Curve(x[0])
    }

    fn samples(&self) -> Vec<Sample> {
        sample_parameters((self.range.lo, self.range.hi), self.count, self.range.periodic)
            .into_iter()
            .map(|t| Sample {
                x: [t, 0.0],
                point: self.curve.point_at(t),
            })
            .collect()
    }
}

/// A face seen through its parameter rectangle; steps are projected back
/// into the trimmed region.
pub(crate) struct FacePatch<'a> {
    face: &'a Face,
    ranges: [ParamRange; 2],
    grid: [usize; 2],
    boundary_samples: usize,
}

impl<'a> FacePatch<'a> {
    pub fn new(face: &'a Face, config: &ProximityConfig) -> Self {
        let ((u0, u1), (v0, v1)) = face.param_bounds();
        let (um, vm) = (0.5 * (u0 + u1), 0.5 * (v0 + v1));

        // Resolution follows the mid isolines, never below the default
        let along_u = complexity(&|u| face.point_at(Point2::new(u, vm)), (u0, u1));
        let along_v = complexity(&|v| face.point_at(Point2::new(um, v)), (v0, v1));
        let grid = [along_u, along_v]
            .map(|n| config.face_grid.clamp(n.max(config.face_grid_default)));

        Self {
            face,
            ranges: [
                ParamRange::new(u0, u1, face.periodic_u().is_some()),
                ParamRange::new(v0, v1, face.periodic_v().is_some()),
            ],
            grid,
            boundary_samples: config.boundary_samples,
        }
    }
}

impl Patch for FacePatch<'_> {
    fn dim(&self) -> usize {
        2
    }

    fn range(&self, i: usize) -> ParamRange {
        self.ranges[i]
    }

    fn point(&self, x: Params) -> Point3 {
        self.face.surface().point_at(x[0], x[1])
    }

    fn jet(&self, x: Params) -> Jet {
        let d = self.face.surface().derivatives(x[0], x[1], 2);
        Jet {
            point: d[0][0],
            first: [d[1][0], d[0][1]],
            second: [[d[2][0], d[1][1]], [d[1][1], d[0][2]]],
        }
    }

    fn parameter(&self, x: Params) -> Parameter {
        Parameter::Surface(Point2::new(x[0], x[1]))
    }

    fn project(&self, x: &mut Params) {
        let uv = Point2::new(self.ranges[0].fit(x[0]), self.ranges[1].fit(x[1]));
        let uv = self.face.project_inside(uv);
        *x = [uv.x, uv.y];
    }

    fn samples(&self) -> Vec<Sample> {
        let [u, v] = self.ranges;
        let us = sample_parameters((u.lo, u.hi), self.grid[0], u.periodic);
        let vs = sample_parameters((v.lo, v.hi), self.grid[1], v.periodic);

        let interior = us
            .iter()
            .flat_map(|&u| vs.iter().map(move |&v| Point2::new(u, v)))
            .filter(|&uv| self.face.contains(uv));

        let boundary = self.face.loops().flat_map(|lp| {
            let polygon = lp.polygon();
            let stride = (polygon.len() / self.boundary_samples.max(1)).max(1);
            polygon.iter().copied().step_by(stride)
        });

        interior
            .chain(boundary)
            .map(|uv| Sample {
                x: [uv.x, uv.y],
                point: self.face.point_at(uv),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_geometry::curve::{CircularArc, LineSegment};
    use prox_geometry::surface::{Cylinder, Plane};
    use prox_geometry::Surface;
    use prox_math::{DVec3, Frame3};
    use std::f64::consts::TAU;

    #[test]
    fn test_param_range_fit() {
        let clamped = ParamRange::new(0.0, 1.0, false);
        assert_eq!(clamped.fit(1.5), 1.0);
        assert_eq!(clamped.fit(-0.5), 0.0);
        let wrapped = ParamRange::new(0.0, TAU, true);
        assert!((wrapped.fit(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrapped.fit(-0.5) - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_curve_patch_samples() {
        let line = LineSegment::new(DVec3::ZERO, DVec3::X);
        let patch = CurvePatch::new(&line, SampleRange::new(5, 10));
        let samples = patch.samples();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].point, DVec3::ZERO);
        assert_eq!(samples[4].point, DVec3::X);

        // A full circle does not repeat its start sample
        let circle = CircularArc::full_circle(DVec3::ZERO, DVec3::Z, 1.0);
        let patch = CurvePatch::new(&circle, SampleRange::new(6, 6));
        let samples = patch.samples();
        assert_eq!(samples.len(), 6);
        assert!(samples[5].x[0] < TAU - 0.5);
    }

    #[test]
    fn test_face_patch_samples_inside_region() {
        let face = Face::rectangle(Surface::from(Plane::xy()), (0.0, 2.0), (0.0, 1.0)).unwrap();
        let patch = FacePatch::new(&face, &ProximityConfig::default());
        let samples = patch.samples();
        assert!(samples.len() >= 100);
        for s in &samples {
            assert!(face.contains(Point2::new(s.x[0], s.x[1])));
        }
    }

    #[test]
    fn test_face_patch_projection_wraps_periodic() {
        let surface = Surface::from(Cylinder::new(Frame3::world(), 1.0));
        let face = Face::rectangle(surface, (0.0, TAU), (0.0, 1.0)).unwrap();
        let patch = FacePatch::new(&face, &ProximityConfig::default());
        let mut x = [TAU + 0.25, 3.0];
        patch.project(&mut x);
        assert!((x[0] - 0.25).abs() < 1e-9);
        assert!((x[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_face_jet_matches_surface() {
        let face = Face::rectangle(Surface::from(Plane::xy()), (0.0, 1.0), (0.0, 1.0)).unwrap();
        let patch = FacePatch::new(&face, &ProximityConfig::default());
        let jet = patch.jet([0.25, 0.5]);
        assert_eq!(jet.point, DVec3::new(0.25, 0.5, 0.0));
        assert_eq!(jet.first, [DVec3::X, DVec3::Y]);
    }
}
