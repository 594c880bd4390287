//! Query results: distance, witnesses and how they were obtained.

use prox_geometry::curve::Curve;
use prox_geometry::ParametricCurve;
use prox_math::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// How a result was reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    /// Closed form, or a local optimizer met its stationarity test.
    #[default]
    Converged,
    /// An optimizer gave up; the best seed sample was used instead.
    Fallback,
}

/// Where a witness lies on its entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Parameter {
    Point,
    Curve(f64),
    Surface(Point2),
}

/// One end of a closest pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Witness {
    pub point: Point3,
    pub parameter: Parameter,
    /// Index of the face within its shell, for shell queries.
    pub face: Option<usize>,
}

impl Witness {
    pub fn new(point: Point3, parameter: Parameter) -> Self {
        Self {
            point,
            parameter,
            face: None,
        }
    }

    pub fn point(point: Point3) -> Self {
        Self::new(point, Parameter::Point)
    }

    pub(crate) fn with_face(self, face: usize) -> Self {
        Self {
            face: Some(face),
            ..self
        }
    }

    /// Re-express a curve parameter on a face boundary curve as the
    /// matching surface parameters.
    pub(crate) fn on_boundary(self, curve: &Curve) -> Self {
        match self.parameter {
            Parameter::Curve(t) => Self {
                parameter: Parameter::Surface(curve.point_at(t).truncate()),
                ..self
            },
            _ => self,
        }
    }
}

/// Minimum distance between two entities and a pair realizing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proximity {
    pub distance: f64,
    pub first: Witness,
    pub second: Witness,
    pub quality: Quality,
}

impl Proximity {
    pub fn new(first: Witness, second: Witness, quality: Quality) -> Self {
        Self {
            distance: first.point.distance(second.point),
            first,
            second,
            quality,
        }
    }

    /// Same result with the entities' roles exchanged.
    pub fn swapped(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
            ..self
        }
    }

    pub fn points(&self) -> (Point3, Point3) {
        (self.first.point, self.second.point)
    }

    pub(crate) fn map_first(mut self, f: impl FnOnce(Witness) -> Witness) -> Self {
        self.first = f(self.first);
        self
    }

    pub(crate) fn map_second(mut self, f: impl FnOnce(Witness) -> Witness) -> Self {
        self.second = f(self.second);
        self
    }

    /// The closer of two results; ties keep `self`.
    pub(crate) fn min(self, other: Self) -> Self {
        if other.distance < self.distance {
            other
        } else {
            self
        }
    }
}

/// Minimum of `results` in iteration order; ties keep the earlier one.
pub(crate) fn closest(results: impl IntoIterator<Item = Proximity>) -> Option<Proximity> {
    results.into_iter().reduce(Proximity::min)
}
