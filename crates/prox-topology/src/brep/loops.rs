//! Closed boundary loops in a surface's parameter plane.

use prox_core::traits::{BoundingBox, Validate};
use prox_core::{ProxError, Result, Tolerance};
use prox_geometry::curve::{Curve, LineSegment};
use prox_geometry::sample::curve_to_polyline;
use prox_geometry::ParametricCurve;
use prox_math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Chord deviation of the cached polygon, relative to the loop's size.
const POLYGON_TOLERANCE: f64 = 1e-4;

/// A closed chain of curves in the `(u, v)` plane (x = u, y = v, z = 0),
/// each curve ending where the next starts.
///
/// A polygonal approximation is cached at construction for containment and
/// boundary projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Curve>", into = "Vec<Curve>")]
pub struct Loop {
    curves: Vec<Curve>,
    polygon: Vec<Point2>,
}

impl Loop {
    /// Build a loop, rejecting open, empty, self-intersecting or zero-area chains.
    pub fn new(curves: Vec<Curve>) -> Result<Self> {
        let polygon = check_chain(&curves)?;
        let lp = Self { curves, polygon };
        lp.check_polygon()?;
        Ok(lp)
    }

    /// Closed polygon through `points`, one line segment per side.
    pub fn polygon_from_points(points: &[Point2]) -> Result<Self> {
        let n = points.len();
        let curves = (0..n)
            .map(|i| Curve::from(LineSegment::from_2d(points[i], points[(i + 1) % n])))
            .collect();
        Self::new(curves)
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Cached polygon vertices; the closing edge is implicit.
    pub fn polygon(&self) -> &[Point2] {
        &self.polygon
    }

    /// Shoelace area of the cached polygon, positive when counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        polygon_area(&self.polygon)
    }

    /// Winding number of the polygon around `p`.
    pub fn winding_number(&self, p: Point2) -> i32 {
        let mut winding = 0;
        for (a, b) in self.edges() {
            if a.y <= p.y {
                if b.y > p.y && cross(b - a, p - a) > 0.0 {
                    winding += 1;
                }
            } else if b.y <= p.y && cross(b - a, p - a) < 0.0 {
                winding -= 1;
            }
        }
        winding
    }

    /// Whether `p` lies inside the loop or within `tolerance` of its boundary.
    pub fn contains(&self, p: Point2, tolerance: f64) -> bool {
        self.winding_number(p) != 0 || self.distance_to_boundary(p) <= tolerance
    }

    /// Nearest point of the boundary polygon to `p`.
    pub fn closest_boundary_point(&self, p: Point2) -> Point2 {
        self.edges()
            .map(|(a, b)| closest_on_segment(p, a, b))
            .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
            .unwrap_or(p)
    }

    pub fn distance_to_boundary(&self, p: Point2) -> f64 {
        self.closest_boundary_point(p).distance(p)
    }

    /// Parameter-space bounding rectangle, sound for every curve kind.
    pub fn param_bounds(&self) -> (Point2, Point2) {
        let mut min = Point2::splat(f64::INFINITY);
        let mut max = Point2::splat(f64::NEG_INFINITY);
        for curve in &self.curves {
            let aabb = curve.bounding_box();
            min = min.min(aabb.min.truncate());
            max = max.max(aabb.max.truncate());
        }
        (min, max)
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        let n = self.polygon.len();
        (0..n).map(move |i| (self.polygon[i], self.polygon[(i + 1) % n]))
    }

    pub(crate) fn check_polygon(&self) -> Result<()> {
        if self.signed_area().abs() < 1e-12 {
            return Err(ProxError::DegenerateGeometry(
                "loop encloses no area".into(),
            ));
        }
        let edges: Vec<_> = self.edges().collect();
        let n = edges.len();
        for i in 0..n {
            for j in (i + 2)..n {
                // The first and last edges share a vertex
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (a, b) = edges[i];
                let (c, d) = edges[j];
                if segments_intersect(a, b, c, d) {
                    return Err(ProxError::DegenerateGeometry(format!(
                        "loop self-intersects near {a:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether any edge of `self` crosses an edge of `other`.
    pub(crate) fn crosses(&self, other: &Loop) -> bool {
        self.edges()
            .any(|(a, b)| other.edges().any(|(c, d)| segments_intersect(a, b, c, d)))
    }
}

impl TryFrom<Vec<Curve>> for Loop {
    type Error = ProxError;

    fn try_from(curves: Vec<Curve>) -> Result<Self> {
        Self::new(curves)
    }
}

impl From<Loop> for Vec<Curve> {
    fn from(lp: Loop) -> Self {
        lp.curves
    }
}

/// Validate the chain and build its polygon.
pub(super) fn check_chain(curves: &[Curve]) -> Result<Vec<Point2>> {
    if curves.is_empty() {
        return Err(ProxError::DegenerateGeometry("empty loop".into()));
    }
    let closure = Tolerance::DEFAULT_LINEAR;

    let mut diag: f64 = 0.0;
    for (i, curve) in curves.iter().enumerate() {
        curve.validate()?;
        let (a, b) = curve.domain();
        for p in [curve.point_at(a), curve.point_at(b)] {
            if p.z.abs() > closure {
                return Err(ProxError::DegenerateGeometry(format!(
                    "loop curve {i} leaves the parameter plane: z = {}",
                    p.z
                )));
            }
        }
        diag = diag.max(curve.bounding_box().diagonal());
    }

    let n = curves.len();
    for i in 0..n {
        let end = curves[i].point_at(curves[i].domain().1);
        let next = &curves[(i + 1) % n];
        let start = next.point_at(next.domain().0);
        if end.distance(start) > closure {
            return Err(ProxError::DegenerateGeometry(format!(
                "loop is not closed: curve {i} ends at {end:?}, curve {} starts at {start:?}",
                (i + 1) % n
            )));
        }
    }

    let tolerance = (diag * POLYGON_TOLERANCE).max(1e-12);
    let mut polygon = Vec::new();
    for curve in curves {
        let mut points = curve_to_polyline(curve, tolerance);
        // The end point repeats the next curve's start
        points.pop();
        polygon.extend(points.into_iter().map(|p| p.truncate()));
    }
    Ok(polygon)
}

fn cross(a: Vector2, b: Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

fn polygon_area(points: &[Point2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| cross(points[i], points[(i + 1) % n]))
        .sum::<f64>()
        * 0.5
}

fn closest_on_segment(p: Point2, a: Point2, b: Point2) -> Point2 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 < 1e-300 {
        return a;
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    a + t * ab
}

fn on_segment(p: Point2, a: Point2, b: Point2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Closed segment intersection test, touching included.
fn segments_intersect(a: Point2, b: Point2, c: Point2, d: Point2) -> bool {
    let d1 = cross(d - c, a - c);
    let d2 = cross(d - c, b - c);
    let d3 = cross(b - a, c - a);
    let d4 = cross(b - a, d - a);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(a, c, d))
        || (d2 == 0.0 && on_segment(b, c, d))
        || (d3 == 0.0 && on_segment(c, a, b))
        || (d4 == 0.0 && on_segment(d, a, b))
}
