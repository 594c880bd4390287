//! Single entry point dispatching on the kinds of both entities.

use prox_core::traits::Validate;
use prox_core::{ProxError, Result, Tolerance};
use prox_geometry::curve::Curve;
use prox_math::Point3;
use prox_topology::{Face, Shell};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ProximityConfig;
use crate::curve::curve_curve;
use crate::face::{curve_face, face_face};
use crate::point::{point_curve, point_face, point_point};
use crate::result::{Proximity, Quality};
use crate::shell::{curve_shell, face_shell, point_shell, shell_shell};

/// Anything a proximity query accepts. Entities are borrowed for the
/// duration of the query.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Point(Point3),
    Curve(&'a Curve),
    Face(&'a Face),
    Shell(&'a Shell),
}

impl Entity<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Entity::Point(_) => "point",
            Entity::Curve(_) => "curve",
            Entity::Face(_) => "face",
            Entity::Shell(_) => "shell",
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Entity::Point(p) if !p.is_finite() => Err(ProxError::DegenerateGeometry(format!(
                "point is not finite: {p:?}"
            ))),
            Entity::Point(_) => Ok(()),
            Entity::Curve(c) => c.validate(),
            Entity::Face(f) => f.validate(),
            Entity::Shell(s) => s.validate(),
        }
    }
}

impl From<Point3> for Entity<'_> {
    fn from(p: Point3) -> Self {
        Entity::Point(p)
    }
}

impl<'a> From<&'a Curve> for Entity<'a> {
    fn from(c: &'a Curve) -> Self {
        Entity::Curve(c)
    }
}

impl<'a> From<&'a Face> for Entity<'a> {
    fn from(f: &'a Face) -> Self {
        Entity::Face(f)
    }
}

impl<'a> From<&'a Shell> for Entity<'a> {
    fn from(s: &'a Shell) -> Self {
        Entity::Shell(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Include the witness pair in the result.
    pub return_points: bool,
    /// Overrides `config.tolerance`.
    pub tolerance: f64,
    pub config: ProximityConfig,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            return_points: false,
            tolerance: Tolerance::DEFAULT_LINEAR,
            config: ProximityConfig::default(),
        }
    }
}

impl QueryOptions {
    pub fn with_points() -> Self {
        Self {
            return_points: true,
            ..Self::default()
        }
    }
}

/// Outcome of [`distance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub distance: f64,
    /// Witnesses on the first and second entity, when requested.
    pub points: Option<(Point3, Point3)>,
    pub quality: Quality,
}

/// Minimum distance between `a` and `b`.
///
/// Fails with `InvalidParameter` for unusable options and with the
/// entity's own error when either input is degenerate.
#[instrument(skip_all, fields(a = a.kind(), b = b.kind()))]
pub fn distance(a: Entity<'_>, b: Entity<'_>, options: &QueryOptions) -> Result<Measure> {
    let config = ProximityConfig {
        tolerance: options.tolerance,
        ..options.config.clone()
    };
    let prox = proximity(a, b, &config)?;
    Ok(Measure {
        distance: prox.distance,
        points: options.return_points.then(|| prox.points()),
        quality: prox.quality,
    })
}

/// Full result with witness parameters, for any pair of entity kinds.
pub fn proximity(a: Entity<'_>, b: Entity<'_>, config: &ProximityConfig) -> Result<Proximity> {
    config.validate()?;
    a.validate()?;
    b.validate()?;

    use Entity as E;
    let prox = match (a, b) {
        (E::Point(p), E::Point(q)) => Some(point_point(p, q)),
        (E::Point(p), E::Curve(c)) => Some(point_curve(p, c, config)),
        (E::Point(p), E::Face(f)) => Some(point_face(p, f, config)),
        (E::Point(p), E::Shell(s)) => point_shell(p, s, config),
        (E::Curve(c), E::Curve(d)) => Some(curve_curve(c, d, config)),
        (E::Curve(c), E::Face(f)) => Some(curve_face(c, f, config)),
        (E::Curve(c), E::Shell(s)) => curve_shell(c, s, config),
        (E::Face(f), E::Face(g)) => Some(face_face(f, g, config)),
        (E::Face(f), E::Shell(s)) => face_shell(f, s, config),
        (E::Shell(s), E::Shell(t)) => shell_shell(s, t, config),
        // Remaining pairs are the ones above with the roles exchanged
        (first, second) => return proximity(second, first, config).map(Proximity::swapped),
    };

    // Validated shells are never empty
    prox.ok_or_else(|| ProxError::DegenerateGeometry("shell has no faces".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prox_geometry::curve::LineSegment;
    use prox_math::DVec3;

    #[test]
    fn test_points_only_when_requested() {
        let a = Entity::Point(DVec3::ZERO);
        let b = Entity::Point(DVec3::new(3.0, 4.0, 0.0));
        let plain = distance(a, b, &QueryOptions::default()).unwrap();
        assert_eq!(plain.distance, 5.0);
        assert!(plain.points.is_none());

        let with = distance(a, b, &QueryOptions::with_points()).unwrap();
        assert_eq!(with.points, Some((DVec3::ZERO, DVec3::new(3.0, 4.0, 0.0))));
    }

    #[test]
    fn test_swapped_arguments_swap_witnesses() {
        let line = Curve::from(LineSegment::new(DVec3::new(-1.0, 1.0, 0.0), DVec3::new(1.0, 1.0, 0.0)));
        let config = ProximityConfig::default();
        let forward = proximity(Entity::Point(DVec3::ZERO), Entity::from(&line), &config).unwrap();
        let backward = proximity(Entity::from(&line), Entity::Point(DVec3::ZERO), &config).unwrap();
        assert_eq!(forward, backward.swapped());
    }

    #[test]
    fn test_bad_tolerance_rejected() {
        let options = QueryOptions {
            tolerance: -1.0,
            ..Default::default()
        };
        let res = distance(Entity::Point(DVec3::ZERO), Entity::Point(DVec3::X), &options);
        assert!(matches!(res, Err(ProxError::InvalidParameter(_))));
    }

    #[test]
    fn test_degenerate_curve_rejected() {
        let line = Curve::from(LineSegment::new(DVec3::X, DVec3::X));
        let res = distance(
            Entity::Point(DVec3::ZERO),
            Entity::from(&line),
            &QueryOptions::default(),
        );
        assert!(matches!(res, Err(ProxError::DegenerateGeometry(_))));
    }
}
