//! Tuning knobs for proximity queries.

use prox_core::{ProxError, Result, Tolerance};
use serde::{Deserialize, Serialize};

/// Inclusive range of sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: usize,
    pub max: usize,
}

impl SampleRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn clamp(self, n: usize) -> usize {
        n.clamp(self.min, self.max)
    }
}

/// Sampling, seeding and convergence settings shared by every query.
///
/// Passed explicitly; nothing is read from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Distances at or below this are treated as touching.
    pub tolerance: f64,
    /// Samples seeding a point-curve search.
    pub point_curve_samples: SampleRange,
    /// Samples per curve seeding a curve-curve or curve-face search.
    pub pair_curve_samples: SampleRange,
    /// Grid resolution per parameter direction of a face.
    pub face_grid: SampleRange,
    /// Grid resolution used unless the face needs more.
    pub face_grid_default: usize,
    /// Boundary samples added per loop of a face.
    pub boundary_samples: usize,
    /// Distinct seeds refined by local descent.
    pub seeds: usize,
    /// Iteration cap of every local optimizer.
    pub max_iterations: usize,
    /// Cosine between the separation vector and a tangent below which a
    /// witness pair is accepted as stationary.
    pub orthogonality_tolerance: f64,
    /// Dispatch seeds and face pairs on the rayon pool.
    pub parallel: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT_LINEAR,
            point_curve_samples: SampleRange::new(10, 20),
            pair_curve_samples: SampleRange::new(5, 10),
            face_grid: SampleRange::new(4, 16),
            face_grid_default: 10,
            boundary_samples: 16,
            seeds: 3,
            max_iterations: 100,
            orthogonality_tolerance: 1e-9,
            parallel: true,
        }
    }
}

impl ProximityConfig {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    /// Reject settings no query could run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ProxError::InvalidParameter(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        for (name, range, floor) in [
            ("point_curve_samples", self.point_curve_samples, 2),
            ("pair_curve_samples", self.pair_curve_samples, 2),
            ("face_grid", self.face_grid, 2),
        ] {
            if range.min < floor || range.min > range.max {
                return Err(ProxError::InvalidParameter(format!(
                    "{name} must satisfy {floor} <= min <= max, got {}..={}",
                    range.min, range.max
                )));
            }
        }
        if self.seeds == 0 {
            return Err(ProxError::InvalidParameter("seeds must be at least 1".into()));
        }
        if self.max_iterations == 0 {
            return Err(ProxError::InvalidParameter(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(self.orthogonality_tolerance > 0.0 && self.orthogonality_tolerance < 1.0) {
            return Err(ProxError::InvalidParameter(format!(
                "orthogonality_tolerance must lie in (0, 1), got {}",
                self.orthogonality_tolerance
            )));
        }
        Ok(())
    }
}
