//! Multi-start minimization of the distance between two patches.

use nalgebra::{DMatrix, DVector};
use prox_core::Tolerance;
use prox_math::{Aabb3, Vector3};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ProximityConfig;
use crate::optimize::newton::{self, Evaluation, NewtonOptions, Objective};
use crate::patch::{ParamRange, Params, Patch, Sample};
use crate::result::{Proximity, Quality};

/// `0.5 * |A(a) - B(b)|^2` over the concatenated parameters of both patches.
struct PairObjective<'p> {
    a: &'p dyn Patch,
    b: &'p dyn Patch,
}

impl PairObjective<'_> {
    fn split(&self, x: &DVector<f64>) -> (Params, Params) {
        let da = self.a.dim();
        let mut xa = [0.0; 2];
        let mut xb = [0.0; 2];
        for i in 0..da {
            xa[i] = x[i];
        }
        for i in 0..self.b.dim() {
            xb[i] = x[da + i];
        }
        (xa, xb)
    }

    fn join(&self, xa: Params, xb: Params) -> DVector<f64> {
        let da = self.a.dim();
        DVector::from_fn(self.dim(), |i, _| if i < da { xa[i] } else { xb[i - da] })
    }
}

impl Objective for PairObjective<'_> {
    fn dim(&self) -> usize {
        self.a.dim() + self.b.dim()
    }

    fn range(&self, i: usize) -> ParamRange {
        let da = self.a.dim();
        if i < da {
            self.a.range(i)
        } else {
            self.b.range(i - da)
        }
    }

    fn value(&self, x: &DVector<f64>) -> f64 {
        let (xa, xb) = self.split(x);
        0.5 * self.a.point(xa).distance_squared(self.b.point(xb))
    }

    fn evaluate(&self, x: &DVector<f64>) -> Evaluation {
        let (xa, xb) = self.split(x);
        let ja = self.a.jet(xa);
        let jb = self.b.jet(xb);
        let da = self.a.dim();
        let n = self.dim();
        let d = ja.point - jb.point;

        // Derivatives of the separation vector d = A - B
        let tangent = |k: usize| -> Vector3 {
            if k < da {
                ja.first[k]
            } else {
                -jb.first[k - da]
            }
        };
        let curvature = |k: usize, l: usize| -> Vector3 {
            match (k < da, l < da) {
                (true, true) => ja.second[k][l],
                (false, false) => -jb.second[k - da][l - da],
                _ => Vector3::ZERO,
            }
        };

        Evaluation {
            value: 0.5 * d.length_squared(),
            gradient: DVector::from_fn(n, |k, _| d.dot(tangent(k))),
            hessian: DMatrix::from_fn(n, n, |k, l| {
                tangent(k).dot(tangent(l)) + d.dot(curvature(k, l))
            }),
            scale: DVector::from_fn(n, |k, _| tangent(k).length()),
        }
    }

    fn project(&self, x: &mut DVector<f64>) {
        let (mut xa, mut xb) = self.split(x);
        self.a.project(&mut xa);
        self.b.project(&mut xb);
        *x = self.join(xa, xb);
    }
}

/// Closest pair between `a` and `b`, or `None` when either has no samples.
///
/// All sample pairs are ranked by distance; a pair within tolerance is
/// returned directly. Otherwise the `config.seeds` best spatially distinct
/// pairs are refined by projected Newton descent and the minimum is kept,
/// ties going to the better-ranked seed.
pub(crate) fn search(
    a: &dyn Patch,
    b: &dyn Patch,
    config: &ProximityConfig,
    context: &str,
) -> Option<Proximity> {
    let sa = a.samples();
    let sb = b.samples();
    if sa.is_empty() || sb.is_empty() {
        return None;
    }

    let ranked = rank_pairs(&sa, &sb, config.parallel);
    let &(best, i, j) = ranked.first()?;
    if best <= config.tolerance {
        debug!(context, distance = best, "sample pair within tolerance");
        return Some(Proximity::new(
            a.witness(sa[i].x),
            b.witness(sb[j].x),
            Quality::Converged,
        ));
    }

    let separation = spacing(&sa, a.dim()).max(spacing(&sb, b.dim()));
    let seeds = distinct_seeds(&ranked, &sa, &sb, config.seeds, separation);

    let objective = PairObjective { a, b };
    let options = NewtonOptions {
        max_iterations: config.max_iterations,
        value_tolerance: 0.5 * config.tolerance * config.tolerance,
        orthogonality: config.orthogonality_tolerance,
        step_tolerance: Tolerance::DEFAULT_PARAMETRIC,
    };

    let refine = |&(i, j): &(usize, usize)| {
        let seed = Proximity::new(a.witness(sa[i].x), b.witness(sb[j].x), Quality::Converged);
        if objective.dim() == 0 {
            return seed;
        }
        let x0 = objective.join(sa[i].x, sb[j].x);
        match newton::minimize(&objective, x0, &options, context) {
            Ok(min) => {
                debug!(context, iterations = min.iterations, "descent converged");
                let (xa, xb) = objective.split(&min.x);
                let refined = Proximity::new(a.witness(xa), b.witness(xb), Quality::Converged);
                seed.min(refined)
            }
            Err(err) => {
                warn!(context, %err, "descent failed, keeping the seed sample");
                Proximity {
                    quality: Quality::Fallback,
                    ..seed
                }
            }
        }
    };

    let results: Vec<Proximity> = if config.parallel {
        seeds.par_iter().map(refine).collect()
    } else {
        seeds.iter().map(refine).collect()
    };
    crate::result::closest(results)
}

/// Every sample pair as `(distance, i, j)`, ascending; ties by index.
fn rank_pairs(sa: &[Sample], sb: &[Sample], parallel: bool) -> Vec<(f64, usize, usize)> {
    let row = |(i, s): (usize, &Sample)| -> Vec<(f64, usize, usize)> {
        sb.iter()
            .enumerate()
            .map(|(j, t)| (s.point.distance(t.point), i, j))
            .collect()
    };
    let mut pairs: Vec<_> = if parallel {
        sa.par_iter().enumerate().flat_map_iter(row).collect()
    } else {
        sa.iter().enumerate().flat_map(row).collect()
    };
    pairs.sort_by(|x, y| {
        x.0.total_cmp(&y.0)
            .then(x.1.cmp(&y.1))
            .then(x.2.cmp(&y.2))
    });
    pairs
}

/// Typical distance between neighbouring samples of a `dim`-parameter patch.
fn spacing(samples: &[Sample], dim: usize) -> f64 {
    if dim == 0 || samples.len() < 2 {
        return 0.0;
    }
    let points: Vec<_> = samples.iter().map(|s| s.point).collect();
    let diagonal = Aabb3::from_points(&points).map_or(0.0, |b| b.diagonal());
    let per_direction = (samples.len() as f64).powf(1.0 / dim as f64);
    diagonal / (per_direction - 1.0).max(1.0)
}

/// Up to `k` best pairs whose points on one side or the other lie more
/// than `separation` away from every pair already chosen.
fn distinct_seeds(
    ranked: &[(f64, usize, usize)],
    sa: &[Sample],
    sb: &[Sample],
    k: usize,
    separation: f64,
) -> Vec<(usize, usize)> {
    let mut seeds: Vec<(usize, usize)> = Vec::with_capacity(k);
    for &(_, i, j) in ranked {
        if seeds.len() == k {
            break;
        }
        let distinct = seeds.iter().all(|&(si, sj)| {
            sa[i].point.distance(sa[si].point) > separation
                || sb[j].point.distance(sb[sj].point) > separation
        });
        if distinct {
            seeds.push((i, j));
        }
    }
    seeds
}
