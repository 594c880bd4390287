//! Projected Newton descent over a box of (possibly periodic) parameters.

use nalgebra::{DMatrix, DVector};
use prox_core::{ProxError, Result};

use crate::patch::ParamRange;

/// Sufficient decrease constant of the Armijo test.
const ARMIJO: f64 = 1e-4;

/// Smallest line-search step before the iterate is declared stationary.
const MIN_STEP: f64 = 1e-12;

/// Levenberg shifts tried before giving up on a Newton direction.
const MAX_SHIFTS: usize = 40;

/// Objective value and derivatives at one iterate.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub value: f64,
    pub gradient: DVector<f64>,
    pub hessian: DMatrix<f64>,
    /// Per-variable scale of the gradient: the gradient component divided
    /// by this is a cosine, compared against the orthogonality tolerance.
    pub scale: DVector<f64>,
}

/// A smooth objective over a box of parameters.
pub(crate) trait Objective: Sync {
    fn dim(&self) -> usize;

    fn range(&self, i: usize) -> ParamRange;

    fn value(&self, x: &DVector<f64>) -> f64;

    fn evaluate(&self, x: &DVector<f64>) -> Evaluation;

    /// Move `x` back into the feasible set.
    fn project(&self, x: &mut DVector<f64>);
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct NewtonOptions {
    pub max_iterations: usize,
    /// Values at or below this end the search immediately.
    pub value_tolerance: f64,
    pub orthogonality: f64,
    pub step_tolerance: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Minimum {
    pub x: DVector<f64>,
    pub iterations: usize,
}

/// Minimize `objective` from `x0`.
///
/// Each iteration fixes variables held at a bound by the gradient, solves
/// the Newton system on the rest (shifting the Hessian until it is positive
/// definite), backtracks until the Armijo condition holds and projects the
/// trial point back into the feasible set.
pub(crate) fn minimize(
    objective: &impl Objective,
    x0: DVector<f64>,
    options: &NewtonOptions,
    context: &str,
) -> Result<Minimum> {
    let mut x = x0;
    objective.project(&mut x);
    let mut eval = objective.evaluate(&x);

    for iter in 0..options.max_iterations {
        let done = |x: DVector<f64>| Minimum {
            x,
            iterations: iter,
        };

        if eval.value <= options.value_tolerance {
            return Ok(done(x));
        }

        let free = free_variables(objective, &x, &eval.gradient, options.step_tolerance);
        if free.is_empty() || is_stationary(&eval, &free, options.orthogonality) {
            return Ok(done(x));
        }

        let mut step = newton_step(&eval, &free);
        limit_step(objective, &mut step);
        let slope = eval.gradient.dot(&step);
        if slope >= 0.0 {
            return Ok(done(x));
        }

        let mut alpha = 1.0;
        let trial = loop {
            let mut trial = &x + alpha * &step;
            objective.project(&mut trial);
            let value = objective.value(&trial);
            if value <= eval.value + ARMIJO * alpha * slope {
                break Some(trial);
            }
            alpha *= 0.5;
            if alpha < MIN_STEP {
                break None;
            }
        };

        // No descent left at working precision
        let Some(trial) = trial else {
            return Ok(done(x));
        };

        let moved = alpha * step.amax();
        x = trial;
        eval = objective.evaluate(&x);
        if moved <= options.step_tolerance {
            return Ok(Minimum {
                x,
                iterations: iter + 1,
            });
        }
    }

    Err(ProxError::NoConvergence {
        iterations: options.max_iterations,
        context: context.to_string(),
    })
}

/// Indices not pinned to a bound by an outward-pointing descent direction.
fn free_variables(
    objective: &impl Objective,
    x: &DVector<f64>,
    gradient: &DVector<f64>,
    eps: f64,
) -> Vec<usize> {
    (0..objective.dim())
        .filter(|&i| {
            let range = objective.range(i);
            if range.periodic {
                return true;
            }
            let at_lo = x[i] <= range.lo + eps && gradient[i] > 0.0;
            let at_hi = x[i] >= range.hi - eps && gradient[i] < 0.0;
            !(at_lo || at_hi)
        })
        .collect()
}

fn is_stationary(eval: &Evaluation, free: &[usize], orthogonality: f64) -> bool {
    let norm = (2.0 * eval.value).sqrt();
    free.iter()
        .all(|&i| eval.gradient[i].abs() <= orthogonality * norm * eval.scale[i])
}

/// Newton direction on the free variables, zero elsewhere.
fn newton_step(eval: &Evaluation, free: &[usize]) -> DVector<f64> {
    let m = free.len();
    let h = DMatrix::from_fn(m, m, |r, c| eval.hessian[(free[r], free[c])]);
    let g = DVector::from_fn(m, |r, _| eval.gradient[free[r]]);

    let diag = (0..m).map(|i| h[(i, i)].abs()).fold(0.0, f64::max);
    let mut shift = 0.0;
    let mut reduced = None;
    for _ in 0..MAX_SHIFTS {
        let shifted = &h + DMatrix::identity(m, m) * shift;
        if let Some(chol) = shifted.cholesky() {
            reduced = Some(chol.solve(&(-&g)));
            break;
        }
        shift = if shift == 0.0 {
            1e-10 * (1.0 + diag)
        } else {
            shift * 10.0
        };
    }
    let reduced = reduced.unwrap_or_else(|| -&g);

    let mut step = DVector::zeros(eval.gradient.len());
    for (r, &i) in free.iter().enumerate() {
        step[i] = reduced[r];
    }
    step
}

/// Shrink `step` so no variable moves more than half its range at once.
fn limit_step(objective: &impl Objective, step: &mut DVector<f64>) {
    let mut factor: f64 = 1.0;
    for i in 0..step.len() {
        let half = 0.5 * objective.range(i).width();
        if step[i].abs() > half && half > 0.0 {
            factor = factor.min(half / step[i].abs());
        }
    }
    if factor < 1.0 {
        *step *= factor;
    }
}
