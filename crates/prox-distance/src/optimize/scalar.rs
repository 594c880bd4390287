//! One-dimensional bracketed minimization.

use prox_core::{ProxError, Result};

/// Minimizer found by [`minimize_bracketed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScalarMinimum {
    pub t: f64,
    pub value: f64,
    pub iterations: usize,
}

/// Minimize `f` over `[lo, hi]` given `eval(t) = (f, f', f'')`.
///
/// When `f'` changes sign over the bracket the stationary point is located
/// with Newton steps, falling back to bisection whenever a step leaves the
/// bracket or the curvature is not positive. Otherwise the smaller end wins.
pub(crate) fn minimize_bracketed<F>(
    eval: F,
    (lo, hi): (f64, f64),
    tolerance: f64,
    max_iterations: usize,
) -> Result<ScalarMinimum>
where
    F: Fn(f64) -> (f64, f64, f64),
{
    let (f_lo, g_lo, _) = eval(lo);
    let (f_hi, g_hi, _) = eval(hi);
    let end = if f_hi < f_lo {
        ScalarMinimum {
            t: hi,
            value: f_hi,
            iterations: 0,
        }
    } else {
        ScalarMinimum {
            t: lo,
            value: f_lo,
            iterations: 0,
        }
    };
    if !(g_lo < 0.0 && g_hi > 0.0) {
        return Ok(end);
    }

    let (mut a, mut b) = (lo, hi);
    let mut t = 0.5 * (a + b);
    let (_, mut g, mut h) = eval(t);

    for iter in 0..max_iterations {
        if g < 0.0 {
            a = t;
        } else {
            b = t;
        }

        let newton = t - g / h;
        let next = if h > 0.0 && newton > a && newton < b {
            newton
        } else {
            0.5 * (a + b)
        };

        let step = (next - t).abs();
        t = next;
        let (value, g_next, h_next) = eval(t);
        (g, h) = (g_next, h_next);

        if g == 0.0 || step <= tolerance || b - a <= tolerance {
            let found = ScalarMinimum {
                t,
                value,
                iterations: iter + 1,
            };
            return Ok(if end.value < found.value { end } else { found });
        }
    }

    Err(ProxError::NoConvergence {
        iterations: max_iterations,
        context: "bracketed scalar descent".into(),
    })
}
