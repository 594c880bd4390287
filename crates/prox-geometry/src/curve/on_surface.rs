//! Parameter-space curves lifted onto a surface.

use prox_math::Vector3;

use super::{Curve, ParametricCurve};
use crate::surface::{ParametricSurface, Surface};

/// `S(c(t))` for a curve `c` drawn in the `(u, v)` plane of `surface`
/// (x = u, y = v, z ignored).
#[derive(Debug, Clone, Copy)]
pub struct CurveOnSurface<'a> {
    pub surface: &'a Surface,
    pub curve: &'a Curve,
}

impl<'a> CurveOnSurface<'a> {
    pub fn new(surface: &'a Surface, curve: &'a Curve) -> Self {
        Self { surface, curve }
    }
}

impl ParametricCurve for CurveOnSurface<'_> {
    /// Derivatives by composing truncated Taylor series.
    ///
    /// With `δu(h) = Σ u_i h^i / i!` and `δv(h)` likewise,
    /// `S(u + δu, v + δv) = Σ S_kl δu^k δv^l / (k! l!)`; the coefficient of
    /// `h^m` times `m!` is the m-th derivative.
    fn derivatives(&self, t: f64, order: usize) -> Vec<Vector3> {
        let c = self.curve.derivatives(t, order);
        let (u, v) = (c[0].x, c[0].y);
        let skl = self.surface.derivatives(u, v, order);
        if order == 0 {
            return vec![skl[0][0]];
        }

        let mut fact = vec![1.0; order + 1];
        for i in 1..=order {
            fact[i] = fact[i - 1] * i as f64;
        }

        let mut du = vec![0.0; order + 1];
        let mut dv = vec![0.0; order + 1];
        for i in 1..=order {
            du[i] = c[i].x / fact[i];
            dv[i] = c[i].y / fact[i];
        }

        let pow_u = powers(&du, order);
        let pow_v = powers(&dv, order);

        let mut series = vec![Vector3::ZERO; order + 1];
        for k in 0..=order {
            for l in 0..=(order - k) {
                let coeff = poly_mul(&pow_u[k], &pow_v[l], order);
                let s = skl[k][l] / (fact[k] * fact[l]);
                for (m, &a) in coeff.iter().enumerate() {
                    if a != 0.0 {
                        series[m] += a * s;
                    }
                }
            }
        }

        series
            .into_iter()
            .enumerate()
            .map(|(m, s)| s * fact[m])
            .collect()
    }

    fn domain(&self) -> (f64, f64) {
        self.curve.domain()
    }

    fn is_periodic(&self) -> bool {
        self.curve.is_periodic()
    }
}

/// Truncated powers `p^0 .. p^n` of a polynomial with zero constant term.
fn powers(p: &[f64], n: usize) -> Vec<Vec<f64>> {
    let mut out = Vec::with_capacity(n + 1);
    let mut one = vec![0.0; n + 1];
    one[0] = 1.0;
    out.push(one);
    for k in 1..=n {
        let next = poly_mul(&out[k - 1], p, n);
        out.push(next);
    }
    out
}

fn poly_mul(a: &[f64], b: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n + 1];
    for (i, &x) in a.iter().enumerate().take(n + 1) {
        if x == 0.0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate().take(n + 1 - i) {
            out[i + j] += x * y;
        }
    }
    out
}
