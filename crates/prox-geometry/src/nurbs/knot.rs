//! Knot vector utilities and B-spline basis evaluation.

use prox_core::{ProxError, Result};
use serde::{Deserialize, Serialize};

/// A non-decreasing sequence of knots partitioning a spline's parameter domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    /// Wrap a knot sequence, checking it is finite and non-decreasing.
    pub fn new(knots: Vec<f64>) -> Result<Self> {
        if knots.len() < 2 {
            return Err(ProxError::InvalidKnotVector(format!(
                "need at least 2 knots, got {}",
                knots.len()
            )));
        }
        if let Some(bad) = knots.iter().find(|k| !k.is_finite()) {
            return Err(ProxError::InvalidKnotVector(format!("non-finite knot {bad}")));
        }
        if let Some(i) = knots.windows(2).position(|w| w[1] < w[0]) {
            return Err(ProxError::InvalidKnotVector(format!(
                "knots must be non-decreasing: knots[{}] = {} > knots[{}] = {}",
                i,
                knots[i],
                i + 1,
                knots[i + 1]
            )));
        }
        Ok(Self(knots))
    }

    /// Expand distinct knot values and their multiplicities into a full knot vector.
    pub fn from_multiplicities(values: &[f64], multiplicities: &[usize]) -> Result<Self> {
        if values.len() != multiplicities.len() {
            return Err(ProxError::InvalidKnotVector(format!(
                "{} knot values but {} multiplicities",
                values.len(),
                multiplicities.len()
            )));
        }
        let knots = values
            .iter()
            .zip(multiplicities)
            .flat_map(|(&k, &m)| std::iter::repeat(k).take(m))
            .collect();
        Self::new(knots)
    }

    /// Clamped knot vector with uniformly spaced interior knots over `[0, 1]`.
    pub fn uniform_clamped(degree: usize, n_control: usize) -> Self {
        let n_spans = n_control.saturating_sub(degree).max(1);
        let mut knots = vec![0.0; degree + 1];
        for i in 1..n_spans {
            knots.push(i as f64 / n_spans as f64);
        }
        knots.extend(std::iter::repeat(1.0).take(degree + 1));
        Self(knots)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the invariants tying this knot vector to a degree and a
    /// control-point count.
    pub fn validate_for(&self, degree: usize, n_control: usize) -> Result<()> {
        Self::new(self.0.clone())?;
        if degree == 0 {
            return Err(ProxError::InvalidKnotVector("degree must be at least 1".into()));
        }
        if n_control <= degree {
            return Err(ProxError::InvalidKnotVector(format!(
                "degree {degree} needs at least {} control points, got {n_control}",
                degree + 1
            )));
        }
        let expected = n_control + degree + 1;
        if self.0.len() != expected {
            return Err(ProxError::InvalidKnotVector(format!(
                "knot vector length must be n + p + 1 = {expected}, got {} knots for {n_control} control points with degree {degree}",
                self.0.len()
            )));
        }
        // Interior knots: those strictly inside the first and last p + 1 entries
        let (a, b) = self.domain(degree);
        if b <= a {
            return Err(ProxError::InvalidKnotVector(format!(
                "empty parameter domain [{a}, {b}]"
            )));
        }
        let mut i = degree + 1;
        while i < n_control {
            let m = self.multiplicity_at(i);
            if m > degree {
                return Err(ProxError::InvalidKnotVector(format!(
                    "interior knot {} has multiplicity {m} > degree {degree}",
                    self.0[i]
                )));
            }
            i += m;
        }
        Ok(())
    }

    /// Parameter domain `(knots[p], knots[len - p - 1])`.
    pub fn domain(&self, degree: usize) -> (f64, f64) {
        (self.0[degree], self.0[self.0.len() - degree - 1])
    }

    /// Whether the first and last knots are repeated `degree + 1` times.
    pub fn is_clamped(&self, degree: usize) -> bool {
        let n = self.0.len();
        n > 2 * degree + 1
            && self.0[..=degree].iter().all(|&k| k == self.0[0])
            && self.0[n - degree - 1..].iter().all(|&k| k == self.0[n - 1])
    }

    /// Number of consecutive knots equal to `knots[index]`, starting at `index`.
    fn multiplicity_at(&self, index: usize) -> usize {
        let k = self.0[index];
        self.0[index..].iter().take_while(|&&x| x == k).count()
    }
}

impl AsRef<[f64]> for KnotVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Reduce a parameter into the periodic domain `[a, b)`.
pub fn reduce_periodic(t: f64, (a, b): (f64, f64)) -> f64 {
    let period = b - a;
    if period <= 0.0 || !t.is_finite() {
        return t;
    }
    a + (t - a).rem_euclid(period)
}

/// Find the knot span index for parameter `t` in the knot vector.
///
/// Returns the index `i` such that `knots[i] <= t < knots[i+1]`,
/// with special handling for the upper boundary.
///
/// # Arguments
/// * `degree` - Degree of the B-spline
/// * `knots` - The knot vector
/// * `n` - Number of control points minus 1
/// * `t` - Parameter value
pub fn find_span(degree: usize, knots: &[f64], n: usize, t: f64) -> usize {
    // Special case: t at upper boundary
    if t >= knots[n + 1] {
        return n;
    }
    if t <= knots[degree] {
        return degree;
    }

    // Binary search
    let mut low = degree;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;

    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }

    mid
}

/// `num / den`, with a zero-width knot span contributing zero.
#[inline]
fn span_ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Compute the non-vanishing basis functions at parameter `t`.
///
/// Returns a vector of `degree + 1` basis function values N_{span-degree,degree}(t)
/// through N_{span,degree}(t).
pub fn basis_functions(degree: usize, knots: &[f64], span: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            let temp = span_ratio(n[r], right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }

        n[j] = saved;
    }

    n
}

/// Compute the non-vanishing basis functions and their derivatives up to
/// `order` at parameter `t`.
///
/// Returns `ders` with `order + 1` rows where `ders[k][j]` is the k-th
/// derivative of N_{span-degree+j,degree}(t). Rows above `degree` are zero.
#[allow(clippy::needless_range_loop)]
pub fn basis_function_derivs(
    degree: usize,
    knots: &[f64],
    span: usize,
    t: f64,
    order: usize,
) -> Vec<Vec<f64>> {
    let p = degree;
    let n = order.min(p);

    // Triangular table: upper part holds basis values, lower part knot differences
    let mut ndu = vec![vec![0.0; p + 1]; p + 1];
    let mut left = vec![0.0; p + 1];
    let mut right = vec![0.0; p + 1];

    ndu[0][0] = 1.0;

    for j in 1..=p {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;

        for r in 0..j {
            // Lower triangle
            ndu[j][r] = right[r + 1] + left[j - r];
            let temp = span_ratio(ndu[r][j - 1], ndu[j][r]);

            // Upper triangle
            ndu[r][j] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        ndu[j][j] = saved;
    }

    let mut ders = vec![vec![0.0; p + 1]; order + 1];
    for j in 0..=p {
        ders[0][j] = ndu[j][p];
    }

    let mut a = vec![vec![0.0; p + 1]; 2];

    for r in 0..=p {
        let mut s1 = 0usize;
        let mut s2 = 1usize;
        a[0][0] = 1.0;

        for k in 1..=n {
            let mut d = 0.0;
            let rk = r as isize - k as isize;
            let pk = p - k;

            if rk >= 0 {
                let rk = rk as usize;
                a[s2][0] = span_ratio(a[s1][0], ndu[pk + 1][rk]);
                d = a[s2][0] * ndu[rk][pk];
            }

            let j1 = if rk >= -1 { 1 } else { (-rk) as usize };
            let j2 = if r as isize - 1 <= pk as isize { k - 1 } else { p - r };

            for j in j1..=j2 {
                let idx = (rk + j as isize) as usize;
                a[s2][j] = span_ratio(a[s1][j] - a[s1][j - 1], ndu[pk + 1][idx]);
                d += a[s2][j] * ndu[idx][pk];
            }

            if r <= pk {
                a[s2][k] = span_ratio(-a[s1][k - 1], ndu[pk + 1][r]);
                d += a[s2][k] * ndu[r][pk];
            }

            ders[k][r] = d;
            std::mem::swap(&mut s1, &mut s2);
        }
    }

    // Multiply through by the correct factors p! / (p - k)!
    let mut factor = p as f64;
    for k in 1..=n {
        for val in &mut ders[k] {
            *val *= factor;
        }
        factor *= (p - k) as f64;
    }

    ders
}

/// Result of a basis evaluation at one parameter.
#[derive(Debug, Clone)]
pub struct BasisEval {
    /// Knot span containing the parameter.
    pub span: usize,
    /// `derivs[k][j]`: k-th derivative of basis function `span - degree + j`.
    pub derivs: Vec<Vec<f64>>,
}

impl BasisEval {
    /// Basis function values (order 0).
    pub fn values(&self) -> &[f64] {
        &self.derivs[0]
    }

    /// Index of the control point weighted by `values()[0]`.
    pub fn first_index(&self, degree: usize) -> usize {
        self.span - degree
    }
}

/// Validated basis evaluator for one knot vector, degree and control-point count.
///
/// Parameters outside the domain are clamped, or wrapped for a periodic
/// basis.
#[derive(Debug, Clone, Copy)]
pub struct Basis<'a> {
    degree: usize,
    knots: &'a [f64],
    n_control: usize,
    periodic: bool,
}

impl<'a> Basis<'a> {
    /// Fails with `InvalidKnotVector` when the knot vector does not fit
    /// `degree` and `n_control`.
    pub fn new(degree: usize, knots: &'a KnotVector, n_control: usize) -> Result<Self> {
        knots.validate_for(degree, n_control)?;
        Ok(Self::checked_by_owner(degree, knots, n_control))
    }

    /// Basis for a spline whose constructor and `Validate` impl already
    /// ran `validate_for` on these arguments.
    pub(crate) fn checked_by_owner(degree: usize, knots: &'a KnotVector, n_control: usize) -> Self {
        Self {
            degree,
            knots: knots.as_slice(),
            n_control,
            periodic: false,
        }
    }

    /// Treat the domain as a circle: parameters are reduced modulo the period.
    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn n_control(&self) -> usize {
        self.n_control
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.knots[self.degree], self.knots[self.n_control])
    }

    /// Evaluate all non-zero basis functions and their derivatives up to `order`.
    pub fn eval(&self, t: f64, order: usize) -> BasisEval {
        let domain = self.domain();
        let t = if self.periodic {
            reduce_periodic(t, domain)
        } else {
            t.clamp(domain.0, domain.1)
        };
        let span = find_span(self.degree, self.knots, self.n_control - 1, t);
        let derivs = if order == 0 {
            vec![basis_functions(self.degree, self.knots, span, t)]
        } else {
            basis_function_derivs(self.degree, self.knots, span, t, order)
        };
        BasisEval { span, derivs }
    }
}
