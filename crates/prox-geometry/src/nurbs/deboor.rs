//! De Boor evaluation of B-spline and NURBS points and derivatives.
//!
//! Every routine evaluates through a [`Basis`], which clamps or wraps the
//! parameter into the spline's domain.

use prox_math::{Point3, Vector3, DVec3};

use super::knot::Basis;

/// Binomial coefficient `C(n, k)` as a float.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Evaluate a B-spline curve point at parameter `t`.
pub fn curve_point(basis: &Basis<'_>, control_points: &[Point3], t: f64) -> Point3 {
    let eval = basis.eval(t, 0);
    let first = eval.first_index(basis.degree());

    eval.values()
        .iter()
        .enumerate()
        .fold(DVec3::ZERO, |acc, (i, &b)| acc + b * control_points[first + i])
}

/// Evaluate a rational B-spline (NURBS) curve point at parameter `t`.
pub fn nurbs_curve_point(
    basis: &Basis<'_>,
    control_points: &[Point3],
    weights: &[f64],
    t: f64,
) -> Point3 {
    let eval = basis.eval(t, 0);
    let first = eval.first_index(basis.degree());

    let mut point = DVec3::ZERO;
    let mut w = 0.0;
    for (i, &b) in eval.values().iter().enumerate() {
        let bw = b * weights[first + i];
        point += bw * control_points[first + i];
        w += bw;
    }

    if w.abs() < 1e-15 {
        point
    } else {
        point / w
    }
}

/// Point and derivatives up to `order` of a B-spline curve.
///
/// `ck[k]` is the k-th derivative; `ck[0]` is the point.
pub fn curve_derivatives(
    basis: &Basis<'_>,
    control_points: &[Point3],
    t: f64,
    order: usize,
) -> Vec<Vector3> {
    let eval = basis.eval(t, order);
    let first = eval.first_index(basis.degree());

    eval.derivs
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold(DVec3::ZERO, |acc, (j, &b)| acc + b * control_points[first + j])
        })
        .collect()
}

/// Point and derivatives up to `order` of a NURBS curve.
///
/// Uses the quotient rule on the homogeneous curve:
/// `C^(k) = (A^(k) - sum_{i=1..k} C(k,i) w^(i) C^(k-i)) / w`.
pub fn nurbs_curve_derivatives(
    basis: &Basis<'_>,
    control_points: &[Point3],
    weights: &[f64],
    t: f64,
    order: usize,
) -> Vec<Vector3> {
    let eval = basis.eval(t, order);
    let first = eval.first_index(basis.degree());

    let mut aders = vec![DVec3::ZERO; order + 1];
    let mut wders = vec![0.0; order + 1];
    for (k, row) in eval.derivs.iter().enumerate() {
        for (j, &b) in row.iter().enumerate() {
            let w = weights[first + j];
            aders[k] += b * w * control_points[first + j];
            wders[k] += b * w;
        }
    }

    if wders[0].abs() < 1e-15 {
        return aders;
    }

    let mut ck = vec![DVec3::ZERO; order + 1];
    for k in 0..=order {
        let mut v = aders[k];
        for i in 1..=k {
            v -= binomial(k, i) * wders[i] * ck[k - i];
        }
        ck[k] = v / wders[0];
    }
    ck
}

/// Evaluate a B-spline surface point at parameters `(u, v)`.
pub fn surface_point(
    basis_u: &Basis<'_>,
    basis_v: &Basis<'_>,
    control_points: &[Vec<Point3>],
    u: f64,
    v: f64,
) -> Point3 {
    surface_derivatives(basis_u, basis_v, control_points, u, v, 0)[0][0]
}

/// Mixed partial derivatives `skl[k][l]` = d^(k+l) S / du^k dv^l for
/// `k + l <= order`. Entries with `k + l > order` are left zero.
///
/// `control_points[i][j]` is indexed by u first, then v.
pub fn surface_derivatives(
    basis_u: &Basis<'_>,
    basis_v: &Basis<'_>,
    control_points: &[Vec<Point3>],
    u: f64,
    v: f64,
    order: usize,
) -> Vec<Vec<Vector3>> {
    let (aders, _) =
        homogeneous_surface_derivatives(basis_u, basis_v, control_points, None, u, v, order);
    aders
}

/// Mixed partial derivatives of a NURBS surface, same layout as
/// [`surface_derivatives`].
pub fn nurbs_surface_derivatives(
    basis_u: &Basis<'_>,
    basis_v: &Basis<'_>,
    control_points: &[Vec<Point3>],
    weights: &[Vec<f64>],
    u: f64,
    v: f64,
    order: usize,
) -> Vec<Vec<Vector3>> {
    let (aders, wders) = homogeneous_surface_derivatives(
        basis_u,
        basis_v,
        control_points,
        Some(weights),
        u,
        v,
        order,
    );

    let w0 = wders[0][0];
    if w0.abs() < 1e-15 {
        return aders;
    }

    let mut skl = vec![vec![DVec3::ZERO; order + 1]; order + 1];
    for k in 0..=order {
        for l in 0..=(order - k) {
            let mut v = aders[k][l];
            for j in 1..=l {
                v -= binomial(l, j) * wders[0][j] * skl[k][l - j];
            }
            for i in 1..=k {
                v -= binomial(k, i) * wders[i][0] * skl[k - i][l];
                let mut v2 = DVec3::ZERO;
                for j in 1..=l {
                    v2 += binomial(l, j) * wders[i][j] * skl[k - i][l - j];
                }
                v -= binomial(k, i) * v2;
            }
            skl[k][l] = v / w0;
        }
    }
    skl
}

/// Derivatives of the weighted control net `w * P` and of the weight function.
/// Without weights every weight is one and `wders` is the constant 1 field.
#[allow(clippy::type_complexity)]
fn homogeneous_surface_derivatives(
    basis_u: &Basis<'_>,
    basis_v: &Basis<'_>,
    control_points: &[Vec<Point3>],
    weights: Option<&[Vec<f64>]>,
    u: f64,
    v: f64,
    order: usize,
) -> (Vec<Vec<Vector3>>, Vec<Vec<f64>>) {
    let (degree_u, degree_v) = (basis_u.degree(), basis_v.degree());
    let bu = basis_u.eval(u, order);
    let bv = basis_v.eval(v, order);
    let first_u = bu.first_index(degree_u);
    let first_v = bv.first_index(degree_v);
    let weight = |i: usize, j: usize| weights.map_or(1.0, |w| w[i][j]);

    let mut aders = vec![vec![DVec3::ZERO; order + 1]; order + 1];
    let mut wders = vec![vec![0.0; order + 1]; order + 1];

    for k in 0..=order {
        // Contract the u direction first
        let mut temp = vec![DVec3::ZERO; degree_v + 1];
        let mut temp_w = vec![0.0; degree_v + 1];
        for s in 0..=degree_v {
            for r in 0..=degree_u {
                let (i, j) = (first_u + r, first_v + s);
                let bw = bu.derivs[k][r] * weight(i, j);
                temp[s] += bw * control_points[i][j];
                temp_w[s] += bw;
            }
        }
        for l in 0..=(order - k) {
            for s in 0..=degree_v {
                aders[k][l] += bv.derivs[l][s] * temp[s];
                wders[k][l] += bv.derivs[l][s] * temp_w[s];
            }
        }
    }

    (aders, wders)
}
