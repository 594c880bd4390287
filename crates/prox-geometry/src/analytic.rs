//! Closed-form helpers shared by the analytic curves and surfaces.

use std::f64::consts::{PI, TAU};

use prox_math::{Aabb3, Frame3, Point3, Vector3};

/// n-th derivative of `(cos θ, sin θ)` with respect to θ.
pub fn cos_sin_derivative(angle: f64, n: usize) -> (f64, f64) {
    let (s, c) = angle.sin_cos();
    match n % 4 {
        0 => (c, s),
        1 => (-s, c),
        2 => (-c, -s),
        _ => (s, -c),
    }
}

/// Whether `angle` lies on the sweep `[start, end]`, taken modulo 2π.
pub fn angle_in_sweep(angle: f64, start: f64, end: f64) -> bool {
    let sweep = end - start;
    if sweep >= TAU {
        return true;
    }
    (angle - start).rem_euclid(TAU) <= sweep + 1e-12
}

/// Exact bounding box of `center + cos θ · a + sin θ · b` for θ in `[start, end]`.
///
/// Along each axis the coordinate `a_i cos θ + b_i sin θ` is extremal at
/// `atan2(b_i, a_i)` and the opposite angle; those inside the sweep are
/// added to the endpoints.
pub fn arc_bounds(center: Point3, a: Vector3, b: Vector3, start: f64, end: f64) -> Aabb3 {
    let at = |theta: f64| {
        let (s, c) = theta.sin_cos();
        center + c * a + s * b
    };

    let mut aabb = Aabb3::from_point(at(start));
    aabb.include_point(at(end));

    for axis in 0..3 {
        let extreme = b[axis].atan2(a[axis]);
        for theta in [extreme, extreme + PI] {
            if angle_in_sweep(theta, start, end) {
                aabb.include_point(at(theta));
            }
        }
    }
    aabb
}

/// Range of `cos θ` and of `sin θ` over `[start, end]`.
pub fn cos_sin_range(start: f64, end: f64) -> ((f64, f64), (f64, f64)) {
    let unit = arc_bounds(Point3::ZERO, Vector3::X, Vector3::Y, start, end);
    ((unit.min.x, unit.max.x), (unit.min.y, unit.max.y))
}

/// Conservative box of a surface of revolution patch expressed in `frame`:
/// points `origin + rho (cos u x + sin u y) + h z` with `rho`, `h` in the
/// given ranges and `u` in `[u_start, u_end]`.
///
/// For fixed `u` the coordinates are affine in `rho` and `h`, so the patch
/// lies in the union of the four corner arcs' boxes.
pub fn revolved_bounds(
    frame: &Frame3,
    rho: (f64, f64),
    height: (f64, f64),
    u_start: f64,
    u_end: f64,
) -> Aabb3 {
    let mut aabb: Option<Aabb3> = None;
    for r in [rho.0, rho.1] {
        for h in [height.0, height.1] {
            let center = frame.origin + h * frame.z;
            let arc = arc_bounds(center, r * frame.x, r * frame.y, u_start, u_end);
            aabb = Some(match aabb {
                Some(acc) => acc.merge(&arc),
                None => arc,
            });
        }
    }
    aabb.unwrap_or_else(|| Aabb3::from_point(frame.origin))
}
