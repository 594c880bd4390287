//! Proximity engine geometry: B-spline basis evaluation, parametric curves
//! and surfaces, and sampling helpers.

pub mod analytic;
pub mod curve;
pub mod nurbs;
pub mod sample;
pub mod surface;

pub use curve::{Curve, CurveOnSurface, ParametricCurve};
pub use surface::{ParametricSurface, Surface};
