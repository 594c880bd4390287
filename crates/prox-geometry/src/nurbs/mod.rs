//! NURBS core algorithms: knot vector utilities and De Boor evaluation.

pub mod deboor;
pub mod knot;

pub use deboor::*;
pub use knot::{
    basis_function_derivs, basis_functions, find_span, reduce_periodic, Basis, BasisEval,
    KnotVector,
};
