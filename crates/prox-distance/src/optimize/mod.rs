//! Local optimizers. Both report [`prox_core::ProxError::NoConvergence`]
//! when their iteration budget runs out; callers fall back to the seed.

pub(crate) mod newton;
pub(crate) mod scalar;
