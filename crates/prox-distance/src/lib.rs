//! Minimum distance and witness points between points, curves, faces and
//! shells.
//!
//! Shell queries decompose into face pairs, face queries into curve and
//! point queries; all of them share one multi-start local search over the
//! entities' parameters.

pub mod config;
pub mod curve;
pub mod face;
mod optimize;
mod pair;
mod patch;
pub mod point;
pub mod query;
pub mod result;
pub mod shell;

pub use config::{ProximityConfig, SampleRange};
pub use query::{distance, proximity, Entity, Measure, QueryOptions};
pub use result::{Parameter, Proximity, Quality, Witness};
