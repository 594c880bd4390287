//! Proximity engine B-Rep topology: parameter-space loops, bounded faces
//! and shells.

pub mod brep;

pub use brep::{Face, Loop, Shell};
