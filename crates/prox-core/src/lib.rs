pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{ProxError, Result};
pub use tolerance::Tolerance;
