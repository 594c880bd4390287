mod bounding;
pub mod face;
pub mod loops;
pub mod shell;
mod validate;

pub use face::Face;
pub use loops::Loop;
pub use shell::Shell;
