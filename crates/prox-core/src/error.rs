use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProxError {
    #[error("Invalid knot vector: {0}")]
    InvalidKnotVector(String),

    #[error("Invalid control net: {0}")]
    InvalidControlNet(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("{context}: no convergence after {iterations} iterations")]
    NoConvergence { iterations: usize, context: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, ProxError>;
