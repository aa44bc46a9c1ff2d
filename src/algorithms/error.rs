use thiserror::Error;

use super::Algorithm;

/// A hyper-parameter outside its valid range.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParamError {
    #[error("Discount factor must lie in [0, 1], got {0}")]
    Gamma(f64),

    #[error("Learning rate must lie in (0, 1], got {0}")]
    Alpha(f64),

    #[error("Exploration rate must lie in [0, 1], got {0}")]
    Epsilon(f64),

    #[error("Convergence threshold must be positive, got {0}")]
    Theta(f64),

    #[error("n-step lookahead must be at least 1")]
    NStep,
}

/// Reasons the dispatcher refuses to run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(#[from] ParamError),

    #[error("{0} requires an environment with a transition model")]
    MissingTransitionModel(Algorithm),
}
