//! tabula - tabular reinforcement learning on small grid worlds
//!
//! Dynamic-programming planners, temporal-difference and Monte Carlo
//! learners, and TD prediction over finite environments with a state-index
//! bijection. Three grid environments are built in; any type implementing
//! [`environment::Environment`] works with the sample-based algorithms.

pub mod algorithms;
pub mod environment;
pub mod session;

pub use algorithms::{run_algorithm, run_named, Algorithm, AlgorithmParams, AlgorithmResult};
pub use environment::{Environment, EnvironmentConfig, EnvironmentKind, StateSpace, TransitionModel};
pub use session::{EpisodeReport, Session, SessionError};
