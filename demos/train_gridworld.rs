//! Trains every algorithm on the default grid world and replays the policies.
//!
//! Run with `RUST_LOG=tabula=debug` for per-run diagnostics.

use std::collections::HashMap;

use tabula::{Algorithm, Session};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let params = HashMap::from([
        ("n_episodes".to_string(), 2000.0),
        ("alpha".to_string(), 0.1),
    ]);

    for algorithm in Algorithm::ALL {
        let mut session = Session::named("gridworld", 42)?;
        let result = session.train(algorithm.as_str(), &params)?;
        let report = session.run_episode(&result.policy)?;
        println!("{algorithm}");
        print!("{report}");
    }
    Ok(())
}
