//! Command-line front end for the factory simulator.
//!
//! Loads a run configuration and an optional structure file, lets the user
//! edit the topology from a line-based shell, then runs the simulation and
//! writes its reports to stdout or a report file.

pub mod config;
pub mod controller;
pub mod error;
pub mod shell;

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Logs go to stderr so reports on stdout stay clean.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,factory_sim=info,factory_sim_core=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
