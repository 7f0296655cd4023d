use crate::config::ConfigError;
use factory_sim_core::error::SimError;
use factory_sim_core::structure::StructureError;
use std::path::PathBuf;

/// Errors surfaced by the command-line front end.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{}: {source}", .path.display())]
    Structure {
        path: PathBuf,
        source: StructureError,
    },
    #[error("cannot read {}: {source}", .path.display())]
    ReadStructure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("no structure file given; use `save <path>`")]
    NoSaveTarget,
    #[error("{0}")]
    Command(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
