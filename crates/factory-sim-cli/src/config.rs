//! Run configuration, loadable from RON, TOML, or JSON.
//!
//! Format is detected from the file extension. Every field is optional in
//! the file; missing fields take the defaults below, and command-line flags
//! override whatever the file says.

use factory_sim_core::error::SimError;
use factory_sim_core::id::Ticks;
use factory_sim_core::report::ReportSchedule;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ===========================================================================
// Error type
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file has an extension we don't support.
    #[error("unsupported config format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Deserialization failed.
    #[error("failed to parse {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format from a file's extension.
pub fn detect_format(path: &Path) -> Result<Format, ConfigError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(ConfigError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Configuration
// ===========================================================================

/// When state reports are written during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportTiming {
    /// Every `n`th tick; 0 turns reports off.
    Interval(Ticks),
    /// Exactly these ticks.
    At(Vec<Ticks>),
}

impl Default for ReportTiming {
    fn default() -> Self {
        ReportTiming::Interval(20)
    }
}

impl ReportTiming {
    pub fn schedule(&self) -> Result<ReportSchedule, SimError> {
        match self {
            ReportTiming::Interval(n) => Ok(ReportSchedule::interval(*n)),
            ReportTiming::At(times) => ReportSchedule::at(times.iter().copied()),
        }
    }
}

/// Everything needed to load and run a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Structure file to load before the shell starts, and the default
    /// target of `save`.
    pub structure_file: Option<PathBuf>,
    pub max_iterations: Ticks,
    pub report: ReportTiming,
    /// Where run output goes. Stdout when unset.
    pub report_file: Option<PathBuf>,
    /// Routing seed. Drawn at random when unset.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            structure_file: None,
            max_iterations: 100,
            report: ReportTiming::default(),
            report_file: None,
            seed: None,
        }
    }
}

/// Parse config text in the given format. `origin` only labels errors.
pub fn parse_config(format: Format, content: &str, origin: &Path) -> Result<SimulationConfig, ConfigError> {
    let parse_err = |detail: String| ConfigError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Read a config file, detecting its format from the extension.
pub fn load_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_config(format, &content, path)
}
