//! Line-oriented text format for factory topologies.
//!
//! ```text
//! ; comment
//! LOADING_RAMP id=1 delivery-interval=3
//! WORKER id=1 processing-time=2 queue-type=FIFO
//! STOREHOUSE id=1
//! LINK id=1 src=ramp-1 dest=worker-1 p=0.5
//! ```
//!
//! Blank lines and lines starting with `;` are skipped. Parameters may come
//! in any order but each must appear exactly once. Role rules for links
//! (which kinds may be a source or destination) are left to [`Factory`].

use crate::error::SimError;
use crate::factory::Factory;
use crate::id::{LinkId, QueueType, StationId, StationRef, Ticks};
use crate::link::LinkData;
use crate::ramp::LoadingRampData;
use crate::store::StoreHouseData;
use crate::worker::WorkerData;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// A line that does not follow the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unknown element type '{0}'")]
    UnknownKeyword(String),
    #[error("{keyword} expects {expected} parameters, got {found}")]
    ParameterCount {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("malformed parameter '{0}', expected key=value")]
    Malformed(String),
    #[error("unknown parameter '{key}' for {keyword}")]
    UnknownParameter { keyword: &'static str, key: String },
    #[error("parameter '{0}' already provided")]
    AlreadyProvided(String),
    #[error("parameter '{0}' not provided")]
    NotProvided(&'static str),
    #[error("invalid value '{value}' for parameter '{key}'")]
    InvalidValue { key: &'static str, value: String },
}

/// Failure while loading a structure file. Always names the 1-based line.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    #[error("Error in line {line}: {error}")]
    Syntax {
        line: usize,
        #[source]
        error: SyntaxError,
    },
    #[error("Error in line {line}: {source}")]
    Factory { line: usize, source: SimError },
}

impl StructureError {
    pub fn line(&self) -> usize {
        match self {
            StructureError::Syntax { line, .. } | StructureError::Factory { line, .. } => *line,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// One parsed element line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StructureEntry {
    Ramp(LoadingRampData),
    Worker(WorkerData),
    Store(StoreHouseData),
    Link(LinkData),
}

impl StructureEntry {
    /// Add this element to the factory.
    pub fn apply(self, factory: &mut Factory) -> Result<(), SimError> {
        match self {
            StructureEntry::Ramp(data) => factory.add_loading_ramp(data),
            StructureEntry::Worker(data) => factory.add_worker(data),
            StructureEntry::Store(data) => factory.add_storehouse(data),
            StructureEntry::Link(data) => factory.add_link(data),
        }
    }
}

/// `key=value` pairs of a single line, checked against the keys a keyword
/// accepts.
struct Params<'a> {
    values: Vec<(&'static str, &'a str)>,
}

impl<'a> Params<'a> {
    fn parse(keyword: &'static str, keys: &[&'static str], tokens: &[&'a str]) -> Result<Self, SyntaxError> {
        if tokens.len() != keys.len() {
            return Err(SyntaxError::ParameterCount {
                keyword,
                expected: keys.len(),
                found: tokens.len(),
            });
        }
        let mut values: Vec<(&'static str, &'a str)> = Vec::with_capacity(keys.len());
        for token in tokens {
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| SyntaxError::Malformed(token.to_string()))?;
            let known = keys
                .iter()
                .find(|k| **k == key)
                .ok_or_else(|| SyntaxError::UnknownParameter {
                    keyword,
                    key: key.to_string(),
                })?;
            if values.iter().any(|(k, _)| k == known) {
                return Err(SyntaxError::AlreadyProvided(key.to_string()));
            }
            values.push((*known, value));
        }
        Ok(Self { values })
    }

    fn get<T: FromStr>(&self, key: &'static str) -> Result<T, SyntaxError> {
        let raw = self
            .values
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or(SyntaxError::NotProvided(key))?;
        raw.parse().map_err(|_| SyntaxError::InvalidValue {
            key,
            value: raw.to_string(),
        })
    }
}

/// Parse one non-comment line.
pub fn parse_line(line: &str) -> Result<StructureEntry, SyntaxError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, rest)) = tokens.split_first() else {
        return Err(SyntaxError::UnknownKeyword(String::new()));
    };
    match keyword {
        "LOADING_RAMP" => {
            let p = Params::parse("LOADING_RAMP", &["id", "delivery-interval"], rest)?;
            Ok(StructureEntry::Ramp(LoadingRampData {
                id: StationId(p.get("id")?),
                delivery_interval: p.get::<Ticks>("delivery-interval")?,
            }))
        }
        "WORKER" => {
            let p = Params::parse("WORKER", &["id", "processing-time", "queue-type"], rest)?;
            Ok(StructureEntry::Worker(WorkerData {
                id: StationId(p.get("id")?),
                processing_time: p.get::<Ticks>("processing-time")?,
                queue_type: p.get::<QueueType>("queue-type")?,
            }))
        }
        "STOREHOUSE" => {
            let p = Params::parse("STOREHOUSE", &["id"], rest)?;
            Ok(StructureEntry::Store(StoreHouseData {
                id: StationId(p.get("id")?),
            }))
        }
        "LINK" => {
            let p = Params::parse("LINK", &["id", "src", "dest", "p"], rest)?;
            Ok(StructureEntry::Link(LinkData {
                id: LinkId(p.get("id")?),
                source: p.get::<StationRef>("src")?,
                destination: p.get::<StationRef>("dest")?,
                probability: p.get::<f64>("p")?,
            }))
        }
        other => Err(SyntaxError::UnknownKeyword(other.to_string())),
    }
}

/// Parse `text` and add every element to `factory`, in file order.
///
/// Stops at the first bad line. Elements before it stay in the factory.
pub fn read_structure(factory: &mut Factory, text: &str) -> Result<(), StructureError> {
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let entry = parse_line(trimmed).map_err(|error| StructureError::Syntax { line, error })?;
        entry
            .apply(factory)
            .map_err(|source| StructureError::Factory { line, source })?;
    }
    Ok(())
}

impl Factory {
    /// Build a factory from structure text, routing with an OS-seeded
    /// random source.
    pub fn from_structure(text: &str) -> Result<Self, StructureError> {
        let mut factory = Factory::new();
        read_structure(&mut factory, text)?;
        Ok(factory)
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serialize the topology: ramps, workers, stores, then links, each group in
/// ascending id order under a `; == GROUP ==` comment.
pub fn write_structure(factory: &Factory) -> String {
    let mut out = String::new();

    out.push_str("; == LOADING RAMPS ==\n\n");
    for r in factory.ramps_data() {
        out.push_str(&format!(
            "LOADING_RAMP id={} delivery-interval={}\n\n",
            r.id, r.delivery_interval
        ));
    }

    out.push_str("; == WORKERS ==\n\n");
    for w in factory.workers_data() {
        out.push_str(&format!(
            "WORKER id={} processing-time={} queue-type={}\n\n",
            w.id, w.processing_time, w.queue_type
        ));
    }

    out.push_str("; == STOREHOUSES ==\n\n");
    for s in factory.stores_data() {
        out.push_str(&format!("STOREHOUSE id={}\n\n", s.id));
    }

    out.push_str("; == LINKS ==\n\n");
    for l in factory.links_data() {
        out.push_str(&format!(
            "LINK id={} src={} dest={} p={}\n\n",
            l.id, l.source, l.destination, l.probability
        ));
    }
    out
}
