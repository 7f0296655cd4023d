use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;

new_key_type! {
    /// Arena handle for a link. Generation-checked, so a handle to a freed
    /// link never resolves to a newer one occupying the same slot.
    pub struct LinkKey;
}

/// Simulation time, counted in whole ticks.
pub type Ticks = u64;

/// Identifies a station within the registry of its own kind.
///
/// Ids only need to be unique per kind: `WORKER #1` and `STOREHOUSE #1`
/// may coexist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(pub u32);

/// Identifies a link in the factory's link registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub u32);

/// Identifies a product. Assigned from a per-factory sequence starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Station kinds
// ---------------------------------------------------------------------------

/// The three station roles a factory knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StationKind {
    Ramp,
    Worker,
    Store,
}

impl StationKind {
    /// Short lowercase name used in link endpoint references (`worker-3`).
    pub fn short_name(self) -> &'static str {
        match self {
            StationKind::Ramp => "ramp",
            StationKind::Worker => "worker",
            StationKind::Store => "store",
        }
    }

    /// Uppercase label used in display strings and reports.
    pub fn label(self) -> &'static str {
        match self {
            StationKind::Ramp => "LOADING_RAMP",
            StationKind::Worker => "WORKER",
            StationKind::Store => "STOREHOUSE",
        }
    }
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Error returned when a kind, endpoint or queue type fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {what}: {input:?}")]
pub struct ParseIdError {
    pub what: &'static str,
    pub input: String,
}

impl ParseIdError {
    fn new(what: &'static str, input: &str) -> Self {
        Self {
            what,
            input: input.to_string(),
        }
    }
}

impl FromStr for StationKind {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ramp" => Ok(StationKind::Ramp),
            "worker" => Ok(StationKind::Worker),
            "store" => Ok(StationKind::Store),
            _ => Err(ParseIdError::new("station kind", s)),
        }
    }
}

/// A fully qualified station reference: kind plus id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationRef {
    pub kind: StationKind,
    pub id: StationId,
}

impl StationRef {
    pub fn new(kind: StationKind, id: StationId) -> Self {
        Self { kind, id }
    }

    pub fn ramp(id: u32) -> Self {
        Self::new(StationKind::Ramp, StationId(id))
    }

    pub fn worker(id: u32) -> Self {
        Self::new(StationKind::Worker, StationId(id))
    }

    pub fn store(id: u32) -> Self {
        Self::new(StationKind::Store, StationId(id))
    }

    /// Display name as it appears in reports, e.g. `WORKER #2`.
    pub fn display_name(&self) -> String {
        format!("{} #{}", self.kind.label(), self.id)
    }
}

/// Formats as the `kind-id` endpoint form used by the structure format.
impl fmt::Display for StationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.short_name(), self.id)
    }
}

impl FromStr for StationRef {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once('-')
            .ok_or_else(|| ParseIdError::new("station reference", s))?;
        let kind = kind.parse()?;
        let id = id
            .parse::<u32>()
            .map_err(|_| ParseIdError::new("station reference", s))?;
        Ok(StationRef::new(kind, StationId(id)))
    }
}

// ---------------------------------------------------------------------------
// Queue discipline
// ---------------------------------------------------------------------------

/// Order in which a worker takes products out of its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueueType {
    #[default]
    Fifo,
    Lifo,
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueType::Fifo => f.write_str("FIFO"),
            QueueType::Lifo => f.write_str("LIFO"),
        }
    }
}

impl FromStr for QueueType {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FIFO" => Ok(QueueType::Fifo),
            "LIFO" => Ok(QueueType::Lifo),
            _ => Err(ParseIdError::new("queue type", s)),
        }
    }
}
