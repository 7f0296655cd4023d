//! Behaviour shared by every station kind.

use crate::id::{StationId, StationKind, StationRef};
use crate::link::LinkArena;

/// Tab indentation for the given report depth.
pub fn indent(depth: usize) -> String {
    "\t".repeat(depth)
}

/// Identity and report rendering common to ramps, workers and stores.
pub trait Station {
    fn station_ref(&self) -> StationRef;

    /// Multi-line configuration report.
    fn structure_report(&self, links: &LinkArena) -> String;

    fn id(&self) -> StationId {
        self.station_ref().id
    }

    fn kind(&self) -> StationKind {
        self.station_ref().kind
    }

    /// `KIND #id`, e.g. `LOADING_RAMP #2`.
    fn display_name(&self) -> String {
        self.station_ref().display_name()
    }
}

/// Stations that hold products worth reporting between ticks.
pub trait StateReport: Station {
    fn state_report(&self) -> String;
}

/// Shared tail of ramp and worker structure reports.
pub(crate) fn receivers_block(lines: &[String]) -> String {
    let mut out = format!("{}Receivers:\n", indent(1));
    let rendered: Vec<String> = lines.iter().map(|l| format!("{}{l}", indent(2))).collect();
    out.push_str(&rendered.join("\n"));
    out
}

/// `\tQueue: a, b, c`
pub(crate) fn queue_line(entries: &[String]) -> String {
    format!("{}Queue: {}", indent(1), entries.join(", "))
}
