use crate::error::SimResult;
use crate::id::{StationId, StationKind, StationRef, Ticks};
use crate::link::LinkArena;
use crate::product::ProductSequence;
use crate::source::SourceRole;
use crate::station::{Station, indent, receivers_block};
use crate::timer::Timer;
use serde::{Deserialize, Serialize};

/// Configuration copy of a loading ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingRampData {
    pub id: StationId,
    pub delivery_interval: Ticks,
}

/// Generates one product every `delivery_interval` ticks.
#[derive(Debug)]
pub struct LoadingRamp {
    id: StationId,
    pub(crate) source: SourceRole,
    timer: Timer,
}

impl LoadingRamp {
    pub fn new(data: LoadingRampData) -> Self {
        Self {
            id: data.id,
            source: SourceRole::new(StationRef::new(StationKind::Ramp, data.id)),
            timer: Timer::new(data.delivery_interval),
        }
    }

    /// Advance one tick, manufacturing a product when the interval elapses.
    ///
    /// Fails if the previous product was never dispatched.
    pub fn process(&mut self, products: &mut ProductSequence) -> SimResult<()> {
        if self.timer.advance() {
            self.source.set_product(products.make())?;
        }
        Ok(())
    }

    pub fn delivery_interval(&self) -> Ticks {
        self.timer.duration()
    }

    pub fn source(&self) -> &SourceRole {
        &self.source
    }

    pub fn data(&self) -> LoadingRampData {
        LoadingRampData {
            id: self.id,
            delivery_interval: self.delivery_interval(),
        }
    }
}

impl Station for LoadingRamp {
    fn station_ref(&self) -> StationRef {
        StationRef::new(StationKind::Ramp, self.id)
    }

    fn structure_report(&self, links: &LinkArena) -> String {
        format!(
            "{}\n{}Delivery interval: {}\n{}",
            self.display_name(),
            indent(1),
            self.delivery_interval(),
            receivers_block(&self.source.receiver_lines(links)),
        )
    }
}
