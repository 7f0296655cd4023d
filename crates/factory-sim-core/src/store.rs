use crate::destination::DestinationRole;
use crate::error::SimResult;
use crate::id::{StationId, StationKind, StationRef};
use crate::link::LinkArena;
use crate::product::Product;
use crate::station::{StateReport, Station, queue_line};
use serde::{Deserialize, Serialize};

/// Configuration copy of a storehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreHouseData {
    pub id: StationId,
}

/// Terminal sink. Keeps everything it receives; the simulation never takes
/// products back out.
#[derive(Debug)]
pub struct StoreHouse {
    id: StationId,
    pub(crate) destination: DestinationRole,
}

impl StoreHouse {
    pub fn new(data: StoreHouseData) -> Self {
        Self {
            id: data.id,
            destination: DestinationRole::new(StationRef::new(StationKind::Store, data.id)),
        }
    }

    pub fn receive(&mut self, product: Product) {
        self.destination.add_product(product);
    }

    /// Remove a stored product from the front or the back, for inspection.
    pub fn take_product(&mut self, first: bool) -> SimResult<Product> {
        self.destination.take_product(first)
    }

    pub fn destination(&self) -> &DestinationRole {
        &self.destination
    }

    pub fn data(&self) -> StoreHouseData {
        StoreHouseData { id: self.id }
    }
}

impl Station for StoreHouse {
    fn station_ref(&self) -> StationRef {
        StationRef::new(StationKind::Store, self.id)
    }

    fn structure_report(&self, _links: &LinkArena) -> String {
        self.display_name()
    }
}

impl StateReport for StoreHouse {
    fn state_report(&self) -> String {
        let entries: Vec<String> = self.destination.products().map(ToString::to_string).collect();
        format!("{}\n{}", self.display_name(), queue_line(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductSequence;

    #[test]
    fn reports() {
        let mut seq = ProductSequence::new();
        let mut s = StoreHouse::new(StoreHouseData { id: StationId(1) });
        assert_eq!(s.structure_report(&LinkArena::new()), "STOREHOUSE #1");
        assert_eq!(s.state_report(), "STOREHOUSE #1\n\tQueue: ");

        s.receive(seq.make());
        s.receive(seq.make());
        assert_eq!(s.state_report(), "STOREHOUSE #1\n\tQueue: #0, #1");
    }

    #[test]
    fn take_from_either_end() {
        let mut seq = ProductSequence::new();
        let mut s = StoreHouse::new(StoreHouseData { id: StationId(1) });
        for _ in 0..3 {
            s.receive(seq.make());
        }
        assert_eq!(s.take_product(false).unwrap().to_string(), "#2");
        assert_eq!(s.take_product(true).unwrap().to_string(), "#0");
        assert_eq!(s.destination().len(), 1);
    }
}
