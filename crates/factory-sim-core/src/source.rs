//! Routing role: a single dispatch slot plus the outgoing links.

use crate::error::{SimError, SimResult};
use crate::id::{LinkKey, StationRef};
use crate::link::{LinkArena, select_weighted};
use crate::product::Product;
use crate::random::RandomSource;
use tracing::trace;

/// Holds at most one product waiting to leave, and owns the outgoing side of
/// every link starting at this station.
///
/// Outgoing weights are renormalized whenever a link is bound or unbound, so
/// they always sum to 1 unless the list is empty.
#[derive(Debug)]
pub struct SourceRole {
    owner: StationRef,
    ready: Option<Product>,
    outputs: Vec<LinkKey>,
}

impl SourceRole {
    pub fn new(owner: StationRef) -> Self {
        Self {
            owner,
            ready: None,
            outputs: Vec::new(),
        }
    }

    pub fn is_product_ready(&self) -> bool {
        self.ready.is_some()
    }

    pub fn ready_product(&self) -> Option<&Product> {
        self.ready.as_ref()
    }

    /// Place a product in the dispatch slot. Fails if it is already taken.
    pub fn set_product(&mut self, product: Product) -> SimResult<()> {
        if self.ready.is_some() {
            return Err(SimError::SlotOccupied(self.owner.display_name()));
        }
        self.ready = Some(product);
        Ok(())
    }

    /// Empty the dispatch slot without routing.
    pub fn take_product(&mut self) -> Option<Product> {
        self.ready.take()
    }

    pub fn outputs(&self) -> &[LinkKey] {
        &self.outputs
    }

    pub fn has_outputs(&self) -> bool {
        !self.outputs.is_empty()
    }

    pub(crate) fn bind_output(&mut self, key: LinkKey, arena: &mut LinkArena) {
        self.outputs.push(key);
        arena.normalize(&self.outputs);
    }

    pub(crate) fn unbind_output(&mut self, key: LinkKey, arena: &mut LinkArena) {
        self.outputs.retain(|k| *k != key);
        arena.normalize(&self.outputs);
    }

    /// Draw a link according to the normalized weights.
    pub fn select_link(&self, arena: &LinkArena, rng: &mut dyn RandomSource) -> SimResult<LinkKey> {
        let weights = self
            .outputs
            .iter()
            .map(|k| arena.get(*k).map_or(0.0, |l| l.probability()));
        select_weighted(weights, rng.next_unit())
            .map(|i| self.outputs[i])
            .ok_or_else(|| SimError::NoRoutingTarget(self.owner.display_name()))
    }

    /// Take the ready product and pick where it goes.
    ///
    /// A no-op when nothing is ready. The caller delivers the product to the
    /// returned destination.
    pub fn dispatch(
        &mut self,
        arena: &LinkArena,
        rng: &mut dyn RandomSource,
    ) -> SimResult<Option<(Product, StationRef)>> {
        if self.ready.is_none() {
            return Ok(None);
        }
        let key = self.select_link(arena, rng)?;
        let destination = arena
            .get(key)
            .map(|l| l.destination())
            .ok_or_else(|| SimError::NoRoutingTarget(self.owner.display_name()))?;
        let Some(product) = self.ready.take() else {
            return Ok(None);
        };
        trace!(from = %self.owner, to = %destination, product = %product, "dispatch");
        Ok(Some((product, destination)))
    }

    /// Receiver lines, one per outgoing link, in binding order.
    pub fn receiver_lines(&self, arena: &LinkArena) -> Vec<String> {
        self.outputs
            .iter()
            .filter_map(|k| arena.get(*k))
            .map(|l| l.receiver_line())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::LinkId;
    use crate::link::Link;
    use crate::product::ProductSequence;
    use crate::random::FixedRandom;

    fn bound(arena: &mut LinkArena, role: &mut SourceRole, id: u32, dest: StationRef, w: f64) -> LinkKey {
        let key = arena.insert(Link::new(LinkId(id), StationRef::worker(1), dest, w).unwrap());
        role.bind_output(key, arena);
        key
    }

    #[test]
    fn set_product_rejects_occupied_slot() {
        let mut seq = ProductSequence::new();
        let mut role = SourceRole::new(StationRef::worker(1));
        role.set_product(seq.make()).unwrap();
        let err = role.set_product(seq.make()).unwrap_err();
        assert!(matches!(err, SimError::SlotOccupied(ref s) if s == "WORKER #1"));
    }

    #[test]
    fn dispatch_without_product_is_noop() {
        let arena = LinkArena::new();
        let mut role = SourceRole::new(StationRef::worker(1));
        let out = role.dispatch(&arena, &mut FixedRandom(0.0)).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn dispatch_without_links_fails() {
        let arena = LinkArena::new();
        let mut seq = ProductSequence::new();
        let mut role = SourceRole::new(StationRef::worker(1));
        role.set_product(seq.make()).unwrap();
        let err = role.dispatch(&arena, &mut FixedRandom(0.0)).unwrap_err();
        assert!(matches!(err, SimError::NoRoutingTarget(_)));
    }

    #[test]
    fn zero_draw_routes_to_first_link() {
        let mut arena = LinkArena::new();
        let mut seq = ProductSequence::new();
        let mut role = SourceRole::new(StationRef::worker(1));
        bound(&mut arena, &mut role, 1, StationRef::store(4), 0.2);
        bound(&mut arena, &mut role, 2, StationRef::store(5), 0.8);
        role.set_product(seq.make()).unwrap();
        let (product, dest) = role.dispatch(&arena, &mut FixedRandom(0.0)).unwrap().unwrap();
        assert_eq!(dest, StationRef::store(4));
        assert_eq!(product.to_string(), "#0");
        assert!(!role.is_product_ready());
    }

    #[test]
    fn binding_renormalizes_siblings() {
        let mut arena = LinkArena::new();
        let mut role = SourceRole::new(StationRef::worker(1));
        let a = bound(&mut arena, &mut role, 1, StationRef::store(1), 0.5);
        let b = bound(&mut arena, &mut role, 2, StationRef::store(2), 0.5);
        assert_eq!(arena.get(a).unwrap().probability(), 0.5);
        assert_eq!(arena.get(b).unwrap().probability(), 0.5);

        role.unbind_output(a, &mut arena);
        assert_eq!(arena.get(b).unwrap().probability(), 1.0);
    }

    #[test]
    fn receiver_lines_follow_binding_order() {
        let mut arena = LinkArena::new();
        let mut role = SourceRole::new(StationRef::worker(1));
        bound(&mut arena, &mut role, 1, StationRef::worker(1), 0.5);
        bound(&mut arena, &mut role, 2, StationRef::worker(1), 0.5);
        bound(&mut arena, &mut role, 3, StationRef::store(1), 0.5);
        assert_eq!(
            role.receiver_lines(&arena),
            ["WORKER #1 (p = 0.33)", "WORKER #1 (p = 0.33)", "STOREHOUSE #1 (p = 0.33)"]
        );
    }
}
