//! Weighted directed links and the arena that owns them.
//!
//! A link is jointly held by its two endpoints. The arena keeps each link
//! alive while either side is still bound and frees the slot once both have
//! released it. Everyone else, including the factory's id registry, refers to
//! links through generation-checked [`LinkKey`]s, so a stale handle simply
//! stops resolving.

use crate::error::{SimError, SimResult};
use crate::id::{LinkId, LinkKey, StationKind, StationRef};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Link
// ---------------------------------------------------------------------------

/// Which end of a link a binding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEnd {
    Source,
    Destination,
}

/// A directed weighted edge between a source-capable and a
/// destination-capable station.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    id: LinkId,
    base_weight: f64,
    weight: f64,
    source: StationRef,
    destination: StationRef,
    source_bound: bool,
    destination_bound: bool,
}

impl Link {
    /// Build a link, rejecting invalid role pairs and non-positive weights.
    ///
    /// Role checks run before the weight check. Weights above 1 are clamped
    /// to 1.
    pub fn new(
        id: LinkId,
        source: StationRef,
        destination: StationRef,
        weight: f64,
    ) -> SimResult<Self> {
        check_roles(source, destination)?;
        if weight.is_nan() || weight <= 0.0 {
            return Err(SimError::InvalidWeight(weight));
        }
        let base_weight = weight.min(1.0);
        Ok(Self {
            id,
            base_weight,
            weight: base_weight,
            source,
            destination,
            source_bound: false,
            destination_bound: false,
        })
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Normalized weight among the source's outgoing links.
    pub fn probability(&self) -> f64 {
        self.weight
    }

    /// Configured weight, after clamping.
    pub fn base_probability(&self) -> f64 {
        self.base_weight
    }

    pub fn source(&self) -> StationRef {
        self.source
    }

    pub fn destination(&self) -> StationRef {
        self.destination
    }

    pub(crate) fn set_probability(&mut self, weight: f64) {
        self.weight = weight;
    }

    /// Receiver line as it appears in structure reports.
    pub fn receiver_line(&self) -> String {
        format!("{} (p = {:.2})", self.destination.display_name(), self.weight)
    }

    pub fn data(&self) -> LinkData {
        LinkData {
            id: self.id,
            probability: self.base_weight,
            source: self.source,
            destination: self.destination,
        }
    }
}

/// Rejects role pairs that can never form a link.
pub fn check_roles(source: StationRef, destination: StationRef) -> SimResult<()> {
    if source.kind == StationKind::Store {
        return Err(SimError::InvalidLinkSource);
    }
    if destination.kind == StationKind::Ramp {
        return Err(SimError::InvalidLinkDestination);
    }
    if source.kind == StationKind::Ramp && destination.kind == StationKind::Store {
        return Err(SimError::RampToStore);
    }
    Ok(())
}

/// Configuration copy of a link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkData {
    pub id: LinkId,
    /// Configured (base) weight.
    pub probability: f64,
    pub source: StationRef,
    pub destination: StationRef,
}

// ---------------------------------------------------------------------------
// LinkArena
// ---------------------------------------------------------------------------

/// Owns every live link.
#[derive(Debug, Default)]
pub struct LinkArena {
    links: SlotMap<LinkKey, Link>,
}

impl LinkArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a link with both ends bound.
    pub fn insert(&mut self, mut link: Link) -> LinkKey {
        link.source_bound = true;
        link.destination_bound = true;
        self.links.insert(link)
    }

    /// Release one end. The link is freed once both ends are released.
    /// Returns `true` if this call freed it.
    pub fn release(&mut self, key: LinkKey, end: LinkEnd) -> bool {
        let Some(link) = self.links.get_mut(key) else {
            return false;
        };
        match end {
            LinkEnd::Source => link.source_bound = false,
            LinkEnd::Destination => link.destination_bound = false,
        }
        if !link.source_bound && !link.destination_bound {
            self.links.remove(key);
            return true;
        }
        false
    }

    pub fn get(&self, key: LinkKey) -> Option<&Link> {
        self.links.get(key)
    }

    pub fn contains(&self, key: LinkKey) -> bool {
        self.links.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Recompute normalized weights for a set of sibling links so they sum
    /// to 1.
    pub(crate) fn normalize(&mut self, keys: &[LinkKey]) {
        let total: f64 = keys
            .iter()
            .filter_map(|k| self.links.get(*k))
            .map(Link::base_probability)
            .sum();
        if total <= 0.0 {
            return;
        }
        for key in keys {
            if let Some(link) = self.links.get_mut(*key) {
                let w = link.base_weight / total;
                link.set_probability(w);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Weighted selection
// ---------------------------------------------------------------------------

/// Pick an index by accumulating weights until the running sum reaches `r`.
///
/// Falls back to the last index when rounding leaves the sum short of `r`.
/// Returns `None` only for an empty input.
pub fn select_weighted(weights: impl IntoIterator<Item = f64>, r: f64) -> Option<usize> {
    let mut sum = 0.0;
    let mut last = None;
    for (i, w) in weights.into_iter().enumerate() {
        sum += w;
        if sum >= r {
            return Some(i);
        }
        last = Some(i);
    }
    last
}
