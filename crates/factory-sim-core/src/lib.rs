//! Factory Sim Core -- a discrete-time simulator for production networks.
//!
//! Products are generated by loading ramps, routed along weighted links,
//! queued and processed by workers, and collected in storehouses. A
//! [`factory::Factory`] owns the whole network and drives it tick by tick.
//!
//! # Tick Pipeline
//!
//! Each call to [`factory::Factory::step`] advances the network by one tick:
//!
//! 1. **Ramps** -- every ramp counts toward its delivery interval and, when it
//!    elapses, manufactures a product into its dispatch slot.
//! 2. **Workers** -- every worker starts on a buffered product if idle, then
//!    counts toward its processing time, moving a finished product into its
//!    dispatch slot.
//! 3. **Dispatch** -- ramps, then workers, hand their ready product to a
//!    destination picked by weighted random selection over outgoing links.
//!
//! Stations are visited in ascending id order within each kind.
//! [`factory::Factory::run`] repeats this and writes state reports at the
//! ticks chosen by a [`report::ReportSchedule`].
//!
//! # Key Types
//!
//! - [`factory::Factory`] -- Aggregate root: registries, validation, run loop.
//! - [`link::LinkArena`] -- Owns links; endpoints hold generation-checked keys.
//! - [`source::SourceRole`] / [`destination::DestinationRole`] -- The routing
//!   and queueing roles stations are composed from.
//! - [`random::RandomSource`] -- Injected strategy for routing draws.
//! - [`structure`] -- Text format for loading and saving topologies.

pub mod destination;
pub mod error;
pub mod factory;
pub mod id;
pub mod link;
pub mod product;
pub mod ramp;
pub mod random;
pub mod report;
pub mod source;
pub mod station;
pub mod store;
pub mod structure;
pub mod timer;
pub mod worker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{SimError, SimResult};
pub use factory::Factory;
