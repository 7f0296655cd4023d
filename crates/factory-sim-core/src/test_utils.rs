//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::factory::Factory;
use crate::id::*;
use crate::link::LinkData;
use crate::ramp::LoadingRampData;
use crate::random::FixedRandom;
use crate::store::StoreHouseData;
use crate::worker::WorkerData;

// ===========================================================================
// Element constructors
// ===========================================================================

pub fn ramp(id: u32, delivery_interval: Ticks) -> LoadingRampData {
    LoadingRampData {
        id: StationId(id),
        delivery_interval,
    }
}

pub fn worker(id: u32, processing_time: Ticks, queue_type: QueueType) -> WorkerData {
    WorkerData {
        id: StationId(id),
        processing_time,
        queue_type,
    }
}

pub fn store(id: u32) -> StoreHouseData {
    StoreHouseData { id: StationId(id) }
}

pub fn link(id: u32, source: StationRef, destination: StationRef, probability: f64) -> LinkData {
    LinkData {
        id: LinkId(id),
        probability,
        source,
        destination,
    }
}

// ===========================================================================
// Factories
// ===========================================================================

/// Empty factory whose routing always picks the first link.
pub fn fixed_factory() -> Factory {
    Factory::with_random(Box::new(FixedRandom(0.0)))
}

/// `ramp-1 -> worker-1 -> store-1`, interval 1, processing time 1, FIFO,
/// links 1 and 2 at weight 1.
pub fn linear_factory() -> Factory {
    let mut f = fixed_factory();
    f.add_loading_ramp(ramp(1, 1)).unwrap();
    f.add_worker(worker(1, 1, QueueType::Fifo)).unwrap();
    f.add_storehouse(store(1)).unwrap();
    f.add_link(link(1, StationRef::ramp(1), StationRef::worker(1), 1.0)).unwrap();
    f.add_link(link(2, StationRef::worker(1), StationRef::store(1), 1.0)).unwrap();
    f
}

/// A wider network: `ramps` ramps each feeding every one of `workers`
/// workers, each worker feeding the next worker and one shared store.
pub fn mesh_factory(ramps: u32, workers: u32, seed: u64) -> Factory {
    let mut f = Factory::with_seed(seed);
    f.add_storehouse(store(1)).unwrap();
    for w in 1..=workers {
        f.add_worker(worker(w, u64::from(w % 4 + 1), if w % 2 == 0 { QueueType::Lifo } else { QueueType::Fifo }))
            .unwrap();
    }
    let mut next_link = 1;
    for r in 1..=ramps {
        f.add_loading_ramp(ramp(r, u64::from(r % 3 + 1))).unwrap();
        for w in 1..=workers {
            f.add_link(link(next_link, StationRef::ramp(r), StationRef::worker(w), 1.0)).unwrap();
            next_link += 1;
        }
    }
    for w in 1..=workers {
        if w < workers {
            f.add_link(link(next_link, StationRef::worker(w), StationRef::worker(w + 1), 0.25)).unwrap();
            next_link += 1;
        }
        f.add_link(link(next_link, StationRef::worker(w), StationRef::store(1), 0.75)).unwrap();
        next_link += 1;
    }
    f
}
