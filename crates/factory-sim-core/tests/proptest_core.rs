//! Property-based tests for the factory simulator.
//!
//! Uses proptest to generate random topologies and station removals, then
//! checks weight normalization, referential integrity and text round-trips.

use factory_sim_core::factory::Factory;
use factory_sim_core::id::*;
use factory_sim_core::random::FixedRandom;
use factory_sim_core::structure::{read_structure, write_structure};
use factory_sim_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// A random topology description: station counts and candidate links.
#[derive(Debug, Clone)]
struct Topology {
    ramps: u32,
    workers: u32,
    stores: u32,
    intervals: Vec<u64>,
    lifo: Vec<bool>,
    links: Vec<(u8, u32, u8, u32, f64)>,
}

fn arb_topology() -> impl Strategy<Value = Topology> {
    (1..4u32, 1..6u32, 1..3u32).prop_flat_map(|(ramps, workers, stores)| {
        (
            proptest::collection::vec(0..5u64, (ramps + workers) as usize),
            proptest::collection::vec(any::<bool>(), workers as usize),
            proptest::collection::vec(
                (0..2u8, 1..=workers.max(ramps), 0..2u8, 1..=workers.max(stores), 0.01..1.0f64),
                0..20,
            ),
        )
            .prop_map(move |(intervals, lifo, links)| Topology {
                ramps,
                workers,
                stores,
                intervals,
                lifo,
                links,
            })
    })
}

/// Build the factory, skipping candidate links the factory rejects.
fn build(t: &Topology) -> Factory {
    let mut f = Factory::with_random(Box::new(FixedRandom(0.0)));
    for r in 1..=t.ramps {
        f.add_loading_ramp(ramp(r, t.intervals[(r - 1) as usize])).unwrap();
    }
    for w in 1..=t.workers {
        let q = if t.lifo[(w - 1) as usize] { QueueType::Lifo } else { QueueType::Fifo };
        let time = t.intervals[(t.ramps + w - 1) as usize];
        f.add_worker(worker(w, time, q)).unwrap();
    }
    for s in 1..=t.stores {
        f.add_storehouse(store(s)).unwrap();
    }
    for (i, &(src_kind, src, dst_kind, dst, p)) in t.links.iter().enumerate() {
        let source = if src_kind == 0 { StationRef::ramp(src) } else { StationRef::worker(src) };
        let dest = if dst_kind == 0 { StationRef::worker(dst) } else { StationRef::store(dst) };
        let _ = f.add_link(link(i as u32 + 1, source, dest, p));
    }
    f
}

fn outgoing_sums(f: &Factory) -> Vec<(usize, f64)> {
    let arena = f.link_arena();
    let sum = |keys: &[LinkKey]| -> (usize, f64) {
        (keys.len(), keys.iter().filter_map(|k| arena.get(*k)).map(|l| l.probability()).sum())
    };
    f.ramps()
        .map(|r| sum(r.source().outputs()))
        .chain(f.workers().map(|w| sum(w.source().outputs())))
        .collect()
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Normalized outgoing weights sum to 1 for every source with links,
    /// and each equals its base weight over the sibling total.
    #[test]
    fn outgoing_weights_sum_to_one(t in arb_topology()) {
        let f = build(&t);
        for (count, total) in outgoing_sums(&f) {
            if count > 0 {
                prop_assert!((total - 1.0).abs() < 1e-9, "sum was {}", total);
            }
        }
        for r in f.ramps() {
            let links: Vec<_> = r.source().outputs().iter().filter_map(|k| f.link_arena().get(*k)).collect();
            let base: f64 = links.iter().map(|l| l.base_probability()).sum();
            for l in links {
                prop_assert!((l.probability() - l.base_probability() / base).abs() < 1e-9);
            }
        }
    }

    /// Removing a station removes exactly the links touching it and keeps
    /// the remaining weights normalized.
    #[test]
    fn removal_keeps_registry_consistent(t in arb_topology(), victim in 1..6u32, kind in 0..3u8) {
        let mut f = build(&t);
        let station = match kind {
            0 => StationRef::ramp(victim),
            1 => StationRef::worker(victim),
            _ => StationRef::store(victim),
        };
        let before = f.links_data();
        let existed = f.contains_station(station);

        prop_assert_eq!(f.remove_station(station), existed);

        let expected: Vec<_> = before
            .iter()
            .filter(|l| l.source != station && l.destination != station)
            .map(|l| l.id)
            .collect();
        let after: Vec<_> = f.links_data().iter().map(|l| l.id).collect();
        prop_assert_eq!(after, expected);
        prop_assert_eq!(f.link_arena().len(), f.link_count());

        for (count, total) in outgoing_sums(&f) {
            if count > 0 {
                prop_assert!((total - 1.0).abs() < 1e-9);
            }
        }
    }

    /// Serializing and re-parsing reproduces the same topology.
    #[test]
    fn structure_round_trip(t in arb_topology()) {
        let f = build(&t);
        let text = write_structure(&f);
        let mut g = Factory::with_random(Box::new(FixedRandom(0.0)));
        read_structure(&mut g, &text).unwrap();

        prop_assert_eq!(g.ramps_data(), f.ramps_data());
        prop_assert_eq!(g.workers_data(), f.workers_data());
        prop_assert_eq!(g.stores_data(), f.stores_data());
        prop_assert_eq!(g.links_data(), f.links_data());
        prop_assert_eq!(write_structure(&g), text);
    }

    /// A factory that passes validation never fails mid-run.
    #[test]
    fn valid_factories_run(t in arb_topology(), ticks in 1..60u64) {
        let mut f = build(&t);
        if f.validate().is_ok() {
            for _ in 0..ticks {
                let stepped = f.step();
                prop_assert!(stepped.is_ok(), "step failed: {:?}", stepped);
            }
        }
    }
}
