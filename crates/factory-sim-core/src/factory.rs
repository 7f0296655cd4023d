use crate::destination::DestinationRole;
use crate::error::{SimError, SimResult};
use crate::id::*;
use crate::link::{Link, LinkArena, LinkData, LinkEnd};
use crate::product::{Product, ProductSequence};
use crate::ramp::{LoadingRamp, LoadingRampData};
use crate::random::{EntropyRandom, RandomSource, SimRng};
use crate::report::ReportSchedule;
use crate::source::SourceRole;
use crate::station::{StateReport, Station};
use crate::store::{StoreHouse, StoreHouseData};
use crate::worker::{Worker, WorkerData};
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, info, instrument, warn};

// ---------------------------------------------------------------------------
// Station registry
// ---------------------------------------------------------------------------

/// The three per-kind station maps. Iteration is in ascending id order.
#[derive(Debug, Default)]
struct Stations {
    ramps: BTreeMap<StationId, LoadingRamp>,
    workers: BTreeMap<StationId, Worker>,
    stores: BTreeMap<StationId, StoreHouse>,
}

impl Stations {
    fn contains(&self, station: StationRef) -> bool {
        match station.kind {
            StationKind::Ramp => self.ramps.contains_key(&station.id),
            StationKind::Worker => self.workers.contains_key(&station.id),
            StationKind::Store => self.stores.contains_key(&station.id),
        }
    }

    fn source_mut(&mut self, station: StationRef) -> Option<&mut SourceRole> {
        match station.kind {
            StationKind::Ramp => self.ramps.get_mut(&station.id).map(|r| &mut r.source),
            StationKind::Worker => self.workers.get_mut(&station.id).map(|w| &mut w.source),
            StationKind::Store => None,
        }
    }

    fn destination_mut(&mut self, station: StationRef) -> Option<&mut DestinationRole> {
        match station.kind {
            StationKind::Ramp => None,
            StationKind::Worker => self.workers.get_mut(&station.id).map(|w| &mut w.destination),
            StationKind::Store => self.stores.get_mut(&station.id).map(|s| &mut s.destination),
        }
    }

    fn remove(&mut self, station: StationRef) -> bool {
        match station.kind {
            StationKind::Ramp => self.ramps.remove(&station.id).is_some(),
            StationKind::Worker => self.workers.remove(&station.id).is_some(),
            StationKind::Store => self.stores.remove(&station.id).is_some(),
        }
    }

    fn deliver(&mut self, destination: StationRef, product: Product) -> SimResult<()> {
        match destination.kind {
            StationKind::Worker => self
                .workers
                .get_mut(&destination.id)
                .ok_or(SimError::StationNotFound(destination))?
                .receive(product),
            StationKind::Store => {
                self.stores
                    .get_mut(&destination.id)
                    .ok_or(SimError::StationNotFound(destination))?
                    .receive(product);
                Ok(())
            }
            StationKind::Ramp => Err(SimError::InvalidLinkDestination),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Aggregate root of a simulated factory.
///
/// Owns every station and, through the link arena, every link. The link
/// registry keyed by [`LinkId`] holds only arena handles; removing a station
/// releases the links touching it and the registry is swept afterwards.
///
/// Each tick processes all ramps, then all workers, then runs a dispatch pass
/// over ramps and workers in the same order.
#[derive(Debug)]
pub struct Factory {
    stations: Stations,
    arena: LinkArena,
    links: BTreeMap<LinkId, LinkKey>,
    products: ProductSequence,
    rng: Box<dyn RandomSource>,
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}

impl Factory {
    /// An empty factory routing with an OS-seeded random source.
    pub fn new() -> Self {
        Self::with_random(Box::new(EntropyRandom::new()))
    }

    /// An empty factory whose routing is reproducible from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_random(Box::new(SimRng::new(seed)))
    }

    pub fn with_random(rng: Box<dyn RandomSource>) -> Self {
        Self {
            stations: Stations::default(),
            arena: LinkArena::new(),
            links: BTreeMap::new(),
            products: ProductSequence::new(),
            rng,
        }
    }

    /// Swap the random source used for routing.
    pub fn set_random(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    // -- Mutation -----------------------------------------------------------

    pub fn add_loading_ramp(&mut self, data: LoadingRampData) -> SimResult<()> {
        let station = StationRef::new(StationKind::Ramp, data.id);
        if self.stations.ramps.contains_key(&data.id) {
            return Err(SimError::DuplicateStation(station));
        }
        self.stations.ramps.insert(data.id, LoadingRamp::new(data));
        debug!(%station, delivery_interval = data.delivery_interval, "added loading ramp");
        Ok(())
    }

    pub fn add_worker(&mut self, data: WorkerData) -> SimResult<()> {
        let station = StationRef::new(StationKind::Worker, data.id);
        if self.stations.workers.contains_key(&data.id) {
            return Err(SimError::DuplicateStation(station));
        }
        self.stations.workers.insert(data.id, Worker::new(data));
        debug!(%station, processing_time = data.processing_time, queue_type = %data.queue_type, "added worker");
        Ok(())
    }

    pub fn add_storehouse(&mut self, data: StoreHouseData) -> SimResult<()> {
        let station = StationRef::new(StationKind::Store, data.id);
        if self.stations.stores.contains_key(&data.id) {
            return Err(SimError::DuplicateStation(station));
        }
        self.stations.stores.insert(data.id, StoreHouse::new(data));
        debug!(%station, "added storehouse");
        Ok(())
    }

    /// Create a link and bind it into both endpoints.
    ///
    /// Checks run in order: endpoint roles, weight, duplicate id, source
    /// lookup, destination lookup.
    pub fn add_link(&mut self, data: LinkData) -> SimResult<()> {
        let link = Link::new(data.id, data.source, data.destination, data.probability)?;
        if self.links.contains_key(&data.id) {
            return Err(SimError::DuplicateLink(data.id));
        }
        for endpoint in [data.source, data.destination] {
            if !self.stations.contains(endpoint) {
                return Err(SimError::StationNotFound(endpoint));
            }
        }

        let key = self.arena.insert(link);
        if let Some(role) = self.stations.source_mut(data.source) {
            role.bind_output(key, &mut self.arena);
        }
        if let Some(role) = self.stations.destination_mut(data.destination) {
            role.bind_input(key);
        }
        self.links.insert(data.id, key);
        debug!(link = %data.id, src = %data.source, dest = %data.destination, p = data.probability, "added link");
        Ok(())
    }

    pub fn remove_loading_ramp(&mut self, id: StationId) -> bool {
        self.remove_station(StationRef::new(StationKind::Ramp, id))
    }

    pub fn remove_worker(&mut self, id: StationId) -> bool {
        self.remove_station(StationRef::new(StationKind::Worker, id))
    }

    pub fn remove_storehouse(&mut self, id: StationId) -> bool {
        self.remove_station(StationRef::new(StationKind::Store, id))
    }

    /// Remove a station and every link touching it. Surviving sources have
    /// their outgoing weights renormalized. Returns `false` if the station
    /// does not exist.
    pub fn remove_station(&mut self, station: StationRef) -> bool {
        if !self.stations.contains(station) {
            warn!(%station, "remove requested for unknown station");
            return false;
        }

        let outgoing: Vec<LinkKey> = self
            .stations
            .source_mut(station)
            .map(|s| s.outputs().to_vec())
            .unwrap_or_default();
        for key in &outgoing {
            let Some(dest) = self.arena.get(*key).map(Link::destination) else {
                continue;
            };
            if let Some(role) = self.stations.destination_mut(dest) {
                role.unbind_input(*key);
            }
            self.arena.release(*key, LinkEnd::Destination);
        }

        // Collected after the outgoing pass so a self-loop is not seen twice.
        let incoming: Vec<LinkKey> = self
            .stations
            .destination_mut(station)
            .map(|d| d.inputs().to_vec())
            .unwrap_or_default();
        for key in &incoming {
            let Some(src) = self.arena.get(*key).map(Link::source) else {
                continue;
            };
            if let Some(role) = self.stations.source_mut(src) {
                role.unbind_output(*key, &mut self.arena);
            }
            self.arena.release(*key, LinkEnd::Source);
        }

        self.stations.remove(station);
        for key in &outgoing {
            self.arena.release(*key, LinkEnd::Source);
        }
        for key in &incoming {
            self.arena.release(*key, LinkEnd::Destination);
        }

        let swept = self.sweep_links();
        debug!(%station, links_removed = swept, "removed station");
        true
    }

    /// Detach a link from both endpoints and drop it. Returns `false` if no
    /// such link exists.
    pub fn remove_link(&mut self, id: LinkId) -> bool {
        let Some(key) = self.links.remove(&id) else {
            warn!(link = %id, "remove requested for unknown link");
            return false;
        };
        let Some((src, dest)) = self.arena.get(key).map(|l| (l.source(), l.destination())) else {
            return false;
        };
        if let Some(role) = self.stations.source_mut(src) {
            role.unbind_output(key, &mut self.arena);
        }
        self.arena.release(key, LinkEnd::Source);
        if let Some(role) = self.stations.destination_mut(dest) {
            role.unbind_input(key);
        }
        self.arena.release(key, LinkEnd::Destination);
        debug!(link = %id, "removed link");
        true
    }

    /// Drop registry entries whose link no longer exists in the arena.
    fn sweep_links(&mut self) -> usize {
        let before = self.links.len();
        self.links.retain(|_, key| self.arena.contains(*key));
        before - self.links.len()
    }

    // -- Validation ---------------------------------------------------------

    /// Check that every station is connected the way its role requires.
    ///
    /// Reports the first violation. Each worker is checked for outgoing then
    /// incoming links before the next worker, then ramps, then stores.
    pub fn validate(&self) -> SimResult<()> {
        for worker in self.stations.workers.values() {
            if !worker.source().has_outputs() {
                return Err(SimError::NoOutgoingLinks(worker.display_name()));
            }
            if !worker.destination().has_inputs() {
                return Err(SimError::NoIncomingLinks(worker.display_name()));
            }
        }
        for ramp in self.stations.ramps.values() {
            if !ramp.source().has_outputs() {
                return Err(SimError::NoOutgoingLinks(ramp.display_name()));
            }
        }
        for store in self.stations.stores.values() {
            if !store.destination().has_inputs() {
                return Err(SimError::NoIncomingLinks(store.display_name()));
            }
        }
        Ok(())
    }

    // -- Simulation ---------------------------------------------------------

    /// Advance the factory by one tick.
    pub fn step(&mut self) -> SimResult<()> {
        for ramp in self.stations.ramps.values_mut() {
            ramp.process(&mut self.products)?;
        }
        for worker in self.stations.workers.values_mut() {
            worker.process()?;
        }

        let senders: Vec<StationRef> = self
            .stations
            .ramps
            .keys()
            .map(|id| StationRef::new(StationKind::Ramp, *id))
            .chain(
                self.stations
                    .workers
                    .keys()
                    .map(|id| StationRef::new(StationKind::Worker, *id)),
            )
            .collect();
        for sender in senders {
            self.dispatch_from(sender)?;
        }
        Ok(())
    }

    fn dispatch_from(&mut self, sender: StationRef) -> SimResult<()> {
        let Some(role) = self.stations.source_mut(sender) else {
            return Ok(());
        };
        if let Some((product, destination)) = role.dispatch(&self.arena, self.rng.as_mut())? {
            self.stations.deliver(destination, product)?;
        }
        Ok(())
    }

    /// Run `max_iterations` ticks, writing the structure report up front and
    /// a state report at every tick `schedule` selects.
    ///
    /// Does not validate; callers do that first.
    #[instrument(skip(self, out, schedule))]
    pub fn run(
        &mut self,
        max_iterations: Ticks,
        out: &mut impl Write,
        schedule: &mut ReportSchedule,
    ) -> SimResult<()> {
        info!(
            ramps = self.stations.ramps.len(),
            workers = self.stations.workers.len(),
            stores = self.stations.stores.len(),
            links = self.links.len(),
            "simulation starting"
        );
        out.write_all(b"========= Factory Structure ========\n")?;
        out.write_all(self.structure_report().as_bytes())?;
        out.write_all(b"\n========= Simulation Start =========\n")?;

        for time in 0..max_iterations {
            self.step()?;
            if schedule.is_report_time(time) {
                write!(out, "========= Iteration: {time} =========\n{}", self.state_report())?;
            }
        }
        out.flush()?;
        info!(products = self.products.issued(), "simulation finished");
        Ok(())
    }

    // -- Reports ------------------------------------------------------------

    /// Configuration of every station, grouped by kind.
    pub fn structure_report(&self) -> String {
        let mut out = String::new();
        section(&mut out, "LOADING RAMPS", self.stations.ramps.values(), |r| {
            r.structure_report(&self.arena)
        });
        section(&mut out, "WORKERS", self.stations.workers.values(), |w| {
            w.structure_report(&self.arena)
        });
        section(&mut out, "STOREHOUSES", self.stations.stores.values(), |s| {
            s.structure_report(&self.arena)
        });
        out
    }

    /// Queue contents of every worker and store.
    pub fn state_report(&self) -> String {
        let mut out = String::new();
        section(&mut out, "WORKERS", self.stations.workers.values(), |w| w.state_report());
        section(&mut out, "STOREHOUSES", self.stations.stores.values(), |s| s.state_report());
        out
    }

    // -- Queries ------------------------------------------------------------

    pub fn ramp(&self, id: StationId) -> Option<&LoadingRamp> {
        self.stations.ramps.get(&id)
    }

    pub fn worker(&self, id: StationId) -> Option<&Worker> {
        self.stations.workers.get(&id)
    }

    pub fn store(&self, id: StationId) -> Option<&StoreHouse> {
        self.stations.stores.get(&id)
    }

    /// Mutable store access, for draining products after a run.
    pub fn store_mut(&mut self, id: StationId) -> Option<&mut StoreHouse> {
        self.stations.stores.get_mut(&id)
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id).and_then(|key| self.arena.get(*key))
    }

    pub fn contains_link(&self, id: LinkId) -> bool {
        self.link(id).is_some()
    }

    pub fn contains_station(&self, station: StationRef) -> bool {
        self.stations.contains(station)
    }

    pub fn ramps(&self) -> impl Iterator<Item = &LoadingRamp> {
        self.stations.ramps.values()
    }

    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.stations.workers.values()
    }

    pub fn stores(&self) -> impl Iterator<Item = &StoreHouse> {
        self.stations.stores.values()
    }

    /// Live links in ascending id order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values().filter_map(|key| self.arena.get(*key))
    }

    pub fn link_arena(&self) -> &LinkArena {
        &self.arena
    }

    pub fn ramps_data(&self) -> Vec<LoadingRampData> {
        self.ramps().map(LoadingRamp::data).collect()
    }

    pub fn workers_data(&self) -> Vec<WorkerData> {
        self.workers().map(Worker::data).collect()
    }

    pub fn stores_data(&self) -> Vec<StoreHouseData> {
        self.stores().map(StoreHouse::data).collect()
    }

    pub fn links_data(&self) -> Vec<LinkData> {
        self.links().map(Link::data).collect()
    }

    pub fn ramp_count(&self) -> usize {
        self.stations.ramps.len()
    }

    pub fn worker_count(&self) -> usize {
        self.stations.workers.len()
    }

    pub fn store_count(&self) -> usize {
        self.stations.stores.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ramp_count() + self.worker_count() + self.store_count() == 0 && self.links.is_empty()
    }

    /// Number of products manufactured so far.
    pub fn products_made(&self) -> u64 {
        self.products.issued()
    }
}

/// `== TITLE ==` header followed by each rendered item and a blank line.
fn section<'a, T: 'a>(
    out: &mut String,
    title: &str,
    items: impl Iterator<Item = &'a T>,
    render: impl Fn(&T) -> String,
) {
    out.push_str(&format!("== {title} ==\n\n"));
    for item in items {
        out.push_str(&render(item));
        out.push_str("\n\n");
    }
}
