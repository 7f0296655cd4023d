//! Processing station: queue, in-process product, and dispatch slot.

use crate::destination::DestinationRole;
use crate::error::SimResult;
use crate::id::{QueueType, StationId, StationKind, StationRef, Ticks};
use crate::link::LinkArena;
use crate::product::Product;
use crate::source::SourceRole;
use crate::station::{StateReport, Station, indent, queue_line, receivers_block};
use crate::timer::Timer;
use serde::{Deserialize, Serialize};

/// Configuration copy of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerData {
    pub id: StationId,
    pub processing_time: Ticks,
    pub queue_type: QueueType,
}

/// Takes products from its buffer one at a time, holds each for
/// `processing_time` ticks, then places it in the dispatch slot.
#[derive(Debug)]
pub struct Worker {
    id: StationId,
    queue_type: QueueType,
    pub(crate) source: SourceRole,
    pub(crate) destination: DestinationRole,
    timer: Timer,
    in_process: Option<Product>,
}

impl Worker {
    pub fn new(data: WorkerData) -> Self {
        let owner = StationRef::new(StationKind::Worker, data.id);
        Self {
            id: data.id,
            queue_type: data.queue_type,
            source: SourceRole::new(owner),
            destination: DestinationRole::new(owner),
            timer: Timer::new(data.processing_time),
            in_process: None,
        }
    }

    /// Accept a product into the buffer. An idle worker starts on the next
    /// product straight away.
    pub fn receive(&mut self, product: Product) -> SimResult<()> {
        self.destination.add_product(product);
        if self.in_process.is_none() {
            self.pull_next()?;
        }
        Ok(())
    }

    /// Advance one tick.
    pub fn process(&mut self) -> SimResult<()> {
        if self.in_process.is_none() && self.destination.has_products() {
            self.pull_next()?;
        }
        if self.in_process.is_some() && self.timer.advance() {
            if let Some(done) = self.in_process.take() {
                self.source.set_product(done)?;
            }
            if self.destination.has_products() {
                self.pull_next()?;
            } else {
                self.timer.stop();
            }
        }
        Ok(())
    }

    fn pull_next(&mut self) -> SimResult<()> {
        let first = self.queue_type == QueueType::Fifo;
        self.in_process = Some(self.destination.take_product(first)?);
        self.timer.reset();
        Ok(())
    }

    pub fn processing_time(&self) -> Ticks {
        self.timer.duration()
    }

    pub fn queue_type(&self) -> QueueType {
        self.queue_type
    }

    pub fn in_process(&self) -> Option<&Product> {
        self.in_process.as_ref()
    }

    /// Ticks spent on the current product.
    pub fn processing_elapsed(&self) -> Ticks {
        self.timer.elapsed()
    }

    pub fn source(&self) -> &SourceRole {
        &self.source
    }

    pub fn destination(&self) -> &DestinationRole {
        &self.destination
    }

    pub fn data(&self) -> WorkerData {
        WorkerData {
            id: self.id,
            processing_time: self.processing_time(),
            queue_type: self.queue_type,
        }
    }
}

impl Station for Worker {
    fn station_ref(&self) -> StationRef {
        StationRef::new(StationKind::Worker, self.id)
    }

    fn structure_report(&self, links: &LinkArena) -> String {
        format!(
            "{}\n{}Processing time: {}\n{}Queue type: {}\n{}",
            self.display_name(),
            indent(1),
            self.processing_time(),
            indent(1),
            self.queue_type,
            receivers_block(&self.source.receiver_lines(links)),
        )
    }
}

impl StateReport for Worker {
    fn state_report(&self) -> String {
        let mut entries = Vec::with_capacity(self.destination.len() + 1);
        if let Some(p) = &self.in_process {
            entries.push(format!("{p} (pt = {})", self.timer.elapsed()));
        }
        entries.extend(self.destination.products().map(ToString::to_string));
        format!("{}\n{}", self.display_name(), queue_line(&entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductSequence;

    fn worker(time: Ticks, queue_type: QueueType) -> Worker {
        Worker::new(WorkerData {
            id: StationId(1),
            processing_time: time,
            queue_type,
        })
    }

    /// Runs the worker until `n` products come out, draining the slot each tick.
    fn drain_order(w: &mut Worker, n: usize) -> Vec<String> {
        let mut out = Vec::new();
        for _ in 0..100 {
            w.process().unwrap();
            if let Some(p) = w.source.take_product() {
                out.push(p.to_string());
            }
            if out.len() == n {
                break;
            }
        }
        out
    }

    #[test]
    fn idle_worker_starts_on_receive() {
        let mut seq = ProductSequence::new();
        let mut w = worker(2, QueueType::Fifo);
        w.receive(seq.make()).unwrap();
        assert_eq!(w.in_process().map(|p| p.to_string()), Some("#0".into()));
        assert!(w.destination().is_empty());
    }

    #[test]
    fn fifo_preserves_arrival_order() {
        let mut seq = ProductSequence::new();
        let mut w = worker(1, QueueType::Fifo);
        for _ in 0..4 {
            w.receive(seq.make()).unwrap();
        }
        assert_eq!(drain_order(&mut w, 4), ["#0", "#1", "#2", "#3"]);
    }

    #[test]
    fn lifo_serves_most_recent() {
        let mut seq = ProductSequence::new();
        let mut w = worker(1, QueueType::Lifo);
        for _ in 0..4 {
            w.receive(seq.make()).unwrap();
        }
        // #0 was already in process when the rest arrived.
        assert_eq!(drain_order(&mut w, 4), ["#0", "#3", "#2", "#1"]);
    }

    #[test]
    fn processing_takes_configured_ticks() {
        let mut seq = ProductSequence::new();
        let mut w = worker(3, QueueType::Fifo);
        w.receive(seq.make()).unwrap();
        w.process().unwrap();
        w.process().unwrap();
        assert!(!w.source().is_product_ready());
        assert_eq!(w.processing_elapsed(), 2);
        w.process().unwrap();
        assert!(w.source().is_product_ready());
        assert!(w.in_process().is_none());
    }

    #[test]
    fn structure_report_lists_queue_type() {
        let w = worker(3, QueueType::Fifo);
        assert_eq!(
            w.structure_report(&LinkArena::new()),
            "WORKER #1\n\tProcessing time: 3\n\tQueue type: FIFO\n\tReceivers:\n"
        );
    }

    #[test]
    fn state_report_shows_progress_then_queue() {
        let mut seq = ProductSequence::new();
        let mut w = worker(3, QueueType::Fifo);
        assert_eq!(w.state_report(), "WORKER #1\n\tQueue: ");

        for _ in 0..3 {
            w.receive(seq.make()).unwrap();
        }
        w.process().unwrap();
        assert_eq!(w.state_report(), "WORKER #1\n\tQueue: #0 (pt = 1), #1, #2");
    }
}
