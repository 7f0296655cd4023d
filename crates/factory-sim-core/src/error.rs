//! Error type shared by every factory operation.

use crate::id::{LinkId, StationRef};

/// Errors raised by topology mutation, validation and the run loop.
///
/// Nothing in the crate swallows these; they surface unchanged to whoever
/// drives the factory.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("{} with id {} already created", .0.kind.label(), .0.id)]
    DuplicateStation(StationRef),
    #[error("LINK with id {0} already created")]
    DuplicateLink(LinkId),
    #[error("could not find {} of id {}", .0.kind, .0.id)]
    StationNotFound(StationRef),
    #[error("cannot use a store as a link source")]
    InvalidLinkSource,
    #[error("cannot use a ramp as a link destination")]
    InvalidLinkDestination,
    #[error("cannot link a ramp directly to a store")]
    RampToStore,
    #[error("invalid link weight {0}: must be greater than 0")]
    InvalidWeight(f64),
    #[error("{0} has no outgoing links to route a product through")]
    NoRoutingTarget(String),
    #[error("{0} has no stored products")]
    EmptyBuffer(String),
    #[error("{0} already holds a product waiting for dispatch")]
    SlotOccupied(String),
    #[error("{0} has no outgoing links")]
    NoOutgoingLinks(String),
    #[error("{0} has no incoming links")]
    NoIncomingLinks(String),
    #[error("report timings list is empty")]
    EmptyReportSchedule,
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
