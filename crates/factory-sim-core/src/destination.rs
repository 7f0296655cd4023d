//! Queueing role: an ordered buffer of accepted products plus the incoming
//! links.

use crate::error::{SimError, SimResult};
use crate::id::{LinkKey, StationRef};
use crate::product::Product;
use std::collections::VecDeque;

/// Accepted products in arrival order. Incoming links are tracked only so
/// validation can tell whether anything feeds this station.
#[derive(Debug)]
pub struct DestinationRole {
    owner: StationRef,
    buffer: VecDeque<Product>,
    inputs: Vec<LinkKey>,
}

impl DestinationRole {
    pub fn new(owner: StationRef) -> Self {
        Self {
            owner,
            buffer: VecDeque::new(),
            inputs: Vec::new(),
        }
    }

    /// Append a product at the tail.
    pub fn add_product(&mut self, product: Product) {
        self.buffer.push_back(product);
    }

    /// Remove a product from the head (`first`) or the tail.
    pub fn take_product(&mut self, first: bool) -> SimResult<Product> {
        let taken = if first {
            self.buffer.pop_front()
        } else {
            self.buffer.pop_back()
        };
        taken.ok_or_else(|| SimError::EmptyBuffer(self.owner.display_name()))
    }

    pub fn has_products(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.buffer.iter()
    }

    pub fn inputs(&self) -> &[LinkKey] {
        &self.inputs
    }

    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub(crate) fn bind_input(&mut self, key: LinkKey) {
        self.inputs.push(key);
    }

    pub(crate) fn unbind_input(&mut self, key: LinkKey) {
        self.inputs.retain(|k| *k != key);
    }
}
