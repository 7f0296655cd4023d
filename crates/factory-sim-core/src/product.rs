use crate::id::ProductId;
use std::fmt;

/// A unit of flow. Carries nothing but its identity.
///
/// Not `Clone`: a product is moved between slots and buffers, never copied.
#[derive(Debug, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
}

impl Product {
    pub fn id(&self) -> ProductId {
        self.id
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id.0)
    }
}

/// Hands out product ids in increasing order, one sequence per factory.
#[derive(Debug, Default, Clone)]
pub struct ProductSequence {
    next: u64,
}

impl ProductSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manufacture the next product.
    pub fn make(&mut self) -> Product {
        let id = ProductId(self.next);
        self.next += 1;
        Product { id }
    }

    /// Number of products made so far.
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_at_zero() {
        let mut seq = ProductSequence::new();
        let a = seq.make();
        let b = seq.make();
        assert_eq!(a.id(), ProductId(0));
        assert_eq!(b.id(), ProductId(1));
        assert_eq!(seq.issued(), 2);
    }

    #[test]
    fn display_uses_hash_prefix() {
        let mut seq = ProductSequence::new();
        assert_eq!(seq.make().to_string(), "#0");
    }
}
