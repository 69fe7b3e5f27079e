// Core ID types and type aliases

use std::fmt;

use serde::{Deserialize, Serialize};

// === TYPE ALIASES ===

/// Market price. Signed so the price rule can step below the floor before clamping.
pub type Price = i64;
pub type Quantity = u64;
pub type Tick = u64;

// === NEWTYPE IDS ===

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ProducerId(pub u32);

impl ProducerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ProducerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Producer-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ConsumerId(pub u32);

impl ConsumerId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Consumer-{}", self.0)
    }
}
