//! Observer interface for a run.
//!
//! The simulation reports what happened as [`MarketEvent`] records pushed
//! into an [`EventSink`]. Sinks only observe; nothing they do feeds back
//! into market state. `Display` renders the classic console lines.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ConsumerId, Price, ProducerId, Quantity, Tick};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    Producer,
    Consumer,
    Market,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A producer added a positive quantity to the market.
    Supplied {
        tick: Tick,
        producer: ProducerId,
        quantity: Quantity,
        price: Price,
        supply_before: Quantity,
        supply_after: Quantity,
    },
    /// A consumer bought a positive quantity.
    Purchased {
        tick: Tick,
        consumer: ConsumerId,
        quantity: Quantity,
        price: Price,
        supply_before: Quantity,
        supply_after: Quantity,
    },
    /// End-of-tick price report.
    PriceUpdated {
        tick: Tick,
        previous_price: Price,
        price: Price,
        total_supply: Quantity,
    },
}

impl MarketEvent {
    pub fn tick(&self) -> Tick {
        match self {
            MarketEvent::Supplied { tick, .. }
            | MarketEvent::Purchased { tick, .. }
            | MarketEvent::PriceUpdated { tick, .. } => *tick,
        }
    }

    pub fn actor_kind(&self) -> ActorKind {
        match self {
            MarketEvent::Supplied { .. } => ActorKind::Producer,
            MarketEvent::Purchased { .. } => ActorKind::Consumer,
            MarketEvent::PriceUpdated { .. } => ActorKind::Market,
        }
    }

    /// Agent id, or `None` for price events.
    pub fn actor_id(&self) -> Option<u32> {
        match self {
            MarketEvent::Supplied { producer, .. } => Some(producer.0),
            MarketEvent::Purchased { consumer, .. } => Some(consumer.0),
            MarketEvent::PriceUpdated { .. } => None,
        }
    }

    pub fn quantity(&self) -> Option<Quantity> {
        match self {
            MarketEvent::Supplied { quantity, .. } | MarketEvent::Purchased { quantity, .. } => {
                Some(*quantity)
            }
            MarketEvent::PriceUpdated { .. } => None,
        }
    }

    pub fn price(&self) -> Price {
        match self {
            MarketEvent::Supplied { price, .. }
            | MarketEvent::Purchased { price, .. }
            | MarketEvent::PriceUpdated { price, .. } => *price,
        }
    }

    /// Total supply once the event has taken effect.
    pub fn total_supply(&self) -> Quantity {
        match self {
            MarketEvent::Supplied { supply_after, .. }
            | MarketEvent::Purchased { supply_after, .. } => *supply_after,
            MarketEvent::PriceUpdated { total_supply, .. } => *total_supply,
        }
    }
}

impl fmt::Display for MarketEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketEvent::Supplied {
                tick,
                producer,
                quantity,
                price,
                supply_before,
                supply_after,
            } => write!(
                f,
                "{tick}: {producer} supplies {quantity} units of the product at price {price}. \
                 Total supply: {supply_before} + {quantity} = {supply_after}"
            ),
            MarketEvent::Purchased {
                tick,
                consumer,
                quantity,
                price,
                supply_before,
                supply_after,
            } => write!(
                f,
                "{tick}: {consumer} buys {quantity} units of the product at price {price}. \
                 Total supply: {supply_before} - {quantity} = {supply_after}"
            ),
            MarketEvent::PriceUpdated { tick, price, .. } => write!(f, "{tick}: Price = {price}"),
        }
    }
}

// === SINKS ===

pub trait EventSink {
    fn record(&mut self, event: MarketEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: MarketEvent) {}
}

/// In-memory event log for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<MarketEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.events.iter().map(|e| e.to_string())
    }

    pub fn of_kind(&self, kind: ActorKind) -> impl Iterator<Item = &MarketEvent> + '_ {
        self.events.iter().filter(move |e| e.actor_kind() == kind)
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: MarketEvent) {
        self.events.push(event);
    }
}
