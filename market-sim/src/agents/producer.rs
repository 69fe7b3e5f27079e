use serde::{Deserialize, Serialize};

use super::{TickContext, floor_quantity};
use crate::events::{EventSink, MarketEvent};
use crate::market::MarketState;
use crate::random::RandomSource;
use crate::types::{Price, ProducerId, Quantity};

// === PRODUCER ===

/// Supplies more at higher prices: `supply_slope * price`, plus noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerAgent {
    pub id: ProducerId,
    pub supply_slope: f64,
}

impl ProducerAgent {
    pub fn new(id: ProducerId, supply_slope: f64) -> Self {
        Self { id, supply_slope }
    }

    /// `max(0, floor(supply_slope * price + noise))`
    pub fn supply_function(&self, price: Price, noise: i64) -> Quantity {
        floor_quantity(self.supply_slope * price as f64 + noise as f64)
    }

    /// One tick of production. Supply is always added to the market, even when
    /// it comes out as zero; only positive amounts are reported.
    pub fn produce<R, S>(&self, market: &mut MarketState, ctx: &mut TickContext<'_, R, S>) -> Quantity
    where
        R: RandomSource + ?Sized,
        S: EventSink + ?Sized,
    {
        let price = market.current_price();
        let noise = ctx.noise();
        let quantity = self.supply_function(price, noise);

        let supply_before = market.current_supply();
        market.add_supply(quantity);

        if quantity > 0 {
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "supply",
                tick = ctx.tick,
                producer_id = self.id.0,
                quantity = quantity,
                price = price,
                total_supply = market.current_supply(),
            );

            ctx.sink.record(MarketEvent::Supplied {
                tick: ctx.tick,
                producer: self.id,
                quantity,
                price,
                supply_before,
                supply_after: market.current_supply(),
            });
        }

        quantity
    }
}
