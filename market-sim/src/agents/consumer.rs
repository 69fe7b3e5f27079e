use serde::{Deserialize, Serialize};

use super::{TickContext, floor_quantity};
use crate::events::{EventSink, MarketEvent};
use crate::market::MarketState;
use crate::random::RandomSource;
use crate::types::{ConsumerId, Price, Quantity};

// === CONSUMER ===

/// Wants less at higher prices: `max_price - demand_slope * price`, plus noise.
/// Only shows up to buy on a fraction of ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerAgent {
    pub id: ConsumerId,
    pub demand_slope: f64,
}

impl ConsumerAgent {
    pub fn new(id: ConsumerId, demand_slope: f64) -> Self {
        Self { id, demand_slope }
    }

    /// `max(0, floor(max_price - demand_slope * price + noise))`
    pub fn demand_function(&self, price: Price, max_price: Price, noise: i64) -> Quantity {
        floor_quantity(max_price as f64 - self.demand_slope * price as f64 + noise as f64)
    }

    /// One tick of shopping. Returns the quantity bought (0 if nothing happened).
    ///
    /// An empty market is checked before the probability roll, so no random
    /// draw is spent on a tick where nothing could be bought.
    pub fn maybe_buy<R, S>(&self, market: &mut MarketState, ctx: &mut TickContext<'_, R, S>) -> Quantity
    where
        R: RandomSource + ?Sized,
        S: EventSink + ?Sized,
    {
        if market.current_supply() == 0 {
            return 0;
        }
        if ctx.rng.uniform_unit() >= ctx.purchase_probability {
            return 0;
        }

        let price = market.current_price();
        let noise = ctx.noise();
        let demand = self.demand_function(price, ctx.max_price, noise);

        let supply_before = market.current_supply();
        let quantity = demand.min(supply_before);
        if quantity == 0 {
            return 0;
        }
        market.consume_supply(quantity);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "purchase",
            tick = ctx.tick,
            consumer_id = self.id.0,
            quantity = quantity,
            price = price,
            total_supply = market.current_supply(),
        );

        ctx.sink.record(MarketEvent::Purchased {
            tick: ctx.tick,
            consumer: self.id,
            quantity,
            price,
            supply_before,
            supply_after: market.current_supply(),
        });

        quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;
    use crate::market::PriceRule;
    use crate::random::FixedRandom;

    fn buy(consumer: &ConsumerAgent, market: &mut MarketState, rng: FixedRandom) -> (Quantity, EventLog) {
        let mut rng = rng;
        let mut log = EventLog::new();
        let mut ctx = TickContext {
            tick: 4,
            max_price: 100,
            noise_amplitude: 10,
            purchase_probability: 0.1,
            rng: &mut rng,
            sink: &mut log,
        };
        let bought = consumer.maybe_buy(market, &mut ctx);
        (bought, log)
    }

    #[test]
    fn test_demand_function_decreasing_in_price() {
        let consumer = ConsumerAgent::new(ConsumerId::new(1), 1.0);
        assert_eq!(consumer.demand_function(30, 100, 0), 70);
        assert_eq!(consumer.demand_function(90, 100, 0), 10);
        assert_eq!(consumer.demand_function(90, 100, -10), 0);
        assert_eq!(consumer.demand_function(150, 100, 10), 0);
    }

    #[test]
    fn test_buys_when_roll_succeeds() {
        let consumer = ConsumerAgent::new(ConsumerId::new(3), 1.0);
        let mut market = MarketState::new(60, PriceRule::default()).with_supply(100);

        let (bought, log) = buy(&consumer, &mut market, FixedRandom { int: 0, unit: 0.05 });

        assert_eq!(bought, 40);
        assert_eq!(market.current_supply(), 60);
        assert_eq!(
            log.events()[0].to_string(),
            "4: Consumer-3 buys 40 units of the product at price 60. Total supply: 100 - 40 = 60"
        );
    }

    #[test]
    fn test_purchase_capped_by_supply() {
        let consumer = ConsumerAgent::new(ConsumerId::new(1), 1.0);
        let mut market = MarketState::new(10, PriceRule::default()).with_supply(12);

        let (bought, _) = buy(&consumer, &mut market, FixedRandom { int: 0, unit: 0.0 });

        assert_eq!(bought, 12);
        assert_eq!(market.current_supply(), 0);
    }

    #[test]
    fn test_failed_roll_buys_nothing() {
        let consumer = ConsumerAgent::new(ConsumerId::new(1), 1.0);
        let mut market = MarketState::new(10, PriceRule::default()).with_supply(50);

        let (bought, log) = buy(&consumer, &mut market, FixedRandom { int: 0, unit: 0.1 });

        assert_eq!(bought, 0);
        assert_eq!(market.current_supply(), 50);
        assert!(log.is_empty());
    }

    #[test]
    fn test_empty_market_buys_nothing() {
        let consumer = ConsumerAgent::new(ConsumerId::new(1), 1.0);
        let mut market = MarketState::new(10, PriceRule::default());

        let (bought, log) = buy(&consumer, &mut market, FixedRandom { int: 0, unit: 0.0 });

        assert_eq!(bought, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_zero_demand_buys_nothing() {
        let consumer = ConsumerAgent::new(ConsumerId::new(1), 2.0);
        let mut market = MarketState::new(60, PriceRule::default()).with_supply(50);

        // 100 - 2 * 60 - 10 < 0
        let (bought, log) = buy(&consumer, &mut market, FixedRandom { int: -10, unit: 0.0 });

        assert_eq!(bought, 0);
        assert_eq!(market.current_supply(), 50);
        assert!(log.is_empty());
    }
}
