use serde::{Deserialize, Serialize};

use crate::agents::{ConsumerAgent, ProducerAgent, TickContext};
use crate::config::MarketConfig;
use crate::events::{EventSink, MarketEvent};
use crate::market::MarketState;
use crate::random::RandomSource;
use crate::types::{Price, Quantity, Tick};

/// Run-wide constants the agents read every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickParams {
    pub max_price: Price,
    /// Half-width of the uniform noise on supply and demand.
    pub noise_amplitude: i64,
    pub purchase_probability: f64,
}

impl TickParams {
    pub fn from_config(config: &MarketConfig) -> Self {
        Self {
            max_price: config.max_price,
            noise_amplitude: config.noise_amplitude(),
            purchase_probability: config.purchase_probability,
        }
    }
}

impl Default for TickParams {
    fn default() -> Self {
        Self::from_config(&MarketConfig::default())
    }
}

/// What one tick did to the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    pub previous_price: Price,
    pub price: Price,
    pub supplied: Quantity,
    pub purchased: Quantity,
    pub purchases: u32,
    pub total_supply: Quantity,
}

/// Execute a single tick.
///
/// Order is fixed:
/// 1. Price update (agents this tick see the freshly updated price)
/// 2. Producers, in registration order
/// 3. Consumers, in registration order
/// 4. End-of-tick price event
pub fn run_tick<R, S>(
    tick: Tick,
    params: TickParams,
    market: &mut MarketState,
    producers: &[ProducerAgent],
    consumers: &[ConsumerAgent],
    rng: &mut R,
    sink: &mut S,
) -> TickReport
where
    R: RandomSource + ?Sized,
    S: EventSink + ?Sized,
{
    // 1. PRICE UPDATE
    let previous_price = market.current_price();
    let price = market.update_price();

    let mut ctx = TickContext {
        tick,
        max_price: params.max_price,
        noise_amplitude: params.noise_amplitude,
        purchase_probability: params.purchase_probability,
        rng,
        sink,
    };

    // 2. PRODUCTION (totals saturate like the market's own supply)
    let supplied = producers
        .iter()
        .map(|producer| producer.produce(market, &mut ctx))
        .fold(0, Quantity::saturating_add);

    // 3. PURCHASES
    let mut purchased: Quantity = 0;
    let mut purchases = 0;
    for consumer in consumers {
        let qty = consumer.maybe_buy(market, &mut ctx);
        if qty > 0 {
            purchased = purchased.saturating_add(qty);
            purchases += 1;
        }
    }

    // 4. PRICE REPORT
    let total_supply = market.current_supply();

    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "price",
        tick = tick,
        previous_price = previous_price,
        price = price,
        total_supply = total_supply,
    );

    ctx.sink.record(MarketEvent::PriceUpdated {
        tick,
        previous_price,
        price,
        total_supply,
    });

    TickReport {
        tick,
        previous_price,
        price,
        supplied,
        purchased,
        purchases,
        total_supply,
    }
}
