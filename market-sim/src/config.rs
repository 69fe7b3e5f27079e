use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Price, Quantity, Tick};

// === DEFAULTS ===

pub const DEFAULT_PRODUCER_COUNT: u32 = 3;
pub const DEFAULT_CONSUMER_COUNT: u32 = 5;
pub const DEFAULT_HORIZON: Tick = 50;
pub const DEFAULT_MAX_PRICE: Price = 100;
pub const DEFAULT_PRICE_CHANGE_FACTOR: Price = 1;
pub const DEFAULT_DEMAND_SLOPE: f64 = 1.0;
pub const DEFAULT_SUPPLY_SLOPE: f64 = 0.5;
/// Supply above this pushes the price down.
pub const DEFAULT_HIGH_WATER: Quantity = 100;
/// Supply below this pushes the price up.
pub const DEFAULT_LOW_WATER: Quantity = 25;
pub const DEFAULT_PURCHASE_PROBABILITY: f64 = 0.1;

/// Everything needed to build a [`crate::Simulation`].
///
/// Missing fields fall back to the reference market (3 producers, 5
/// consumers, 50 ticks, prices up to 100).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct MarketConfig {
    pub producer_count: u32,
    pub consumer_count: u32,
    pub horizon: Tick,
    pub max_price: Price,
    pub price_change_factor: Price,
    pub demand_slope: f64,
    pub supply_slope: f64,
    pub random_seed: Option<u64>,
    pub high_water: Quantity,
    pub low_water: Quantity,
    pub purchase_probability: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            producer_count: DEFAULT_PRODUCER_COUNT,
            consumer_count: DEFAULT_CONSUMER_COUNT,
            horizon: DEFAULT_HORIZON,
            max_price: DEFAULT_MAX_PRICE,
            price_change_factor: DEFAULT_PRICE_CHANGE_FACTOR,
            demand_slope: DEFAULT_DEMAND_SLOPE,
            supply_slope: DEFAULT_SUPPLY_SLOPE,
            random_seed: None,
            high_water: DEFAULT_HIGH_WATER,
            low_water: DEFAULT_LOW_WATER,
            purchase_probability: DEFAULT_PURCHASE_PROBABILITY,
        }
    }
}

impl MarketConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_horizon(mut self, horizon: Tick) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_agents(mut self, producers: u32, consumers: u32) -> Self {
        self.producer_count = producers;
        self.consumer_count = consumers;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_price <= 0 {
            return Err(ConfigError::NonPositiveMaxPrice(self.max_price));
        }
        if self.price_change_factor < 0 {
            return Err(ConfigError::NegativePriceChangeFactor(
                self.price_change_factor,
            ));
        }
        validate_slope("supply", self.supply_slope)?;
        validate_slope("demand", self.demand_slope)?;
        if self.low_water > self.high_water {
            return Err(ConfigError::InvertedDeadBand {
                low: self.low_water,
                high: self.high_water,
            });
        }
        if !(0.0..=1.0).contains(&self.purchase_probability) {
            return Err(ConfigError::InvalidProbability(self.purchase_probability));
        }
        Ok(())
    }

    /// Half-width of the uniform noise applied to supply and demand.
    pub fn noise_amplitude(&self) -> i64 {
        self.max_price / 10
    }
}

pub(crate) fn validate_slope(kind: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSlope { kind, value })
    }
}
