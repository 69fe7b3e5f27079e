use serde::{Deserialize, Serialize};

use crate::config::MarketConfig;
use crate::types::{Price, Quantity};

// ============================================================================
// Price Rule - Threshold adjustment toward equilibrium
// ============================================================================

/// Moves the price one step per tick depending on how much supply is sitting
/// in the market. Between `low_water` and `high_water` (inclusive) the price
/// holds still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRule {
    pub high_water: Quantity,
    pub low_water: Quantity,
    pub change_factor: Price,
}

impl Default for PriceRule {
    fn default() -> Self {
        Self::from_config(&MarketConfig::default())
    }
}

impl PriceRule {
    pub fn from_config(config: &MarketConfig) -> Self {
        Self {
            high_water: config.high_water,
            low_water: config.low_water,
            change_factor: config.price_change_factor,
        }
    }

    /// Next price given the current price and supply. Never below 1; no ceiling.
    pub fn apply(&self, price: Price, total_supply: Quantity) -> Price {
        let next = if total_supply > self.high_water {
            price.saturating_sub(self.change_factor)
        } else if total_supply < self.low_water {
            price.saturating_add(self.change_factor)
        } else {
            price
        };
        next.max(1)
    }
}

// ============================================================================
// Market State - The single shared price and supply record
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketState {
    price: Price,
    total_supply: Quantity,
    rule: PriceRule,
}

impl MarketState {
    pub fn new(initial_price: Price, rule: PriceRule) -> Self {
        Self {
            price: initial_price,
            total_supply: 0,
            rule,
        }
    }

    pub fn with_supply(mut self, total_supply: Quantity) -> Self {
        self.total_supply = total_supply;
        self
    }

    pub fn current_price(&self) -> Price {
        self.price
    }

    pub fn current_supply(&self) -> Quantity {
        self.total_supply
    }

    pub fn add_supply(&mut self, amount: Quantity) {
        self.total_supply = self.total_supply.saturating_add(amount);
    }

    /// Callers take `min(demand, current_supply())` first; this still
    /// saturates at zero rather than wrapping.
    pub fn consume_supply(&mut self, amount: Quantity) {
        debug_assert!(
            amount <= self.total_supply,
            "consume {} exceeds supply {}",
            amount,
            self.total_supply
        );
        self.total_supply = self.total_supply.saturating_sub(amount);
    }

    /// Apply the price rule once. Called exactly once per tick by the clock.
    pub fn update_price(&mut self) -> Price {
        self.price = self.rule.apply(self.price, self.total_supply);
        self.price
    }
}
