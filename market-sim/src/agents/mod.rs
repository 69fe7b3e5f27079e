pub mod consumer;
pub mod producer;

pub use consumer::*;
pub use producer::*;

use crate::events::EventSink;
use crate::random::RandomSource;
use crate::types::{Price, Quantity, Tick};

/// Inputs shared by every agent action within one tick.
///
/// Holds the run's random source and event sink by `&mut`, so it is rebuilt
/// each tick and never outlives the call that made it.
pub struct TickContext<'a, R: RandomSource + ?Sized, S: EventSink + ?Sized> {
    pub tick: Tick,
    /// Demand intercept.
    pub max_price: Price,
    pub noise_amplitude: i64,
    pub purchase_probability: f64,
    pub rng: &'a mut R,
    pub sink: &'a mut S,
}

impl<R: RandomSource + ?Sized, S: EventSink + ?Sized> TickContext<'_, R, S> {
    pub fn noise(&mut self) -> i64 {
        self.rng.noise(self.noise_amplitude)
    }
}

/// `max(0, floor(value))` as a quantity.
pub(crate) fn floor_quantity(value: f64) -> Quantity {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value.floor() as u64
    }
}
