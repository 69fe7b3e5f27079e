use serde::{Deserialize, Serialize};

use crate::agents::{ConsumerAgent, ProducerAgent};
use crate::events::EventSink;
use crate::market::MarketState;
use crate::random::RandomSource;
use crate::tick::{TickParams, TickReport, run_tick};
use crate::types::Tick;

/// Discrete time for a run: ticks `0..horizon`, then stops.
///
/// The clock does not own the market or the agents; each step borrows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    current_tick: Tick,
    horizon: Tick,
}

impl SimulationClock {
    pub fn new(horizon: Tick) -> Self {
        Self {
            current_tick: 0,
            horizon,
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn horizon(&self) -> Tick {
        self.horizon
    }

    pub fn remaining(&self) -> Tick {
        self.horizon - self.current_tick
    }

    pub fn is_finished(&self) -> bool {
        self.current_tick >= self.horizon
    }

    /// Run the current tick and advance. Once the horizon is reached this is
    /// a no-op returning `None`.
    pub fn step<R, S>(
        &mut self,
        params: TickParams,
        market: &mut MarketState,
        producers: &[ProducerAgent],
        consumers: &[ConsumerAgent],
        rng: &mut R,
        sink: &mut S,
    ) -> Option<TickReport>
    where
        R: RandomSource + ?Sized,
        S: EventSink + ?Sized,
    {
        if self.is_finished() {
            return None;
        }
        let report = run_tick(
            self.current_tick,
            params,
            market,
            producers,
            consumers,
            rng,
            sink,
        );
        self.current_tick += 1;
        Some(report)
    }
}
