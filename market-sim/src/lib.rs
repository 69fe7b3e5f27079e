//! Agent-based price discovery.
//!
//! Producers and consumers trade through one shared [`MarketState`]. Each
//! tick the price rule nudges the price against accumulated supply, then
//! producers add supply and consumers occasionally buy it back out.

use wasm_bindgen::prelude::*;

pub mod agents;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod market;
pub mod random;
pub mod simulation;
pub mod tick;
pub mod types;

#[cfg(feature = "instrument")]
pub use instrument;

pub use agents::{ConsumerAgent, ProducerAgent, TickContext};
pub use clock::SimulationClock;
pub use config::MarketConfig;
pub use error::{ConfigError, ConfigResult};
pub use events::{ActorKind, EventLog, EventSink, MarketEvent, NullSink};
pub use market::{MarketState, PriceRule};
pub use random::{RandomSource, SimRng};
pub use simulation::{MarketSnapshot, RunSummary, Simulation};
pub use tick::{TickParams, TickReport, run_tick};
pub use types::{ConsumerId, Price, ProducerId, Quantity, Tick};

// ============================================================================
// WASM API
// ============================================================================

/// Browser-facing handle. Keeps its own event log so the page can pull
/// structured events or rendered lines after each step.
#[wasm_bindgen]
pub struct MarketSim {
    sim: Simulation,
    log: EventLog,
}

#[wasm_bindgen]
impl MarketSim {
    #[wasm_bindgen(constructor)]
    pub fn new(config: MarketConfig) -> Result<MarketSim, JsError> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Ok(Self {
            sim: Simulation::new(config)?,
            log: EventLog::new(),
        })
    }

    /// Build from a JSON config document; missing fields take defaults.
    #[wasm_bindgen]
    pub fn from_json(json: &str) -> Result<MarketSim, JsError> {
        Self::new(MarketConfig::from_json(json)?)
    }

    /// Advance one tick. Returns false once the horizon has been reached.
    #[wasm_bindgen]
    pub fn step(&mut self) -> bool {
        self.sim.step(&mut self.log).is_some()
    }

    /// Run every remaining tick.
    #[wasm_bindgen]
    pub fn run(&mut self) {
        self.sim.run(&mut self.log);
    }

    #[wasm_bindgen]
    pub fn get_tick(&self) -> u64 {
        self.sim.current_tick()
    }

    #[wasm_bindgen]
    pub fn is_finished(&self) -> bool {
        self.sim.is_finished()
    }

    #[wasm_bindgen]
    pub fn get_snapshot(&self) -> MarketSnapshot {
        self.sim.snapshot()
    }

    /// All events so far, as plain JS objects tagged by `kind`.
    #[wasm_bindgen]
    pub fn get_events(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(self.log.events()).map_err(|e| JsError::new(&e.to_string()))
    }

    /// All events so far, rendered as console lines.
    #[wasm_bindgen]
    pub fn get_log_lines(&self) -> js_sys::Array {
        self.log.lines().map(JsValue::from).collect()
    }
}
