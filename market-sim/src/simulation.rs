// Simulation state container: one market, its agents, the clock and the RNG

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::{ConsumerAgent, ProducerAgent};
use crate::clock::SimulationClock;
use crate::config::{MarketConfig, validate_slope};
use crate::error::{ConfigError, ConfigResult};
use crate::events::EventSink;
use crate::market::{MarketState, PriceRule};
use crate::random::{RandomSource, SimRng};
use crate::tick::{TickParams, TickReport};
use crate::types::{ConsumerId, Price, ProducerId, Quantity, Tick};

/// Point-in-time view of a run, for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct MarketSnapshot {
    pub tick: Tick,
    pub horizon: Tick,
    pub price: Price,
    pub total_supply: Quantity,
    pub producer_count: u32,
    pub consumer_count: u32,
}

/// Outcome of running to the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: Tick,
    pub final_price: Price,
    pub final_supply: Quantity,
    pub total_supplied: Quantity,
    pub total_purchased: Quantity,
}

#[derive(Debug, Clone)]
pub struct Simulation<R: RandomSource = SimRng> {
    config: MarketConfig,
    params: TickParams,
    market: MarketState,
    producers: Vec<ProducerAgent>,
    consumers: Vec<ConsumerAgent>,
    clock: SimulationClock,
    rng: R,
}

impl Simulation<SimRng> {
    /// Build from config, seeding from `random_seed` when present and from
    /// the OS otherwise.
    pub fn new(config: MarketConfig) -> ConfigResult<Self> {
        let rng = SimRng::from_seed_option(config.random_seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Build with uniform slopes: producers `1..=producer_count` and consumers
    /// `1..=consumer_count`.
    pub fn with_rng(config: MarketConfig, rng: R) -> ConfigResult<Self> {
        config.validate()?;
        let producers = (1..=config.producer_count)
            .map(|i| ProducerAgent::new(ProducerId::new(i), config.supply_slope))
            .collect();
        let consumers = (1..=config.consumer_count)
            .map(|i| ConsumerAgent::new(ConsumerId::new(i), config.demand_slope))
            .collect();
        Self::with_agents(config, producers, consumers, rng)
    }

    /// Build from explicit agent lists, each agent keeping its own slope.
    /// Registration order is the order given; the config's counts and
    /// uniform slopes are overwritten to match the lists.
    pub fn with_agents(
        mut config: MarketConfig,
        producers: Vec<ProducerAgent>,
        consumers: Vec<ConsumerAgent>,
        mut rng: R,
    ) -> ConfigResult<Self> {
        config.validate()?;

        let mut seen = HashSet::new();
        for p in &producers {
            validate_slope("supply", p.supply_slope)?;
            if !seen.insert(p.id) {
                return Err(ConfigError::DuplicateAgentId {
                    kind: "producer",
                    id: p.id.0,
                });
            }
        }
        let mut seen = HashSet::new();
        for c in &consumers {
            validate_slope("demand", c.demand_slope)?;
            if !seen.insert(c.id) {
                return Err(ConfigError::DuplicateAgentId {
                    kind: "consumer",
                    id: c.id.0,
                });
            }
        }

        config.producer_count = producers.len() as u32;
        config.consumer_count = consumers.len() as u32;

        let initial_price = rng.random_int_range(config.max_price);
        let market = MarketState::new(initial_price, PriceRule::from_config(&config));

        Ok(Self {
            params: TickParams::from_config(&config),
            clock: SimulationClock::new(config.horizon),
            config,
            market,
            producers,
            consumers,
            rng,
        })
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn market(&self) -> &MarketState {
        &self.market
    }

    pub fn producers(&self) -> &[ProducerAgent] {
        &self.producers
    }

    pub fn consumers(&self) -> &[ConsumerAgent] {
        &self.consumers
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick()
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_finished()
    }

    /// Advance one tick. `None` once the horizon has been reached.
    pub fn step<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Option<TickReport> {
        self.clock.step(
            self.params,
            &mut self.market,
            &self.producers,
            &self.consumers,
            &mut self.rng,
            sink,
        )
    }

    /// Run all remaining ticks.
    pub fn run<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> RunSummary {
        let mut summary = RunSummary {
            ticks: 0,
            final_price: self.market.current_price(),
            final_supply: self.market.current_supply(),
            total_supplied: 0,
            total_purchased: 0,
        };
        while let Some(report) = self.step(sink) {
            summary.ticks += 1;
            summary.total_supplied = summary.total_supplied.saturating_add(report.supplied);
            summary.total_purchased = summary.total_purchased.saturating_add(report.purchased);
        }
        summary.final_price = self.market.current_price();
        summary.final_supply = self.market.current_supply();
        summary
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            tick: self.clock.current_tick(),
            horizon: self.clock.horizon(),
            price: self.market.current_price(),
            total_supply: self.market.current_supply(),
            producer_count: self.producers.len() as u32,
            consumer_count: self.consumers.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, NullSink};
    use crate::random::FixedRandom;

    #[test]
    fn test_new_rejects_bad_config() {
        let config = MarketConfig {
            max_price: -5,
            ..Default::default()
        };
        assert_eq!(
            Simulation::new(config).unwrap_err(),
            ConfigError::NonPositiveMaxPrice(-5)
        );
    }

    #[test]
    fn test_agents_registered_in_id_order() {
        let sim = Simulation::new(MarketConfig::default().with_seed(1)).unwrap();
        let producer_ids: Vec<u32> = sim.producers().iter().map(|p| p.id.0).collect();
        let consumer_ids: Vec<u32> = sim.consumers().iter().map(|c| c.id.0).collect();
        assert_eq!(producer_ids, vec![1, 2, 3]);
        assert_eq!(consumer_ids, vec![1, 2, 3, 4, 5]);
        assert!(sim.producers().iter().all(|p| p.supply_slope == 0.5));
        assert!(sim.consumers().iter().all(|c| c.demand_slope == 1.0));
    }

    #[test]
    fn test_initial_price_within_range() {
        for seed in 0..50 {
            let sim = Simulation::new(MarketConfig::default().with_seed(seed)).unwrap();
            let price = sim.market().current_price();
            assert!((1..=100).contains(&price), "seed {} price {}", seed, price);
            assert_eq!(sim.market().current_supply(), 0);
        }
    }

    #[test]
    fn test_duplicate_agent_ids_rejected() {
        let producers = vec![
            ProducerAgent::new(ProducerId::new(1), 0.5),
            ProducerAgent::new(ProducerId::new(1), 0.7),
        ];
        let err = Simulation::with_agents(
            MarketConfig::default(),
            producers,
            vec![],
            FixedRandom { int: 0, unit: 0.0 },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateAgentId {
                kind: "producer",
                id: 1
            }
        );
    }

    #[test]
    fn test_per_agent_slopes_kept() {
        let producers = vec![
            ProducerAgent::new(ProducerId::new(1), 0.0),
            ProducerAgent::new(ProducerId::new(2), 2.0),
        ];
        let consumers = vec![ConsumerAgent::new(ConsumerId::new(9), 0.25)];
        let sim = Simulation::with_agents(
            MarketConfig::default(),
            producers,
            consumers,
            FixedRandom { int: 40, unit: 0.5 },
        )
        .unwrap();
        assert_eq!(sim.producers()[1].supply_slope, 2.0);
        assert_eq!(sim.consumers()[0].id, ConsumerId::new(9));
        assert_eq!(sim.config().producer_count, 2);
        assert_eq!(sim.config().consumer_count, 1);
        assert_eq!(sim.market().current_price(), 40);
    }

    #[test]
    fn test_negative_agent_slope_rejected() {
        let consumers = vec![ConsumerAgent::new(ConsumerId::new(1), -0.5)];
        let err = Simulation::with_agents(
            MarketConfig::default(),
            vec![],
            consumers,
            FixedRandom { int: 0, unit: 0.0 },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSlope { kind: "demand", .. }));
    }

    #[test]
    fn test_run_summary_matches_snapshot() {
        let mut sim = Simulation::new(MarketConfig::default().with_seed(11)).unwrap();
        let mut log = EventLog::new();
        let summary = sim.run(&mut log);

        let snapshot = sim.snapshot();
        assert_eq!(summary.ticks, 50);
        assert_eq!(snapshot.tick, 50);
        assert_eq!(summary.final_price, snapshot.price);
        assert_eq!(summary.final_supply, snapshot.total_supply);
        assert_eq!(
            summary.final_supply,
            summary.total_supplied - summary.total_purchased
        );
        assert!(sim.is_finished());
        assert!(sim.step(&mut NullSink).is_none());
    }

    #[test]
    fn test_max_price_at_limit_runs_to_horizon() {
        let config = MarketConfig {
            max_price: Price::MAX,
            supply_slope: 1.0,
            horizon: 5,
            ..MarketConfig::default().with_seed(1)
        };
        let mut sim = Simulation::new(config).unwrap();

        let summary = sim.run(&mut NullSink);

        assert_eq!(summary.ticks, 5);
        assert!(summary.final_price >= 1);
        assert!(summary.total_supplied >= summary.total_purchased);
        assert!(summary.total_supplied >= summary.final_supply);
    }
}
