use crate::core::config::CounterConfig;
use crate::core::errors::{CounterError, CounterResult};
use serde::{Deserialize, Serialize};

/// Arrival and service parameters for a counter simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub counter: CounterConfig,
    pub duration_cycles: u64,
    /// Mean customer arrivals per cycle (Poisson)
    pub arrival_rate: f64,
    pub min_units_per_customer: u32,
    pub max_units_per_customer: u32,
    /// Chance that a lane attempts to serve its front customer each cycle
    pub service_probability: f64,
    pub initial_stock: u32,
    /// Restock every this many cycles, 0 to disable
    pub restock_interval_cycles: u64,
    pub restock_amount: u32,
    pub random_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            counter: CounterConfig::default(),
            duration_cycles: 100,
            arrival_rate: 0.8,
            min_units_per_customer: 1,
            max_units_per_customer: 5,
            service_probability: 0.3,
            initial_stock: 50,
            restock_interval_cycles: 20,
            restock_amount: 25,
            random_seed: Some(42),
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counter(mut self, counter: CounterConfig) -> Self {
        self.counter = counter;
        self
    }

    pub fn with_duration(mut self, cycles: u64) -> Self {
        self.duration_cycles = cycles;
        self
    }

    pub fn with_arrival_rate(mut self, rate: f64) -> Self {
        self.arrival_rate = rate;
        self
    }

    pub fn with_units_range(mut self, min: u32, max: u32) -> Self {
        self.min_units_per_customer = min;
        self.max_units_per_customer = max;
        self
    }

    pub fn with_service_probability(mut self, probability: f64) -> Self {
        self.service_probability = probability;
        self
    }

    pub fn with_initial_stock(mut self, stock: u32) -> Self {
        self.initial_stock = stock;
        self
    }

    pub fn with_restock(mut self, interval_cycles: u64, amount: u32) -> Self {
        self.restock_interval_cycles = interval_cycles;
        self.restock_amount = amount;
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn validate(&self) -> CounterResult<()> {
        self.counter.validate()?;
        if !self.arrival_rate.is_finite() || self.arrival_rate < 0.0 {
            return Err(CounterError::InvalidConfig(format!(
                "arrival rate {} must be a non-negative number",
                self.arrival_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.service_probability) {
            return Err(CounterError::InvalidConfig(format!(
                "service probability {} must be between 0 and 1",
                self.service_probability
            )));
        }
        if self.min_units_per_customer > self.max_units_per_customer {
            return Err(CounterError::InvalidConfig(format!(
                "units range {}..={} is empty",
                self.min_units_per_customer, self.max_units_per_customer
            )));
        }
        if self.initial_stock > self.counter.max_stock {
            return Err(CounterError::InvalidConfig(format!(
                "initial stock {} exceeds maximum stock {}",
                self.initial_stock, self.counter.max_stock
            )));
        }
        Ok(())
    }
}
