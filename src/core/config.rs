//! Configuration for a service counter
//!
//! Holds the lane layout, overflow capacity, stock limits and pricing. Every
//! field has a default, so a TOML file only needs the values it overrides.

use super::errors::{CounterError, CounterResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_STOCK: u32 = 50;
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;
pub const DEFAULT_UNIT_PRICE: u64 = 650;
pub const DEFAULT_WAITING_CAPACITY: usize = 5;
pub const DEFAULT_SNAPSHOT_PATH: &str = "./programState.txt";

/// Stock bounds shared by every lane of one counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLimits {
    pub max_stock: u32,
    pub low_stock_threshold: u32,
}

impl Default for StockLimits {
    fn default() -> Self {
        Self {
            max_stock: DEFAULT_MAX_STOCK,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Capacity of each service lane, in lane index order
    pub lane_layout: Vec<usize>,
    /// Capacity of the circular overflow lane
    pub waiting_capacity: usize,
    pub max_stock: u32,
    pub low_stock_threshold: u32,
    /// Income credited per unit served
    pub unit_price: u64,
    pub snapshot_path: PathBuf,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            lane_layout: vec![2, 3, 5],
            waiting_capacity: DEFAULT_WAITING_CAPACITY,
            max_stock: DEFAULT_MAX_STOCK,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            unit_price: DEFAULT_UNIT_PRICE,
            snapshot_path: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl CounterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lane_layout(mut self, layout: Vec<usize>) -> Self {
        self.lane_layout = layout;
        self
    }

    pub fn with_waiting_capacity(mut self, capacity: usize) -> Self {
        self.waiting_capacity = capacity;
        self
    }

    pub fn with_max_stock(mut self, max_stock: u32) -> Self {
        self.max_stock = max_stock;
        self
    }

    pub fn with_low_stock_threshold(mut self, threshold: u32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn with_unit_price(mut self, price: u64) -> Self {
        self.unit_price = price;
        self
    }

    pub fn with_snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = path.into();
        self
    }

    pub fn stock_limits(&self) -> StockLimits {
        StockLimits {
            max_stock: self.max_stock,
            low_stock_threshold: self.low_stock_threshold,
        }
    }

    pub fn validate(&self) -> CounterResult<()> {
        if self.lane_layout.is_empty() {
            return Err(CounterError::InvalidConfig(
                "at least one lane is required".to_string(),
            ));
        }
        if let Some(index) = self.lane_layout.iter().position(|&capacity| capacity == 0) {
            return Err(CounterError::InvalidConfig(format!(
                "lane {} has zero capacity",
                index
            )));
        }
        if self.waiting_capacity == 0 {
            return Err(CounterError::InvalidConfig(
                "waiting lane has zero capacity".to_string(),
            ));
        }
        if self.low_stock_threshold > self.max_stock {
            return Err(CounterError::InvalidConfig(format!(
                "low stock threshold {} exceeds maximum stock {}",
                self.low_stock_threshold, self.max_stock
            )));
        }
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> CounterResult<Self> {
        let config: CounterConfig =
            toml::from_str(text).map_err(|e| CounterError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> CounterResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
