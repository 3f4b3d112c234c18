use super::config::StockLimits;
use super::errors::{CounterError, CounterResult};
use log::{debug, warn};
use std::cell::Cell;
use std::rc::Rc;

pub const MIN_STOCK: u32 = 0;

/// Shared inventory counter for all lanes of one counter
///
/// Cloning yields another handle to the same level; each lane holds one.
/// The level always stays within `[MIN_STOCK, limits.max_stock]`.
#[derive(Debug, Clone)]
pub struct StockLedger {
    level: Rc<Cell<u32>>,
    limits: StockLimits,
}

impl StockLedger {
    /// Create an empty ledger
    pub fn new(limits: StockLimits) -> Self {
        Self {
            level: Rc::new(Cell::new(MIN_STOCK)),
            limits,
        }
    }

    /// Create a ledger holding `level` units
    pub fn with_level(limits: StockLimits, level: u32) -> CounterResult<Self> {
        let ledger = Self::new(limits);
        ledger.set_stock(level)?;
        Ok(ledger)
    }

    pub fn stock(&self) -> u32 {
        self.level.get()
    }

    pub fn limits(&self) -> StockLimits {
        self.limits
    }

    pub fn set_stock(&self, value: u32) -> CounterResult<()> {
        self.check_range(u64::from(value))?;
        debug!("[Stock] Level set {} -> {}", self.level.get(), value);
        self.level.set(value);
        self.warn_if_low();
        Ok(())
    }

    /// Add `amount` units to the current level
    pub fn restock(&self, amount: u32) -> CounterResult<u32> {
        let target = u64::from(self.level.get()) + u64::from(amount);
        self.check_range(target)?;
        // check_range bounds target by max_stock, a u32
        let target = target as u32;
        self.set_stock(target)?;
        Ok(target)
    }

    /// Remove `units` from the level, refusing to go below zero
    pub fn debit(&self, units: u32) -> CounterResult<u32> {
        let available = self.level.get();
        let remaining = available
            .checked_sub(units)
            .ok_or(CounterError::InsufficientStock { required: units, available })?;
        self.level.set(remaining);
        debug!("[Stock] Debited {} units, {} remaining", units, remaining);
        self.warn_if_low();
        Ok(remaining)
    }

    pub fn is_low(&self) -> bool {
        self.level.get() <= self.limits.low_stock_threshold
    }

    /// New independent ledger holding the current level
    pub fn detached(&self) -> Self {
        Self {
            level: Rc::new(Cell::new(self.level.get())),
            limits: self.limits,
        }
    }

    /// True when both handles point at the same shared level
    pub fn shares_level_with(&self, other: &StockLedger) -> bool {
        Rc::ptr_eq(&self.level, &other.level)
    }

    fn check_range(&self, value: u64) -> CounterResult<()> {
        if value > u64::from(self.limits.max_stock) {
            return Err(CounterError::StockOutOfRange {
                value,
                min: MIN_STOCK,
                max: self.limits.max_stock,
            });
        }
        Ok(())
    }

    fn warn_if_low(&self) {
        if self.is_low() {
            warn!("[Stock] Low stock level, {} items left", self.level.get());
        }
    }
}

impl PartialEq for StockLedger {
    fn eq(&self, other: &Self) -> bool {
        self.stock() == other.stock() && self.limits == other.limits
    }
}

impl Eq for StockLedger {}
