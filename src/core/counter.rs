use super::config::CounterConfig;
use super::errors::{CounterError, CounterResult};
use super::lanes::{ServiceLane, WaitingLane};
use super::routing::{Placement, Refill, RoutingOrder};
use super::snapshot::SnapshotCodec;
use super::stock::StockLedger;
use super::types::{validate_name, Customer};
use log::{debug, info};
use std::path::Path;

/// A customer who left a lane, plus any waiting customer moved up behind them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub customer: Customer,
    pub refill: Option<Refill>,
}

/// Search hits for every lane and the waiting lane, aligned to positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSearch<'a> {
    pub lanes: Vec<Vec<Option<&'a Customer>>>,
    pub waiting: Vec<Option<&'a Customer>>,
}

impl<'a> CounterSearch<'a> {
    pub fn match_count(&self) -> usize {
        self.lanes
            .iter()
            .flatten()
            .chain(self.waiting.iter())
            .filter(|hit| hit.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.match_count() == 0
    }
}

/// The full counter: shared stock, service lanes and the overflow lane
///
/// This is the surface a front end drives. Every mutation runs to completion
/// before returning and a failed call leaves the state unchanged.
#[derive(Debug, PartialEq)]
pub struct ServiceCounter {
    ledger: StockLedger,
    lanes: Vec<ServiceLane>,
    routing: RoutingOrder,
    waiting: WaitingLane,
    codec: SnapshotCodec,
}

impl Clone for ServiceCounter {
    /// Deep copy with its own stock level, so the copy never debits ours
    fn clone(&self) -> Self {
        let ledger = self.ledger.detached();
        let lanes = self
            .lanes
            .iter()
            .map(|lane| lane.with_ledger(ledger.clone()))
            .collect();
        Self::from_parts(ledger, lanes, self.waiting.clone(), self.codec)
    }
}

impl ServiceCounter {
    pub fn new(config: &CounterConfig) -> CounterResult<Self> {
        config.validate()?;

        let ledger = StockLedger::new(config.stock_limits());
        let lanes = config
            .lane_layout
            .iter()
            .enumerate()
            .map(|(id, &capacity)| ServiceLane::new(id, capacity, config.unit_price, ledger.clone()))
            .collect();
        let waiting = WaitingLane::new(config.waiting_capacity);

        let counter = Self::from_parts(ledger, lanes, waiting, SnapshotCodec::from_config(config));
        info!(
            "Counter ready with lanes {:?}, routing order {:?}, waiting capacity {}",
            config.lane_layout,
            counter.routing.as_slice(),
            config.waiting_capacity
        );
        Ok(counter)
    }

    /// Counter with default stock limits and pricing
    pub fn from_layout(layout: &[usize], waiting_capacity: usize) -> CounterResult<Self> {
        Self::new(
            &CounterConfig::default()
                .with_lane_layout(layout.to_vec())
                .with_waiting_capacity(waiting_capacity),
        )
    }

    pub(crate) fn from_parts(
        ledger: StockLedger,
        lanes: Vec<ServiceLane>,
        waiting: WaitingLane,
        codec: SnapshotCodec,
    ) -> Self {
        let routing = RoutingOrder::from_lanes(&lanes);
        Self {
            ledger,
            lanes,
            routing,
            waiting,
            codec,
        }
    }

    pub fn lanes(&self) -> &[ServiceLane] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> CounterResult<&ServiceLane> {
        self.lanes.get(index).ok_or(CounterError::SelectionOutOfRange {
            index,
            max: self.lanes.len().saturating_sub(1),
        })
    }

    fn lane_mut(&mut self, index: usize) -> CounterResult<&mut ServiceLane> {
        let max = self.lanes.len().saturating_sub(1);
        self.lanes
            .get_mut(index)
            .ok_or(CounterError::SelectionOutOfRange { index, max })
    }

    pub fn waiting_lane(&self) -> &WaitingLane {
        &self.waiting
    }

    pub fn routing_order(&self) -> &RoutingOrder {
        &self.routing
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn stock(&self) -> u32 {
        self.ledger.stock()
    }

    pub fn is_stock_low(&self) -> bool {
        self.ledger.is_low()
    }

    pub fn set_stock(&mut self, value: u32) -> CounterResult<()> {
        self.ledger.set_stock(value)
    }

    /// Add units to the stock, returning the new level
    pub fn restock(&mut self, amount: u32) -> CounterResult<u32> {
        self.ledger.restock(amount)
    }

    pub fn lane_income(&self, index: usize) -> CounterResult<u64> {
        Ok(self.lane(index)?.income())
    }

    pub fn total_income(&self) -> u64 {
        self.lanes.iter().map(ServiceLane::income).sum()
    }

    /// Indices of lanes that still have an empty slot
    pub fn lanes_with_space(&self) -> Vec<usize> {
        self.lanes
            .iter()
            .enumerate()
            .filter(|(_, lane)| !lane.is_full())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn customer_count(&self) -> usize {
        self.lanes.iter().map(ServiceLane::occupied_count).sum::<usize>() + self.waiting.len()
    }

    /// Route a new arrival to the smallest open lane or the waiting lane
    ///
    /// Names that could not be written to a snapshot are rejected.
    pub fn add_customer(&mut self, customer: Customer) -> CounterResult<Placement> {
        validate_name(customer.first_name())?;
        validate_name(customer.last_name())?;
        let name = customer.full_name();
        let placement = self.routing.route(customer, &mut self.lanes, &mut self.waiting)?;
        debug!("Placed {} in {:?}", name, placement);
        Ok(placement)
    }

    /// Remove the customer at `position` of `lane`, then backfill from waiting
    pub fn remove_customer(&mut self, lane: usize, position: usize) -> CounterResult<Departure> {
        let customer = self.lane_mut(lane)?.remove(position)?;
        let refill = self.refill_from_waiting()?;
        Ok(Departure { customer, refill })
    }

    /// Serve the front customer of `lane`, then backfill from waiting
    pub fn serve_customer(&mut self, lane: usize) -> CounterResult<Departure> {
        let customer = self.lane_mut(lane)?.serve_front()?;
        let refill = self.refill_from_waiting()?;
        Ok(Departure { customer, refill })
    }

    pub fn refill_from_waiting(&mut self) -> CounterResult<Option<Refill>> {
        self.routing.refill_from_waiting(&mut self.lanes, &mut self.waiting)
    }

    pub fn search(&self, term: &str) -> CounterSearch<'_> {
        CounterSearch {
            lanes: self.lanes.iter().map(|lane| lane.search(term)).collect(),
            waiting: self.waiting.search(term),
        }
    }

    /// Every customer in a service lane, sorted by full name
    pub fn sorted_customers(&self) -> Vec<&Customer> {
        let mut customers: Vec<&Customer> =
            self.lanes.iter().flat_map(|lane| lane.customers()).collect();
        customers.sort_by_cached_key(|customer| customer.full_name());
        customers
    }

    pub fn to_snapshot(&self) -> String {
        self.codec.encode(self)
    }

    /// Replace the whole state with a decoded snapshot, or change nothing
    pub fn restore_snapshot(&mut self, text: &str) -> CounterResult<()> {
        *self = self.codec.decode(text)?;
        Ok(())
    }

    pub fn save_snapshot(&self, path: &Path) -> CounterResult<()> {
        self.codec.save(self, path)
    }

    pub fn load_snapshot(&mut self, path: &Path) -> CounterResult<()> {
        *self = self.codec.load(path)?;
        Ok(())
    }
}
