use super::errors::{CounterError, CounterResult};
use super::lanes::{ServiceLane, WaitingLane};
use super::types::Customer;
use log::{debug, warn};

/// Where an arriving customer ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Lane(usize),
    Waiting,
}

/// A waiting customer moved into a service lane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refill {
    pub lane: usize,
    pub customer: Customer,
}

/// Lane visitation order for new arrivals: ascending capacity, ties by index
///
/// Recompute whenever the lane set is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingOrder {
    order: Vec<usize>,
}

impl RoutingOrder {
    pub fn from_lanes(lanes: &[ServiceLane]) -> Self {
        let mut order: Vec<usize> = (0..lanes.len()).collect();
        // stable sort keeps index order among equal capacities
        order.sort_by_key(|&index| lanes[index].capacity());
        Self { order }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }

    /// First lane in routing order with an empty slot
    pub fn first_open(&self, lanes: &[ServiceLane]) -> Option<usize> {
        self.iter()
            .find(|&index| lanes.get(index).is_some_and(|lane| !lane.is_full()))
    }

    /// Place a customer in the smallest open lane, else in the waiting lane
    pub fn route(
        &self,
        customer: Customer,
        lanes: &mut [ServiceLane],
        waiting: &mut WaitingLane,
    ) -> CounterResult<Placement> {
        if let Some(index) = self.first_open(lanes) {
            lanes[index].add(customer)?;
            return Ok(Placement::Lane(index));
        }

        warn!(
            "[Routing] All {} lanes full, sending {} to the waiting lane",
            lanes.len(),
            customer.full_name()
        );
        waiting
            .enqueue(customer)
            .map_err(|_| CounterError::QueueFull("all lanes and the waiting lane".to_string()))?;
        Ok(Placement::Waiting)
    }

    /// Move the front waiting customer into a lane if one has room
    ///
    /// The customer is only dequeued once a destination lane is known, so a
    /// refill never pushes anyone back into the waiting lane.
    pub fn refill_from_waiting(
        &self,
        lanes: &mut [ServiceLane],
        waiting: &mut WaitingLane,
    ) -> CounterResult<Option<Refill>> {
        if waiting.is_empty() {
            return Ok(None);
        }
        let Some(index) = self.first_open(lanes) else {
            debug!("[Routing] No lane has room for waiting customers");
            return Ok(None);
        };

        let customer = waiting.dequeue()?;
        lanes[index].add(customer.clone())?;
        debug!(
            "[Routing] Moved {} from the waiting lane to lane {}",
            customer.full_name(),
            index
        );
        Ok(Some(Refill { lane: index, customer }))
    }
}
