use crate::core::errors::{CounterError, CounterResult};
use crate::core::stock::StockLedger;
use crate::core::types::Customer;
use log::debug;

/// Fixed-capacity linear queue served from the front
///
/// Occupied slots are always left-packed: removing a customer shifts every
/// customer behind it one slot forward, so no empty slot precedes an
/// occupied one and the occupied slots form the prefix `[0, occupied)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLane {
    id: usize,
    slots: Vec<Option<Customer>>,
    /// Number of occupied slots, also the next insertion point
    occupied: usize,
    income: u64,
    unit_price: u64,
    ledger: StockLedger,
}

impl ServiceLane {
    /// Create an empty lane
    pub fn new(id: usize, capacity: usize, unit_price: u64, ledger: StockLedger) -> Self {
        Self {
            id,
            slots: vec![None; capacity],
            occupied: 0,
            income: 0,
            unit_price,
            ledger,
        }
    }

    /// Rebuild a lane from stored slots, which must already be left-packed
    pub fn from_slots(
        id: usize,
        slots: Vec<Option<Customer>>,
        income: u64,
        unit_price: u64,
        ledger: StockLedger,
    ) -> CounterResult<Self> {
        let occupied = slots.iter().take_while(|slot| slot.is_some()).count();
        if let Some(stray) = slots[occupied..].iter().position(Option::is_some) {
            return Err(CounterError::MalformedSnapshot(format!(
                "lane {} has a customer at slot {} after an empty slot {}",
                id,
                occupied + stray,
                occupied
            )));
        }

        Ok(Self {
            id,
            slots,
            occupied,
            income,
            unit_price,
            ledger,
        })
    }

    /// Copy of this lane drawing on a different ledger
    pub(crate) fn with_ledger(&self, ledger: StockLedger) -> Self {
        Self {
            ledger,
            ..self.clone()
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn income(&self) -> u64 {
        self.income
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn slots(&self) -> &[Option<Customer>] {
        &self.slots
    }

    /// Customers in queue order
    pub fn customers(&self) -> impl Iterator<Item = &Customer> + '_ {
        self.slots[..self.occupied].iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied >= self.capacity()
    }

    pub fn get(&self, index: usize) -> CounterResult<Option<&Customer>> {
        self.validate_selection(index)?;
        Ok(self.slots[index].as_ref())
    }

    /// Append a customer at the first empty slot, returning its position
    pub fn add(&mut self, customer: Customer) -> CounterResult<usize> {
        if self.is_full() {
            return Err(CounterError::QueueFull(format!("lane {}", self.id)));
        }

        let position = self.occupied;
        debug!(
            "[Lane:{}] Added {} at position {} ({}/{})",
            self.id,
            customer.full_name(),
            position,
            position + 1,
            self.capacity()
        );
        self.slots[position] = Some(customer);
        self.occupied += 1;
        Ok(position)
    }

    /// Remove the customer at `index` and close the gap behind it
    pub fn remove(&mut self, index: usize) -> CounterResult<Customer> {
        self.validate_selection(index)?;
        if self.slots[index].is_none() {
            return Err(CounterError::CustomerNotFound(format!(
                "lane {} position {}",
                self.id, index
            )));
        }

        let customer = self.shift_left(index);
        debug!(
            "[Lane:{}] Removed {} from position {} ({}/{})",
            self.id,
            customer.full_name(),
            index,
            self.occupied,
            self.capacity()
        );
        Ok(customer)
    }

    /// Serve the front customer, debiting stock and crediting income
    ///
    /// Nothing changes unless the shared ledger covers the customer's units.
    pub fn serve_front(&mut self) -> CounterResult<Customer> {
        let units = match self.slots.first() {
            Some(Some(customer)) => customer.units_required(),
            _ => {
                return Err(CounterError::CustomerNotFound(format!(
                    "lane {} has no customer at the front",
                    self.id
                )))
            }
        };

        let income = self
            .unit_price
            .checked_mul(u64::from(units))
            .and_then(|sale| self.income.checked_add(sale))
            .ok_or(CounterError::IncomeOverflow { lane: self.id })?;

        self.ledger.debit(units)?;
        self.income = income;
        let customer = self.shift_left(0);

        debug!(
            "[Lane:{}] Served {} with {} items (income {})",
            self.id,
            customer.full_name(),
            units,
            self.income
        );
        Ok(customer)
    }

    /// Customers whose full name contains `term`, aligned to slot positions
    pub fn search(&self, term: &str) -> Vec<Option<&Customer>> {
        self.slots
            .iter()
            .map(|slot| slot.as_ref().filter(|customer| customer.matches(term)))
            .collect()
    }

    /// True when no empty slot precedes an occupied one
    pub fn is_left_packed(&self) -> bool {
        self.slots[self.occupied..].iter().all(Option::is_none)
            && self.slots[..self.occupied].iter().all(Option::is_some)
    }

    fn validate_selection(&self, index: usize) -> CounterResult<()> {
        if index >= self.capacity() {
            return Err(CounterError::SelectionOutOfRange {
                index,
                max: self.capacity().saturating_sub(1),
            });
        }
        Ok(())
    }

    /// Take the customer at `start` and move every later slot one step left
    fn shift_left(&mut self, start: usize) -> Customer {
        let removed = self.slots.remove(start);
        self.slots.push(None);
        self.occupied -= 1;
        // callers check the slot is occupied first
        removed.unwrap_or_else(|| unreachable!("shift_left on an empty slot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StockLimits;

    fn lane(capacity: usize) -> ServiceLane {
        ServiceLane::new(0, capacity, 650, StockLedger::new(StockLimits::default()))
    }

    fn customer(name: &str, units: u32) -> Customer {
        Customer::new(name, "Test", units)
    }

    #[test]
    fn test_add_fills_left_to_right() {
        let mut lane = lane(2);
        assert_eq!(lane.add(customer("A", 1)).unwrap(), 0);
        assert_eq!(lane.add(customer("B", 1)).unwrap(), 1);
        assert!(lane.is_full());

        let err = lane.add(customer("C", 1)).unwrap_err();
        assert!(matches!(err, CounterError::QueueFull(_)));
        assert_eq!(lane.occupied_count(), 2);
    }

    #[test]
    fn test_get_checks_range() {
        let mut lane = lane(3);
        lane.add(customer("A", 1)).unwrap();
        assert_eq!(lane.get(0).unwrap().map(Customer::first_name), Some("A"));
        assert!(lane.get(2).unwrap().is_none());
        assert!(matches!(
            lane.get(3),
            Err(CounterError::SelectionOutOfRange { index: 3, max: 2 })
        ));
    }

    #[test]
    fn test_remove_compacts_slots() {
        let mut lane = lane(4);
        for name in ["A", "B", "C", "D"] {
            lane.add(customer(name, 1)).unwrap();
        }

        let removed = lane.remove(1).unwrap();
        assert_eq!(removed.first_name(), "B");
        let names: Vec<_> = lane.customers().map(Customer::first_name).collect();
        assert_eq!(names, vec!["A", "C", "D"]);
        assert!(lane.slots()[3].is_none());
        assert!(lane.is_left_packed());

        lane.remove(2).unwrap();
        lane.remove(0).unwrap();
        assert!(lane.is_left_packed());
        assert_eq!(lane.occupied_count(), 1);
        assert_eq!(lane.get(0).unwrap().map(Customer::first_name), Some("C"));
    }

    #[test]
    fn test_remove_empty_slot_and_out_of_range() {
        let mut lane = lane(2);
        lane.add(customer("A", 1)).unwrap();
        assert!(matches!(lane.remove(1), Err(CounterError::CustomerNotFound(_))));
        assert!(matches!(lane.remove(2), Err(CounterError::SelectionOutOfRange { .. })));
        assert_eq!(lane.occupied_count(), 1);
    }

    #[test]
    fn test_serve_front_debits_and_credits() {
        let mut lane = lane(2);
        lane.ledger().set_stock(5).unwrap();
        lane.add(customer("A", 2)).unwrap();
        lane.add(customer("B", 1)).unwrap();

        let served = lane.serve_front().unwrap();
        assert_eq!(served.first_name(), "A");
        assert_eq!(lane.ledger().stock(), 3);
        assert_eq!(lane.income(), 1300);
        assert_eq!(lane.get(0).unwrap().map(Customer::first_name), Some("B"));
        assert!(lane.get(1).unwrap().is_none());
    }

    #[test]
    fn test_serve_front_without_stock_changes_nothing() {
        let mut lane = lane(2);
        lane.ledger().set_stock(2).unwrap();
        lane.add(customer("A", 3)).unwrap();
        let before = lane.clone();

        let err = lane.serve_front().unwrap_err();
        assert!(matches!(err, CounterError::InsufficientStock { required: 3, available: 2 }));
        assert_eq!(lane, before);
        assert_eq!(lane.ledger().stock(), 2);
        assert_eq!(lane.income(), 0);
    }

    #[test]
    fn test_serve_front_income_overflow_changes_nothing() {
        let ledger = StockLedger::with_level(StockLimits::default(), 5).unwrap();
        let slots = vec![Some(customer("A", 1))];
        let mut lane = ServiceLane::from_slots(0, slots, u64::MAX, 650, ledger).unwrap();
        let before = lane.clone();

        let err = lane.serve_front().unwrap_err();
        assert!(matches!(err, CounterError::IncomeOverflow { lane: 0 }));
        assert_eq!(lane, before);
        assert_eq!(lane.ledger().stock(), 5);

        let ledger = StockLedger::with_level(StockLimits::default(), 5).unwrap();
        let mut pricey = ServiceLane::new(1, 1, u64::MAX, ledger);
        pricey.add(customer("B", 2)).unwrap();
        assert!(matches!(pricey.serve_front(), Err(CounterError::IncomeOverflow { lane: 1 })));
        assert_eq!(pricey.ledger().stock(), 5);
        assert_eq!(pricey.occupied_count(), 1);
    }

    #[test]
    fn test_serve_front_on_empty_lane() {
        let mut lane = lane(2);
        assert!(matches!(lane.serve_front(), Err(CounterError::CustomerNotFound(_))));
    }

    #[test]
    fn test_search_keeps_positions() {
        let mut lane = lane(4);
        lane.add(Customer::new("Ada", "Lovelace", 1)).unwrap();
        lane.add(Customer::new("Alan", "Turing", 1)).unwrap();
        lane.add(Customer::new("Grace", "Hopper", 1)).unwrap();

        let hits = lane.search("AL");
        assert_eq!(hits.len(), 4);
        assert!(hits[0].is_none());
        assert_eq!(hits[1].map(Customer::first_name), Some("Alan"));
        assert!(hits[2].is_none());
        assert!(hits[3].is_none());

        let everyone = lane.search("");
        assert_eq!(everyone.iter().filter(|hit| hit.is_some()).count(), 3);
        assert!(lane.search("nobody").iter().all(Option::is_none));
    }

    #[test]
    fn test_from_slots_rejects_holes() {
        let ledger = StockLedger::new(StockLimits::default());
        let packed = vec![Some(customer("A", 1)), None, None];
        let lane = ServiceLane::from_slots(1, packed, 650, 650, ledger.clone()).unwrap();
        assert_eq!(lane.occupied_count(), 1);
        assert_eq!(lane.income(), 650);

        let holey = vec![Some(customer("A", 1)), None, Some(customer("B", 1))];
        let result = ServiceLane::from_slots(1, holey, 0, 650, ledger);
        assert!(matches!(result, Err(CounterError::MalformedSnapshot(_))));
    }
}
