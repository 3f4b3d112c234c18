use crate::core::errors::{CounterError, CounterResult};
use crate::core::types::Customer;
use log::debug;
use std::iter::FusedIterator;

/// Circular-buffer overflow queue
///
/// Emptiness is tracked by the absence of a front index, never by a fill
/// counter. When present, the occupied slots run from front to rear
/// inclusive, wrapping modulo the capacity.
#[derive(Debug, Clone)]
pub struct WaitingLane {
    slots: Vec<Option<Customer>>,
    /// (front, rear) physical indices, `None` when empty
    ends: Option<(usize, usize)>,
}

impl WaitingLane {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            ends: None,
        }
    }

    /// Rebuild a waiting lane from customers listed front to rear
    ///
    /// `slots` is the logical order; occupied entries must precede all empty
    /// ones. The customers are laid out from physical slot 0.
    pub fn from_logical(slots: Vec<Option<Customer>>) -> CounterResult<Self> {
        let occupied = slots.iter().take_while(|slot| slot.is_some()).count();
        if slots[occupied..].iter().any(Option::is_some) {
            return Err(CounterError::MalformedSnapshot(
                "waiting lane has a customer after an empty slot".to_string(),
            ));
        }

        let ends = if occupied == 0 { None } else { Some((0, occupied - 1)) };
        Ok(Self { slots, ends })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn front_index(&self) -> Option<usize> {
        self.ends.map(|(front, _)| front)
    }

    pub fn rear_index(&self) -> Option<usize> {
        self.ends.map(|(_, rear)| rear)
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_none()
    }

    pub fn is_full(&self) -> bool {
        match self.ends {
            Some((front, rear)) => front == (rear + 1) % self.capacity(),
            None => self.capacity() == 0,
        }
    }

    pub fn len(&self) -> usize {
        match self.ends {
            Some((front, rear)) if rear >= front => rear - front + 1,
            Some((front, rear)) => self.capacity() - front + rear + 1,
            None => 0,
        }
    }

    /// Add a customer at the rear
    pub fn enqueue(&mut self, customer: Customer) -> CounterResult<()> {
        if self.is_full() {
            return Err(CounterError::QueueFull("waiting lane".to_string()));
        }

        let (front, rear) = match self.ends {
            Some((front, rear)) => (front, (rear + 1) % self.capacity()),
            None => (0, 0),
        };
        debug!(
            "[Waiting] Enqueued {} at slot {} ({}/{})",
            customer.full_name(),
            rear,
            self.len() + 1,
            self.capacity()
        );
        self.slots[rear] = Some(customer);
        self.ends = Some((front, rear));
        Ok(())
    }

    /// Remove the customer at the front
    pub fn dequeue(&mut self) -> CounterResult<Customer> {
        let (front, rear) = self
            .ends
            .ok_or_else(|| CounterError::CustomerNotFound("waiting lane is empty".to_string()))?;

        let customer = self.slots[front].take().ok_or_else(|| {
            CounterError::CustomerNotFound(format!("waiting lane slot {} is empty", front))
        })?;

        self.ends = if front == rear {
            None
        } else {
            Some(((front + 1) % self.capacity(), rear))
        };
        debug!(
            "[Waiting] Dequeued {} ({}/{})",
            customer.full_name(),
            self.len(),
            self.capacity()
        );
        Ok(customer)
    }

    pub fn peek(&self) -> Option<&Customer> {
        self.ends.and_then(|(front, _)| self.slots[front].as_ref())
    }

    /// Customers in front-to-rear order, independent of physical layout
    pub fn iter(&self) -> WaitingLaneIter<'_> {
        WaitingLaneIter {
            slots: &self.slots,
            cursor: self.ends,
            remaining: self.len(),
        }
    }

    /// Logical order padded with empty slots up to the capacity
    pub fn logical_slots(&self) -> Vec<Option<&Customer>> {
        let mut slots: Vec<Option<&Customer>> = self.iter().map(Some).collect();
        slots.resize(self.capacity(), None);
        slots
    }

    /// Matches aligned to logical positions, padded to the capacity
    pub fn search(&self, term: &str) -> Vec<Option<&Customer>> {
        self.logical_slots()
            .into_iter()
            .map(|slot| slot.filter(|customer| customer.matches(term)))
            .collect()
    }
}

impl PartialEq for WaitingLane {
    fn eq(&self, other: &Self) -> bool {
        self.capacity() == other.capacity() && self.iter().eq(other.iter())
    }
}

impl<'a> IntoIterator for &'a WaitingLane {
    type Item = &'a Customer;
    type IntoIter = WaitingLaneIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front-to-rear walk over a [`WaitingLane`]
pub struct WaitingLaneIter<'a> {
    slots: &'a [Option<Customer>],
    cursor: Option<(usize, usize)>,
    remaining: usize,
}

impl<'a> Iterator for WaitingLaneIter<'a> {
    type Item = &'a Customer;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (current, rear) = self.cursor?;
            self.cursor = if current == rear {
                None
            } else {
                Some(((current + 1) % self.slots.len(), rear))
            };
            self.remaining = self.remaining.saturating_sub(1);

            if let Some(customer) = self.slots[current].as_ref() {
                return Some(customer);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl FusedIterator for WaitingLaneIter<'_> {}
