//! Line-oriented text snapshots of a whole counter
//!
//! ```text
//! <stock>
//! <lane count>
//! FOODQUEUE_START          (once per lane)
//! <capacity>
//! <income>
//! <capacity lines: "null" or "first,last,units", physical slot order>
//! WAITINGQUEUE_START
//! <capacity>
//! <capacity lines: "null" or "first,last,units", front-to-rear order>
//! ```
//!
//! Decoding is all-or-nothing: a counter is only returned once every line
//! has been read and checked.

use super::config::{CounterConfig, StockLimits};
use super::counter::ServiceCounter;
use super::errors::{CounterError, CounterResult};
use super::lanes::{ServiceLane, WaitingLane};
use super::stock::StockLedger;
use super::types::{Customer, EMPTY_SLOT_MARK, INFO_DELIMITER};
use log::{info, warn};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;
use std::str::{FromStr, Lines};

pub const FOODQUEUE_START_MARK: &str = "FOODQUEUE_START";
pub const WAITINGQUEUE_START_MARK: &str = "WAITINGQUEUE_START";

/// Encodes and decodes counter snapshots
///
/// Stock limits and the unit price are not part of the text, so decoding
/// takes them from the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotCodec {
    limits: StockLimits,
    unit_price: u64,
}

impl SnapshotCodec {
    pub fn new(limits: StockLimits, unit_price: u64) -> Self {
        Self { limits, unit_price }
    }

    pub fn from_config(config: &CounterConfig) -> Self {
        Self::new(config.stock_limits(), config.unit_price)
    }

    pub fn encode(&self, counter: &ServiceCounter) -> String {
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = writeln!(out, "{}", counter.stock());
        let _ = writeln!(out, "{}", counter.lanes().len());

        for lane in counter.lanes() {
            let _ = writeln!(out, "{}", FOODQUEUE_START_MARK);
            let _ = writeln!(out, "{}", lane.capacity());
            let _ = writeln!(out, "{}", lane.income());
            for slot in lane.slots() {
                push_slot(&mut out, slot.as_ref());
            }
        }

        let waiting = counter.waiting_lane();
        let _ = writeln!(out, "{}", WAITINGQUEUE_START_MARK);
        let _ = writeln!(out, "{}", waiting.capacity());
        for slot in waiting.logical_slots() {
            push_slot(&mut out, slot);
        }

        out
    }

    pub fn decode(&self, text: &str) -> CounterResult<ServiceCounter> {
        let mut reader = SnapshotReader::new(text);

        let stock: u32 = reader.next_number("stock level")?;
        let lane_count: usize = reader.next_number("number of lanes")?;
        if lane_count == 0 {
            return Err(reader.malformed("at least one lane is required"));
        }

        let ledger = StockLedger::with_level(self.limits, stock)?;
        let mut lanes = Vec::new();

        for id in 0..lane_count {
            reader.expect_marker(FOODQUEUE_START_MARK, &format!("lane {}", id))?;
            let capacity: usize = reader.next_number(&format!("lane {} length", id))?;
            if capacity == 0 {
                return Err(reader.malformed(&format!("lane {} has zero capacity", id)));
            }
            let income: u64 = reader.next_number(&format!("lane {} income", id))?;

            let mut slots = Vec::new();
            for _ in 0..capacity {
                slots.push(reader.next_slot(&format!("lane {}", id))?);
            }
            lanes.push(ServiceLane::from_slots(id, slots, income, self.unit_price, ledger.clone())?);
        }

        reader.expect_marker(WAITINGQUEUE_START_MARK, "waiting lane")?;
        let capacity: usize = reader.next_number("waiting lane length")?;
        if capacity == 0 {
            return Err(reader.malformed("waiting lane has zero capacity"));
        }
        let mut slots = Vec::new();
        for _ in 0..capacity {
            slots.push(reader.next_slot("waiting lane")?);
        }
        let waiting = WaitingLane::from_logical(slots)?;

        reader.expect_end()?;
        Ok(ServiceCounter::from_parts(ledger, lanes, waiting, *self))
    }

    /// Write a snapshot of `counter` to `path`, replacing any existing file
    pub fn save(&self, counter: &ServiceCounter, path: &Path) -> CounterResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.encode(counter).as_bytes())?;
        writer.flush()?;
        info!("[Snapshot] Saved {} lanes to {}", counter.lanes().len(), path.display());
        Ok(())
    }

    pub fn load(&self, path: &Path) -> CounterResult<ServiceCounter> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => {
                CounterError::MalformedSnapshot("snapshot is not valid UTF-8".to_string())
            }
            _ => CounterError::Io(e),
        })?;
        let counter = self.decode(&text).map_err(|e| {
            warn!("[Snapshot] Rejected {}: {}", path.display(), e);
            e
        })?;
        info!("[Snapshot] Loaded {} lanes from {}", counter.lanes().len(), path.display());
        Ok(counter)
    }
}

fn push_slot(out: &mut String, slot: Option<&Customer>) {
    match slot {
        Some(customer) => out.push_str(&customer.to_record()),
        None => out.push_str(EMPTY_SLOT_MARK),
    }
    out.push('\n');
}

/// Cursor over snapshot lines that reports where decoding stopped
struct SnapshotReader<'a> {
    lines: Lines<'a>,
    line_number: usize,
}

impl<'a> SnapshotReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_number: 0,
        }
    }

    fn malformed(&self, reason: &str) -> CounterError {
        CounterError::MalformedSnapshot(format!("{} (line {})", reason, self.line_number))
    }

    fn next_line(&mut self, what: &str) -> CounterResult<&'a str> {
        let line = self.lines.next();
        self.line_number += 1;
        line.ok_or_else(|| self.malformed(&format!("{} not found", what)))
    }

    fn next_number<T: FromStr>(&mut self, what: &str) -> CounterResult<T> {
        let line = self.next_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| self.malformed(&format!("{} not found", what)))
    }

    fn expect_marker(&mut self, marker: &str, what: &str) -> CounterResult<()> {
        let line = self.next_line(&format!("{} marker", what))?;
        if line != marker {
            return Err(self.malformed(&format!("{} marker not found", what)));
        }
        Ok(())
    }

    fn next_slot(&mut self, what: &str) -> CounterResult<Option<Customer>> {
        let line = self.next_line(&format!("{} data", what))?;
        if line == EMPTY_SLOT_MARK {
            return Ok(None);
        }

        let fields: Vec<&str> = line.split(INFO_DELIMITER).collect();
        let &[first_name, last_name, units] = fields.as_slice() else {
            return Err(self.malformed(&format!(
                "{} customer record needs 3 fields, found {}",
                what,
                fields.len()
            )));
        };
        let units: u32 = units
            .trim()
            .parse()
            .map_err(|_| self.malformed(&format!("{} customer units not a number", what)))?;

        Ok(Some(Customer::new(first_name, last_name, units)))
    }

    fn expect_end(&mut self) -> CounterResult<()> {
        while let Some(line) = self.lines.next() {
            self.line_number += 1;
            if !line.trim().is_empty() {
                return Err(self.malformed("unexpected data after waiting lane"));
            }
        }
        Ok(())
    }
}
