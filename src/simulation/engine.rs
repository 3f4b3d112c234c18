use super::config::SimulationConfig;
use crate::core::counter::ServiceCounter;
use crate::core::errors::{CounterError, CounterResult};
use crate::core::routing::Placement;
use crate::core::types::Customer;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson};

const FIRST_NAMES: &[&str] = &[
    "Amara", "Bilal", "Chen", "Dana", "Elif", "Farah", "Goran", "Hana", "Ishaan", "Jonas",
];
const LAST_NAMES: &[&str] = &[
    "Perera", "Silva", "Okafor", "Novak", "Haddad", "Kim", "Larsen", "Mendes", "Rossi", "Tanaka",
];

/// Observer hooks for a running simulation
pub trait SimulationObserver {
    /// Called after every cycle with the counter as it stands
    fn on_cycle_complete(&mut self, cycle: u64, counter: &ServiceCounter);

    /// Called when an arrival finds every lane and the waiting lane full
    fn on_turned_away(&mut self, _cycle: u64, _customer: &Customer) {}
}

/// Aggregate outcome of one simulation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub seed: Option<u64>,
    pub cycles: u64,
    pub arrivals: u64,
    pub placed_in_lanes: u64,
    pub sent_to_waiting: u64,
    pub turned_away: u64,
    pub served: u64,
    pub units_sold: u64,
    /// Service attempts blocked because stock could not cover the customer
    pub stock_stalls: u64,
    pub refilled_from_waiting: u64,
    pub restocked_units: u64,
    pub final_stock: u32,
    pub lane_incomes: Vec<u64>,
    pub total_income: u64,
    pub customers_left_waiting: usize,
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Cycles:              {}", self.cycles)?;
        writeln!(f, "Arrivals:            {}", self.arrivals)?;
        writeln!(f, "  to lanes:          {}", self.placed_in_lanes)?;
        writeln!(f, "  to waiting lane:   {}", self.sent_to_waiting)?;
        writeln!(f, "  turned away:       {}", self.turned_away)?;
        writeln!(f, "Served:              {}", self.served)?;
        writeln!(f, "Units sold:          {}", self.units_sold)?;
        writeln!(f, "Stock stalls:        {}", self.stock_stalls)?;
        writeln!(f, "Backfills:           {}", self.refilled_from_waiting)?;
        writeln!(f, "Restocked units:     {}", self.restocked_units)?;
        writeln!(f, "Final stock:         {}", self.final_stock)?;
        writeln!(f, "Lane incomes:        {:?}", self.lane_incomes)?;
        write!(f, "Total income:        {}", self.total_income)
    }
}

/// Drives a [`ServiceCounter`] with random arrivals and service attempts
pub struct Simulation {
    config: SimulationConfig,
    counter: ServiceCounter,
    rng: StdRng,
    arrivals: Option<Poisson<f64>>,
    current_cycle: u64,
    report: SimulationReport,
    observers: Vec<Box<dyn SimulationObserver>>,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> CounterResult<Self> {
        config.validate()?;

        let mut counter = ServiceCounter::new(&config.counter)?;
        counter.set_stock(config.initial_stock)?;

        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let arrivals = if config.arrival_rate > 0.0 {
            Some(
                Poisson::new(config.arrival_rate)
                    .map_err(|e| CounterError::InvalidConfig(e.to_string()))?,
            )
        } else {
            None
        };
        let report = SimulationReport {
            seed: config.random_seed,
            ..SimulationReport::default()
        };

        Ok(Self {
            config,
            counter,
            rng,
            arrivals,
            current_cycle: 0,
            report,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    pub fn counter(&self) -> &ServiceCounter {
        &self.counter
    }

    pub fn into_counter(self) -> ServiceCounter {
        self.counter
    }

    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    pub fn report(&self) -> &SimulationReport {
        &self.report
    }

    /// Run until the configured duration, returning the final report
    pub fn run(&mut self) -> CounterResult<SimulationReport> {
        while self.current_cycle < self.config.duration_cycles {
            self.step()?;
        }

        info!(
            "Simulation finished after {} cycles: {} arrivals, {} served, {} turned away, income {}",
            self.report.cycles,
            self.report.arrivals,
            self.report.served,
            self.report.turned_away,
            self.report.total_income
        );
        Ok(self.report.clone())
    }

    /// Advance one cycle: restock, arrivals, then one service attempt per lane
    pub fn step(&mut self) -> CounterResult<()> {
        let cycle = self.current_cycle;
        debug!("=== Counter Cycle {} ===", cycle);

        self.restock_if_due(cycle)?;
        self.process_arrivals(cycle)?;
        self.process_service()?;

        self.current_cycle += 1;
        self.refresh_totals();
        for observer in &mut self.observers {
            observer.on_cycle_complete(cycle, &self.counter);
        }
        Ok(())
    }

    fn restock_if_due(&mut self, cycle: u64) -> CounterResult<()> {
        let interval = self.config.restock_interval_cycles;
        if interval == 0 || cycle == 0 || cycle % interval != 0 {
            return Ok(());
        }

        let room = self.counter.ledger().limits().max_stock - self.counter.stock();
        let amount = self.config.restock_amount.min(room);
        if amount > 0 {
            self.counter.restock(amount)?;
            self.report.restocked_units += u64::from(amount);
        }
        Ok(())
    }

    fn process_arrivals(&mut self, cycle: u64) -> CounterResult<()> {
        let count = match &self.arrivals {
            Some(distribution) => distribution.sample(&mut self.rng) as u64,
            None => 0,
        };

        for _ in 0..count {
            let customer = self.random_customer();
            self.report.arrivals += 1;

            match self.counter.add_customer(customer.clone()) {
                Ok(Placement::Lane(_)) => self.report.placed_in_lanes += 1,
                Ok(Placement::Waiting) => self.report.sent_to_waiting += 1,
                Err(CounterError::QueueFull(_)) => {
                    self.report.turned_away += 1;
                    debug!("Turned away {}", customer.full_name());
                    for observer in &mut self.observers {
                        observer.on_turned_away(cycle, &customer);
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn process_service(&mut self) -> CounterResult<()> {
        for lane in 0..self.counter.lanes().len() {
            if !self.rng.gen_bool(self.config.service_probability) {
                continue;
            }

            match self.counter.serve_customer(lane) {
                Ok(departure) => {
                    self.report.served += 1;
                    self.report.units_sold += u64::from(departure.customer.units_required());
                    if departure.refill.is_some() {
                        self.report.refilled_from_waiting += 1;
                    }
                }
                Err(CounterError::InsufficientStock { .. }) => self.report.stock_stalls += 1,
                Err(CounterError::CustomerNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn random_customer(&mut self) -> Customer {
        let first = FIRST_NAMES.choose(&mut self.rng).copied().unwrap_or("Guest");
        let last = LAST_NAMES.choose(&mut self.rng).copied().unwrap_or("Guest");
        let units = self
            .rng
            .gen_range(self.config.min_units_per_customer..=self.config.max_units_per_customer);
        Customer::new(first, last, units)
    }

    fn refresh_totals(&mut self) {
        self.report.cycles = self.current_cycle;
        self.report.final_stock = self.counter.stock();
        self.report.lane_incomes = self.counter.lanes().iter().map(|lane| lane.income()).collect();
        self.report.total_income = self.counter.total_income();
        self.report.customers_left_waiting = self.counter.waiting_lane().len();
    }
}
