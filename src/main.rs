use clap::{Parser, Subcommand};
use log::info;
use queuesim::core::{CounterConfig, CounterError, CounterResult, Customer, ServiceCounter};
use queuesim::simulation::{run_replications, summarize, Simulation, SimulationConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "queuesim")]
#[command(about = "Multi-lane service counter with shared stock and an overflow lane")]
#[command(version)]
struct Args {
    /// Counter configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Snapshot file, overrides the configured path
    #[arg(short = 's', long = "snapshot", value_name = "FILE", global = true)]
    snapshot: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true, value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write an empty counter to the snapshot file
    Init {
        /// Starting stock level
        #[arg(long, default_value_t = 0)]
        stock: u32,
    },
    /// Print every lane, the waiting lane and the stock level
    Show,
    /// List lanes that still have an empty slot
    Empty,
    /// Add a customer to the smallest lane with room, or the waiting lane
    Add {
        first_name: String,
        last_name: String,
        units: u32,
    },
    /// Remove the customer at a position (both 0-based) without serving them
    Remove { lane: usize, position: usize },
    /// Serve the front customer of a lane (0-based)
    Serve { lane: usize },
    /// Print the stock level, or set it
    Stock {
        #[arg(long, value_name = "UNITS")]
        set: Option<u32>,
    },
    /// Add units to the stock
    Restock { amount: u32 },
    /// Find customers whose full name contains a term (case-insensitive)
    Search { term: String },
    /// List lane customers sorted by full name
    Sorted,
    /// Print income per lane and in total
    Income {
        /// Only this lane (0-based)
        lane: Option<usize>,
    },
    /// Run a random arrival simulation on a fresh counter
    Simulate {
        #[arg(long, default_value_t = 100)]
        cycles: u64,
        /// Mean arrivals per cycle
        #[arg(long, default_value_t = 0.8)]
        arrival_rate: f64,
        /// Chance per cycle that a lane serves its front customer
        #[arg(long, default_value_t = 0.3)]
        service_probability: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Run this many seeds in parallel and print the averages
        #[arg(long, default_value_t = 1)]
        replications: u64,
        /// Save the final counter to the snapshot file (single run only)
        #[arg(long)]
        save: bool,
    },
}

fn init_logging(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.format_timestamp(None).init();
}

fn load_config(args: &Args) -> CounterResult<CounterConfig> {
    let mut config = match &args.config {
        Some(path) => CounterConfig::from_toml_file(path)?,
        None => CounterConfig::default(),
    };
    if let Some(path) = &args.snapshot {
        config = config.with_snapshot_path(path.clone());
    }
    Ok(config)
}

fn open_counter(config: &CounterConfig) -> CounterResult<ServiceCounter> {
    let mut counter = ServiceCounter::new(config)?;
    counter.load_snapshot(&config.snapshot_path)?;
    Ok(counter)
}

fn print_counter(counter: &ServiceCounter) {
    for lane in counter.lanes() {
        let slots: Vec<String> = lane
            .slots()
            .iter()
            .map(|slot| match slot {
                Some(customer) => format!("{} ({})", customer.full_name(), customer.units_required()),
                None => "-".to_string(),
            })
            .collect();
        println!(
            "Lane {} [{}/{}] income {}: {}",
            lane.id(),
            lane.occupied_count(),
            lane.capacity(),
            lane.income(),
            slots.join(" | ")
        );
    }

    let waiting = counter.waiting_lane();
    let queued: Vec<String> = waiting.iter().map(Customer::full_name).collect();
    println!(
        "Waiting [{}/{}]: {}",
        waiting.len(),
        waiting.capacity(),
        if queued.is_empty() { "-".to_string() } else { queued.join(" | ") }
    );
    print_stock(counter);
}

fn print_stock(counter: &ServiceCounter) {
    if counter.is_stock_low() {
        println!("Stock: {} (low)", counter.stock());
    } else {
        println!("Stock: {}", counter.stock());
    }
}

fn run(args: Args) -> CounterResult<()> {
    let config = load_config(&args)?;
    let snapshot_path = config.snapshot_path.clone();

    match args.command {
        Command::Init { stock } => {
            let mut counter = ServiceCounter::new(&config)?;
            counter.set_stock(stock)?;
            counter.save_snapshot(&snapshot_path)?;
            println!("Initialised {}", snapshot_path.display());
        }
        Command::Show => print_counter(&open_counter(&config)?),
        Command::Empty => {
            let counter = open_counter(&config)?;
            let open = counter.lanes_with_space();
            if open.is_empty() {
                println!("All lanes are full");
            }
            for index in open {
                let lane = counter.lane(index)?;
                println!(
                    "Lane {}: {} of {} slots free",
                    index,
                    lane.capacity() - lane.occupied_count(),
                    lane.capacity()
                );
            }
        }
        Command::Add {
            first_name,
            last_name,
            units,
        } => {
            let mut counter = open_counter(&config)?;
            let customer = Customer::validated(first_name, last_name, units)?;
            let name = customer.full_name();
            let placement = counter.add_customer(customer)?;
            counter.save_snapshot(&snapshot_path)?;
            println!("Added {} to {:?}", name, placement);
        }
        Command::Remove { lane, position } => {
            let mut counter = open_counter(&config)?;
            let departure = counter.remove_customer(lane, position)?;
            counter.save_snapshot(&snapshot_path)?;
            println!("Removed {}", departure.customer.full_name());
            if let Some(refill) = departure.refill {
                println!("Moved {} up to lane {}", refill.customer.full_name(), refill.lane);
            }
        }
        Command::Serve { lane } => {
            let mut counter = open_counter(&config)?;
            let departure = counter.serve_customer(lane)?;
            counter.save_snapshot(&snapshot_path)?;
            println!(
                "Served {} ({} units)",
                departure.customer.full_name(),
                departure.customer.units_required()
            );
            if let Some(refill) = departure.refill {
                println!("Moved {} up to lane {}", refill.customer.full_name(), refill.lane);
            }
            print_stock(&counter);
        }
        Command::Stock { set } => {
            let mut counter = open_counter(&config)?;
            if let Some(value) = set {
                counter.set_stock(value)?;
                counter.save_snapshot(&snapshot_path)?;
            }
            print_stock(&counter);
        }
        Command::Restock { amount } => {
            let mut counter = open_counter(&config)?;
            counter.restock(amount)?;
            counter.save_snapshot(&snapshot_path)?;
            print_stock(&counter);
        }
        Command::Search { term } => {
            let counter = open_counter(&config)?;
            let hits = counter.search(&term);
            for (lane, positions) in hits.lanes.iter().enumerate() {
                for (position, customer) in positions.iter().enumerate() {
                    if let Some(customer) = customer {
                        println!("Lane {} position {}: {}", lane, position, customer.full_name());
                    }
                }
            }
            for (position, customer) in hits.waiting.iter().enumerate() {
                if let Some(customer) = customer {
                    println!("Waiting position {}: {}", position, customer.full_name());
                }
            }
            if hits.is_empty() {
                println!("No customer matches '{}'", term);
            }
        }
        Command::Sorted => {
            let counter = open_counter(&config)?;
            for customer in counter.sorted_customers() {
                println!("{}", customer);
            }
        }
        Command::Income { lane } => {
            let counter = open_counter(&config)?;
            match lane {
                Some(index) => println!("Lane {}: {}", index, counter.lane_income(index)?),
                None => {
                    for lane in counter.lanes() {
                        println!("Lane {}: {}", lane.id(), lane.income());
                    }
                    println!("Total: {}", counter.total_income());
                }
            }
        }
        Command::Simulate {
            cycles,
            arrival_rate,
            service_probability,
            seed,
            replications,
            save,
        } => {
            let sim_config = SimulationConfig::new()
                .with_counter(config)
                .with_duration(cycles)
                .with_arrival_rate(arrival_rate)
                .with_service_probability(service_probability)
                .with_random_seed(Some(seed));

            if replications > 1 {
                if save {
                    return Err(CounterError::InvalidConfig(
                        "--save needs a single replication".to_string(),
                    ));
                }
                let seeds: Vec<u64> = (seed..seed.saturating_add(replications)).collect();
                let reports = run_replications(&sim_config, &seeds)?;
                println!("{}", summarize(&reports));
            } else {
                let mut simulation = Simulation::new(sim_config)?;
                let report = simulation.run()?;
                println!("{}", report);
                if save {
                    simulation.into_counter().save_snapshot(&snapshot_path)?;
                    info!("Saved simulated counter to {}", snapshot_path.display());
                }
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_command_with_global_flags() {
        let args = Args::try_parse_from(["queuesim", "empty", "--snapshot", "state.txt"]).unwrap();
        assert!(matches!(args.command, Command::Empty));
        assert_eq!(args.snapshot, Some(PathBuf::from("state.txt")));
    }

    #[test]
    fn test_parse_rejects_unknown_log_level() {
        assert!(Args::try_parse_from(["queuesim", "--log-level", "loud", "show"]).is_err());
    }

    #[test]
    fn test_empty_lists_lanes_from_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = CounterConfig::new()
            .with_lane_layout(vec![1, 2])
            .with_snapshot_path(dir.path().join("programState.txt"));
        let mut counter = ServiceCounter::new(&config).unwrap();
        counter.add_customer(Customer::new("Ada", "Lovelace", 1)).unwrap();
        counter.save_snapshot(&config.snapshot_path).unwrap();

        let reopened = open_counter(&config).unwrap();
        assert_eq!(reopened.lanes_with_space(), vec![1]);
    }
}
