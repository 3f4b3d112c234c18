use super::config::SimulationConfig;
use super::engine::{Simulation, SimulationReport};
use crate::core::errors::CounterResult;
use log::info;
use rayon::prelude::*;

/// Run one simulation per seed in parallel, returning reports in seed order
///
/// Each replication builds its own counter, so nothing is shared between threads.
pub fn run_replications(
    config: &SimulationConfig,
    seeds: &[u64],
) -> CounterResult<Vec<SimulationReport>> {
    config.validate()?;
    info!("Running {} replications", seeds.len());

    seeds
        .par_iter()
        .map(|&seed| {
            let mut simulation = Simulation::new(config.clone().with_random_seed(Some(seed)))?;
            simulation.run()
        })
        .collect()
}

/// Mean figures across a batch of replications
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub mean_served: f64,
    pub mean_turned_away: f64,
    pub mean_income: f64,
    pub mean_stock_stalls: f64,
    pub max_turned_away: u64,
}

pub fn summarize(reports: &[SimulationReport]) -> ReplicationSummary {
    if reports.is_empty() {
        return ReplicationSummary::default();
    }

    let n = reports.len() as f64;
    let mean = |value: fn(&SimulationReport) -> u64| {
        reports.iter().map(value).sum::<u64>() as f64 / n
    };

    ReplicationSummary {
        replications: reports.len(),
        mean_served: mean(|r| r.served),
        mean_turned_away: mean(|r| r.turned_away),
        mean_income: mean(|r| r.total_income),
        mean_stock_stalls: mean(|r| r.stock_stalls),
        max_turned_away: reports.iter().map(|r| r.turned_away).max().unwrap_or(0),
    }
}

impl std::fmt::Display for ReplicationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Replications:        {}", self.replications)?;
        writeln!(f, "Mean served:         {:.2}", self.mean_served)?;
        writeln!(f, "Mean turned away:    {:.2} (max {})", self.mean_turned_away, self.max_turned_away)?;
        writeln!(f, "Mean stock stalls:   {:.2}", self.mean_stock_stalls)?;
        write!(f, "Mean income:         {:.2}", self.mean_income)
    }
}
