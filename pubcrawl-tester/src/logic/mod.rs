pub mod distribution;
pub mod harness;
pub mod reports;
pub mod seeds;
pub mod tester;

pub use distribution::{
    DistributionAggregate, aggregate_distribution, run_distribution_analysis,
    validate_distribution,
};
pub use harness::{CrawlTester, SimulationPlan, SimulationSummary, Step};
pub use seeds::resolve_seed_inputs;
pub use tester::*;
