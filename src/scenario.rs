//! Scenario runner for multi-fund projections
//!
//! Holds a set of fund configurations and drives the engine once per fund.
//! Schedules are independent, so funds run in parallel; the period loop
//! inside each schedule stays strictly sequential.

use log::debug;
use rayon::prelude::*;
use thiserror::Error;

use crate::error::ScheduleError;
use crate::fund::FundConfig;
use crate::schedule::{compute_schedule, FundSchedule};

/// A schedule computation failure, tagged with the fund that produced it
#[derive(Debug, Clone, PartialEq, Error)]
#[error("fund '{fund}' failed to compute")]
pub struct ScenarioError {
    pub fund: String,
    #[source]
    pub source: ScheduleError,
}

/// Runs the cashflow engine across a set of fund configurations
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    funds: Vec<FundConfig>,
}

impl ScenarioRunner {
    pub fn new(funds: Vec<FundConfig>) -> Self {
        Self { funds }
    }

    /// Add a fund to the scenario
    pub fn push(&mut self, config: FundConfig) {
        self.funds.push(config);
    }

    /// The configurations in this scenario
    pub fn funds(&self) -> &[FundConfig] {
        &self.funds
    }

    /// Compute every fund's schedule, in parallel across funds.
    ///
    /// Fails on the first fund whose schedule cannot be computed, tagging
    /// the error with the fund name.
    pub fn run_all(&self) -> Result<Vec<FundSchedule>, ScenarioError> {
        self.funds
            .par_iter()
            .map(|config| {
                debug!("computing schedule for fund '{}'", config.fund_name);
                compute_schedule(config).map_err(|source| ScenarioError {
                    fund: config.fund_name.clone(),
                    source,
                })
            })
            .collect()
    }
}
