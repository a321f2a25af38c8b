//! Running balances carried across the period loop
//!
//! Within one `compute_schedule` call the period loop is the only sequential
//! state; these balances capture it completely. Nothing is retained between
//! invocations.

use crate::fund::FundConfig;

/// Engine balances at the end of the most recent period
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Committed capital not yet drawn for deployments
    pub unfunded_commitment: f64,

    /// Deployed capital not yet returned
    pub invested_capital: f64,

    /// Total capital called from LPs so far
    pub cumulative_called: f64,

    /// Total capital deployed so far
    pub cumulative_deployed: f64,

    /// Total cash distributed through the waterfall so far
    pub cumulative_distributions: f64,

    /// Accrued fees and expenses not yet paid (only nonzero when fees are
    /// netted from distributions)
    pub fee_receivable: f64,
}

impl EngineState {
    /// Initial balances: nothing called, deployed, or distributed
    pub fn new(config: &FundConfig) -> Self {
        Self {
            unfunded_commitment: config.committed_capital,
            invested_capital: 0.0,
            cumulative_called: 0.0,
            cumulative_deployed: 0.0,
            cumulative_distributions: 0.0,
            fee_receivable: 0.0,
        }
    }
}
