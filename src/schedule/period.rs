//! Schedule output structures: one flat record per period
//!
//! Every field is a scalar so downstream consumers can flatten a schedule
//! into row-oriented tables without unnesting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::Frequency;
use crate::schedule::metrics;

/// All cash movements and running balances for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    // Timing
    pub period_index: usize,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,

    // Calls and deployments
    pub capital_called: f64,
    pub capital_deployed: f64,
    pub unfunded_commitment: f64,

    // Running balances
    pub capital_returned: f64,
    pub invested_capital: f64,
    pub nav: f64,

    // Fees
    pub fee_basis: f64,
    pub management_fee: f64,
    pub fund_expenses: f64,

    // Distributions and waterfall tiers
    pub gross_proceeds: f64,
    pub distributions: f64,
    pub return_of_capital: f64,
    pub preferred_return: f64,
    pub gp_catch_up: f64,
    pub carry: f64,

    // Net splits
    pub net_to_lp: f64,
    pub net_to_gp: f64,
}

impl PeriodRecord {
    /// Create a record for one period with all amounts zeroed
    pub fn new(period_index: usize, period_start: NaiveDate, period_end: NaiveDate) -> Self {
        Self {
            period_index,
            period_start,
            period_end,
            capital_called: 0.0,
            capital_deployed: 0.0,
            unfunded_commitment: 0.0,
            capital_returned: 0.0,
            invested_capital: 0.0,
            nav: 0.0,
            fee_basis: 0.0,
            management_fee: 0.0,
            fund_expenses: 0.0,
            gross_proceeds: 0.0,
            distributions: 0.0,
            return_of_capital: 0.0,
            preferred_return: 0.0,
            gp_catch_up: 0.0,
            carry: 0.0,
            net_to_lp: 0.0,
            net_to_gp: 0.0,
        }
    }
}

/// The full ordered schedule for one fund configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundSchedule {
    pub fund_name: String,
    pub frequency: Frequency,
    pub periods: Vec<PeriodRecord>,
}

impl FundSchedule {
    pub fn new(fund_name: impl Into<String>, frequency: Frequency) -> Self {
        Self {
            fund_name: fund_name.into(),
            frequency,
            periods: Vec::new(),
        }
    }

    pub fn add_period(&mut self, record: PeriodRecord) {
        self.periods.push(record);
    }

    /// Summary statistics across the whole schedule
    pub fn summary(&self) -> ScheduleSummary {
        let total_called: f64 = self.periods.iter().map(|p| p.capital_called).sum();
        let total_deployed: f64 = self.periods.iter().map(|p| p.capital_deployed).sum();
        let total_management_fees: f64 = self.periods.iter().map(|p| p.management_fee).sum();
        let total_expenses: f64 = self.periods.iter().map(|p| p.fund_expenses).sum();
        let total_distributions: f64 = self.periods.iter().map(|p| p.distributions).sum();
        let total_to_lp: f64 = self.periods.iter().map(|p| p.net_to_lp).sum();
        let total_to_gp: f64 = self.periods.iter().map(|p| p.net_to_gp).sum();
        let total_carry: f64 = self.periods.iter().map(|p| p.carry).sum();
        let terminal_nav = self.periods.last().map(|p| p.nav).unwrap_or(0.0);

        let dpi = if total_called > 0.0 {
            total_to_lp / total_called
        } else {
            0.0
        };
        let tvpi = if total_called > 0.0 {
            (total_to_lp + terminal_nav) / total_called
        } else {
            0.0
        };

        ScheduleSummary {
            total_periods: self.periods.len(),
            total_called,
            total_deployed,
            total_management_fees,
            total_expenses,
            total_distributions,
            total_to_lp,
            total_to_gp,
            total_carry,
            terminal_nav,
            dpi,
            tvpi,
            net_irr: metrics::net_lp_irr(self),
        }
    }
}

/// Fund-level totals and multiples derived from a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_periods: usize,
    pub total_called: f64,
    pub total_deployed: f64,
    pub total_management_fees: f64,
    pub total_expenses: f64,
    pub total_distributions: f64,
    pub total_to_lp: f64,
    pub total_to_gp: f64,
    pub total_carry: f64,
    pub terminal_nav: f64,
    /// LP distributions over LP contributions
    pub dpi: f64,
    /// LP distributions plus terminal NAV over LP contributions
    pub tvpi: f64,
    /// Annualised net IRR of the LP cashflow series, if one exists
    pub net_irr: Option<f64>,
}
