//! Fund configuration: one fund's assumptions, validated at construction
//!
//! A `FundConfig` is never mutated after validation. What-if variants are
//! built with struct-update syntax and re-validated, so any schedule is
//! reproducible from its originating configuration alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{DayCount, Frequency};
use crate::error::ConfigError;
use crate::fund::returns::ReturnModel;

/// Tolerance for the deployment curve summing to 1.0
pub const CURVE_TOLERANCE: f64 = 1e-6;

/// Basis the management fee rate is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeBasis {
    /// Total committed capital
    Committed,
    /// Closing invested capital for the period
    Invested,
    /// Marked value of outstanding deployments
    Nav,
}

/// How management fees and fund expenses are funded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeFunding {
    /// Fees are called from LPs on top of the commitment. Calls fund both
    /// deployments and fees, but only the deployed portion draws down the
    /// unfunded commitment.
    CalledOnTop,
    /// Calls fund deployments only; accrued fees are paid out of gross
    /// proceeds before any distribution reaches the waterfall.
    NettedFromDistributions,
}

/// Management fee rate change taking effect at a defined period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeStepDown {
    /// First period index the stepped rate applies to
    pub effective_period: usize,
    /// Annual rate from that period onward
    pub rate: f64,
}

/// Immutable record of a single fund's assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundConfig {
    /// Fund identifier, keys the export tables
    pub fund_name: String,

    /// The fund's first period falls in the month of this date
    pub fund_start: NaiveDate,

    /// Period length of the schedule
    pub frequency: Frequency,

    /// Day-count convention for fee and hurdle accrual
    pub day_count: DayCount,

    /// Total capital committed by limited partners
    pub committed_capital: f64,

    /// Annual management fee rate
    pub management_fee_rate: f64,

    /// Optional fee rate change (e.g. post-investment-period step-down)
    pub fee_step_down: Option<FeeStepDown>,

    /// Fee basis during the investment period
    pub fee_basis_investment: FeeBasis,

    /// Fee basis after the investment period
    pub fee_basis_post: FeeBasis,

    /// Fee funding convention
    pub fee_funding: FeeFunding,

    /// Annual fund expense rate, accrued on committed capital
    pub expense_rate: f64,

    /// GP share of profit above the hurdle
    pub carry_rate: f64,

    /// Annual preferred return threshold for LPs
    pub hurdle_rate: f64,

    /// Whether the GP catch-up tier applies
    pub carry_catch_up: bool,

    /// Total number of periods the fund is modeled over
    pub fund_term_periods: usize,

    /// Number of periods during which new deployments occur
    pub investment_period_periods: usize,

    /// Per-period deployment fractions, one per investment period,
    /// non-negative and summing to 1.0 within `CURVE_TOLERANCE`
    pub deployment_curve: Vec<f64>,

    /// Return-generation hook supplying realisation timing and amounts
    pub returns: ReturnModel,
}

impl FundConfig {
    /// Validating factory: consumes the raw assumptions and returns them
    /// unchanged if every invariant holds.
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    /// Check every construction invariant, naming the specific violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.committed_capital > 0.0) {
            return Err(ConfigError::NonPositiveCommitment(self.committed_capital));
        }
        check_rate("management fee rate", self.management_fee_rate)?;
        check_rate("expense rate", self.expense_rate)?;
        check_rate("carry rate", self.carry_rate)?;
        check_rate("hurdle rate", self.hurdle_rate)?;
        if let Some(step) = self.fee_step_down {
            check_rate("stepped fee rate", step.rate)?;
            if step.effective_period >= self.fund_term_periods {
                return Err(ConfigError::StepDownBeyondTerm {
                    effective_period: step.effective_period,
                    term_periods: self.fund_term_periods,
                });
            }
        }

        if self.fund_term_periods == 0 {
            return Err(ConfigError::EmptyTerm);
        }
        if self.investment_period_periods > self.fund_term_periods {
            return Err(ConfigError::InvestmentPeriodTooLong {
                investment_periods: self.investment_period_periods,
                term_periods: self.fund_term_periods,
            });
        }

        if self.deployment_curve.len() != self.investment_period_periods {
            return Err(ConfigError::CurveLength {
                actual: self.deployment_curve.len(),
                expected: self.investment_period_periods,
            });
        }
        for (index, &value) in self.deployment_curve.iter().enumerate() {
            if value < 0.0 {
                return Err(ConfigError::NegativeCurveEntry { index, value });
            }
        }
        let sum: f64 = self.deployment_curve.iter().sum();
        if (sum - 1.0).abs() > CURVE_TOLERANCE {
            return Err(ConfigError::CurveSum {
                sum,
                tolerance: CURVE_TOLERANCE,
            });
        }

        self.returns
            .validate(self.investment_period_periods, self.fund_term_periods)
    }

    /// Whether period `index` falls inside the investment period.
    pub fn in_investment_period(&self, index: usize) -> bool {
        index < self.investment_period_periods
    }

    /// Annual management fee rate applicable at period `index`.
    pub fn fee_rate_at(&self, index: usize) -> f64 {
        match self.fee_step_down {
            Some(step) if index >= step.effective_period => step.rate,
            _ => self.management_fee_rate,
        }
    }

    /// Even deployment curve over `periods` periods.
    pub fn flat_curve(periods: usize) -> Vec<f64> {
        vec![1.0 / periods as f64; periods]
    }

    /// Deployment curve with equal tranches every `spacing` periods,
    /// starting at period 0 (e.g. quarterly deployments on a monthly
    /// schedule). `periods` must be a whole multiple of `spacing`.
    pub fn spaced_curve(periods: usize, spacing: usize) -> Vec<f64> {
        let tranches = periods / spacing;
        let mut curve = vec![0.0; periods];
        for t in 0..tranches {
            curve[t * spacing] = 1.0 / tranches as f64;
        }
        curve
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::RateOutOfRange { name, value });
    }
    Ok(())
}
