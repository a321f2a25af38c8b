//! Return-generation hook for the cashflow engine
//!
//! The engine consumes realisations as opaque per-period series, so a future
//! per-asset model can be substituted without touching the waterfall logic.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fund::config::FundConfig;

/// Timing and amount of realisations for a fund's deployments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReturnModel {
    /// No realisations within the modeled term
    None,
    /// Each deployment is held for a fixed number of periods and realised as
    /// a single proceed equal to its future value at the periodic rate
    /// derived from the annual effective IRR.
    FixedIrr {
        annual_irr: f64,
        holding_periods: usize,
    },
    /// Caller-supplied gross proceeds, one entry per period. The
    /// capital-return portion of each proceed is the lesser of the proceed
    /// and outstanding invested capital.
    Explicit(Vec<f64>),
}

impl ReturnModel {
    pub(crate) fn validate(
        &self,
        investment_periods: usize,
        term_periods: usize,
    ) -> Result<(), ConfigError> {
        match self {
            ReturnModel::None => Ok(()),
            ReturnModel::FixedIrr {
                annual_irr,
                holding_periods,
            } => {
                if *annual_irr <= -1.0 {
                    return Err(ConfigError::IrrBelowFloor(*annual_irr));
                }
                if *holding_periods == 0 {
                    return Err(ConfigError::EmptyHoldingPeriod);
                }
                let matures = investment_periods + holding_periods;
                if matures > term_periods {
                    return Err(ConfigError::ReturnsBeyondTerm {
                        matures,
                        term_periods,
                    });
                }
                Ok(())
            }
            ReturnModel::Explicit(series) => {
                if series.len() != term_periods {
                    return Err(ConfigError::ReturnsLength {
                        actual: series.len(),
                        expected: term_periods,
                    });
                }
                for (index, &value) in series.iter().enumerate() {
                    if value < 0.0 {
                        return Err(ConfigError::NegativeProceedsEntry { index, value });
                    }
                }
                Ok(())
            }
        }
    }
}

/// Expanded per-period return series for one fund
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnFlows {
    /// Gross cash realised in each period
    pub proceeds: Vec<f64>,
    /// Portion of each proceed that is a return of deployed capital
    pub capital_returns: Vec<f64>,
    /// End-of-period marked value of outstanding deployments
    pub nav: Vec<f64>,
}

impl ReturnFlows {
    /// Expand the configuration's return model into per-period series.
    ///
    /// Assumes the configuration has already passed validation; the series
    /// all have `fund_term_periods` entries.
    pub fn generate(config: &FundConfig) -> Self {
        let term = config.fund_term_periods;
        let deployments: Vec<f64> = (0..term)
            .map(|i| {
                if config.in_investment_period(i) {
                    config.committed_capital * config.deployment_curve[i]
                } else {
                    0.0
                }
            })
            .collect();

        match &config.returns {
            ReturnModel::None => {
                let mut nav = vec![0.0; term];
                let mut invested = 0.0;
                for i in 0..term {
                    invested += deployments[i];
                    nav[i] = invested;
                }
                Self {
                    proceeds: vec![0.0; term],
                    capital_returns: vec![0.0; term],
                    nav,
                }
            }
            ReturnModel::FixedIrr {
                annual_irr,
                holding_periods,
            } => {
                let rate = periodic_rate(*annual_irr, config.frequency.periods_per_year());
                let mut proceeds = vec![0.0; term];
                let mut capital_returns = vec![0.0; term];
                let mut nav = vec![0.0; term];
                for (j, &deployed) in deployments.iter().enumerate() {
                    if deployed == 0.0 {
                        continue;
                    }
                    let maturity = j + holding_periods;
                    capital_returns[maturity] += deployed;
                    proceeds[maturity] += deployed * (1.0 + rate).powi(*holding_periods as i32);
                    // Outstanding between deployment and realisation, marked
                    // at the model's periodic rate
                    for (i, slot) in nav.iter_mut().enumerate().take(maturity).skip(j) {
                        *slot += deployed * (1.0 + rate).powi((i - j) as i32);
                    }
                }
                Self {
                    proceeds,
                    capital_returns,
                    nav,
                }
            }
            ReturnModel::Explicit(series) => {
                let mut capital_returns = vec![0.0; term];
                let mut nav = vec![0.0; term];
                let mut invested = 0.0;
                for i in 0..term {
                    invested += deployments[i];
                    let returned = series[i].min(invested);
                    capital_returns[i] = returned;
                    invested -= returned;
                    nav[i] = invested;
                }
                Self {
                    proceeds: series.clone(),
                    capital_returns,
                    nav,
                }
            }
        }
    }
}

/// Periodic rate equivalent to an annual effective rate.
pub fn periodic_rate(annual_rate: f64, periods_per_year: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / periods_per_year) - 1.0
}
