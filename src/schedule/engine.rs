//! Core cashflow engine: one pure pass from configuration to schedule

use log::warn;

use crate::dates::{period_end_date, period_start_date, year_fraction};
use crate::error::{ConfigError, ScheduleError};
use crate::fund::{FeeBasis, FeeFunding, FundConfig, ReturnFlows, ReturnModel, CURVE_TOLERANCE};
use crate::schedule::period::{FundSchedule, PeriodRecord};
use crate::schedule::state::EngineState;
use crate::schedule::waterfall::WaterfallState;

/// Compute the full period-by-period schedule for one fund.
///
/// Deterministic and side-effect-free: equal configurations produce
/// structurally identical schedules, and the configuration is never mutated.
/// Value-level defects in a configuration that bypassed
/// [`FundConfig::validated`] surface as `OverCall` or `NegativeBalance` at
/// the offending period rather than silently producing nonsensical output.
pub fn compute_schedule(config: &FundConfig) -> Result<FundSchedule, ScheduleError> {
    check_structure(config)?;

    let flows = ReturnFlows::generate(config);
    // Balances are tolerance-floored in proportion to fund size; the curve
    // itself is only required to sum to 1.0 within CURVE_TOLERANCE.
    let tolerance = config.committed_capital * CURVE_TOLERANCE;

    let mut state = EngineState::new(config);
    let mut waterfall = WaterfallState::new();
    let mut schedule = FundSchedule::new(config.fund_name.clone(), config.frequency);

    for i in 0..config.fund_term_periods {
        let start = period_start_date(config.fund_start, i, config.frequency);
        let end = period_end_date(config.fund_start, i, config.frequency);
        let yf = year_fraction(start, end, config.day_count);

        // Hurdle accrues on opening balances; this period's call starts
        // accruing next period.
        waterfall.accrue_preferred((1.0 + config.hurdle_rate).powf(yf) - 1.0);

        // Deployment and capital returns
        let deployed = if config.in_investment_period(i) {
            config.committed_capital * config.deployment_curve[i]
        } else {
            0.0
        };
        let returned = flows.capital_returns[i];
        let invested = state.invested_capital + deployed - returned;
        if invested < -tolerance {
            return Err(ScheduleError::NegativeBalance {
                period: i,
                balance: "invested_capital",
                value: invested,
            });
        }
        let invested = invested.max(0.0);

        // Management fee and fund expenses
        let basis_kind = if config.in_investment_period(i) {
            config.fee_basis_investment
        } else {
            config.fee_basis_post
        };
        let fee_basis = match basis_kind {
            FeeBasis::Committed => config.committed_capital,
            FeeBasis::Invested => invested,
            FeeBasis::Nav => flows.nav[i],
        };
        let management_fee = fee_basis * config.fee_rate_at(i) * yf;
        let fund_expenses = config.committed_capital * config.expense_rate * yf;

        // Capital call; only the deployed portion draws down the commitment
        let called = match config.fee_funding {
            FeeFunding::CalledOnTop => deployed + management_fee + fund_expenses,
            FeeFunding::NettedFromDistributions => deployed,
        };
        let excess = deployed - state.unfunded_commitment;
        if excess > tolerance {
            return Err(ScheduleError::OverCall { period: i, excess });
        }
        state.unfunded_commitment = (state.unfunded_commitment - deployed).max(0.0);
        state.cumulative_called += called;
        state.cumulative_deployed += deployed;
        state.invested_capital = invested;
        waterfall.on_capital_called(called);

        // Distributable cash: gross proceeds, net of any fee receivable
        // under the netted convention
        let gross_proceeds = flows.proceeds[i];
        let mut distributable = gross_proceeds;
        if config.fee_funding == FeeFunding::NettedFromDistributions {
            state.fee_receivable += management_fee + fund_expenses;
            let paid = distributable.min(state.fee_receivable);
            state.fee_receivable -= paid;
            distributable -= paid;
        }

        let allocation = waterfall.distribute(distributable, config.carry_rate, config.carry_catch_up);
        state.cumulative_distributions += allocation.total();

        let mut record = PeriodRecord::new(i, start, end);
        record.capital_called = called;
        record.capital_deployed = deployed;
        record.unfunded_commitment = state.unfunded_commitment;
        record.capital_returned = returned;
        record.invested_capital = invested;
        record.nav = flows.nav[i];
        record.fee_basis = fee_basis;
        record.management_fee = management_fee;
        record.fund_expenses = fund_expenses;
        record.gross_proceeds = gross_proceeds;
        record.distributions = allocation.total();
        record.return_of_capital = allocation.return_of_capital;
        record.preferred_return = allocation.preferred_return;
        record.gp_catch_up = allocation.gp_catch_up;
        record.carry = allocation.carry;
        record.net_to_lp = allocation.to_lp();
        record.net_to_gp = allocation.to_gp();
        schedule.add_period(record);
    }

    // Consistency check, not a hard error: a residual unfunded commitment
    // indicates the deployment curve never drew the full commitment.
    if state.unfunded_commitment > tolerance {
        warn!(
            "fund '{}': {:.2} of committed capital remains unfunded at end of term",
            config.fund_name, state.unfunded_commitment
        );
    }

    Ok(schedule)
}

/// Structural prerequisites of the period loop. Full invariant checking
/// belongs to `FundConfig::validate`; these only rule out the shapes that
/// would make the loop itself ill-defined.
fn check_structure(config: &FundConfig) -> Result<(), ConfigError> {
    if config.fund_term_periods == 0 {
        return Err(ConfigError::EmptyTerm);
    }
    if config.investment_period_periods > config.fund_term_periods {
        return Err(ConfigError::InvestmentPeriodTooLong {
            investment_periods: config.investment_period_periods,
            term_periods: config.fund_term_periods,
        });
    }
    if config.deployment_curve.len() != config.investment_period_periods {
        return Err(ConfigError::CurveLength {
            actual: config.deployment_curve.len(),
            expected: config.investment_period_periods,
        });
    }
    match &config.returns {
        ReturnModel::Explicit(series) if series.len() != config.fund_term_periods => {
            Err(ConfigError::ReturnsLength {
                actual: series.len(),
                expected: config.fund_term_periods,
            })
        }
        ReturnModel::FixedIrr {
            holding_periods, ..
        } if config.investment_period_periods + holding_periods > config.fund_term_periods => {
            Err(ConfigError::ReturnsBeyondTerm {
                matures: config.investment_period_periods + holding_periods,
                term_periods: config.fund_term_periods,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{DayCount, Frequency};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::NaiveDate;

    fn base_config() -> FundConfig {
        FundConfig {
            fund_name: "Engine Test".to_string(),
            fund_start: NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
            frequency: Frequency::Monthly,
            day_count: DayCount::ActAct,
            committed_capital: 100.0,
            management_fee_rate: 0.02,
            fee_step_down: None,
            fee_basis_investment: FeeBasis::Committed,
            fee_basis_post: FeeBasis::Invested,
            fee_funding: FeeFunding::CalledOnTop,
            expense_rate: 0.0,
            carry_rate: 0.2,
            hurdle_rate: 0.08,
            carry_catch_up: true,
            fund_term_periods: 12,
            investment_period_periods: 4,
            deployment_curve: FundConfig::flat_curve(4),
            returns: ReturnModel::None,
        }
    }

    fn realistic_config() -> FundConfig {
        FundConfig {
            fund_name: "Realistic".to_string(),
            committed_capital: 500_000_000.0,
            management_fee_rate: 0.005,
            hurdle_rate: 0.10,
            fund_term_periods: 72,
            investment_period_periods: 36,
            deployment_curve: FundConfig::spaced_curve(36, 3),
            returns: ReturnModel::FixedIrr {
                annual_irr: 0.15,
                holding_periods: 36,
            },
            ..base_config()
        }
        .validated()
        .unwrap()
    }

    #[test]
    fn test_flat_curve_fees_called_on_top() {
        // 100 committed, flat curve over 4 months, 2% fee on committed
        // capital: 25 deployed per month, fee on top of the call.
        let config = base_config().validated().unwrap();
        let schedule = compute_schedule(&config).unwrap();

        let mut total_fees = 0.0;
        for i in 0..4 {
            let p = &schedule.periods[i];
            let yf = year_fraction(p.period_start, p.period_end, DayCount::ActAct);
            assert_relative_eq!(p.capital_deployed, 25.0);
            assert_relative_eq!(p.management_fee, 100.0 * 0.02 * yf, epsilon = 1e-12);
            assert_relative_eq!(p.capital_called, 25.0 + p.management_fee, epsilon = 1e-12);
            total_fees += p.management_fee;
        }

        let called: f64 = schedule.periods[..4].iter().map(|p| p.capital_called).sum();
        assert_relative_eq!(called, 100.0 + total_fees, epsilon = 1e-9);

        // Commitment is exhausted by deployments alone
        assert_abs_diff_eq!(schedule.periods[3].unfunded_commitment, 0.0, epsilon = 1e-9);

        // Post-investment fee basis switches to invested capital
        let p4 = &schedule.periods[4];
        assert_relative_eq!(p4.fee_basis, p4.invested_capital);
    }

    #[test]
    fn test_determinism() {
        let config = realistic_config();
        let first = compute_schedule(&config).unwrap();
        let second = compute_schedule(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_conservation_and_non_negativity() {
        let config = realistic_config();
        let schedule = compute_schedule(&config).unwrap();

        let mut cumulative_deployed = 0.0;
        for p in &schedule.periods {
            cumulative_deployed += p.capital_deployed;
            assert!(cumulative_deployed <= config.committed_capital * (1.0 + 1e-9));
            assert!(p.unfunded_commitment >= 0.0, "period {}", p.period_index);
            assert!(p.invested_capital >= 0.0, "period {}", p.period_index);
        }

        // All deployed capital comes back under the fixed-IRR model
        let total_returned: f64 = schedule.periods.iter().map(|p| p.capital_returned).sum();
        assert_relative_eq!(total_returned, config.committed_capital, epsilon = 1.0);
        assert_abs_diff_eq!(
            schedule.periods.last().unwrap().invested_capital,
            0.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_waterfall_ordering_over_fund_life() {
        let config = realistic_config();
        let schedule = compute_schedule(&config).unwrap();

        let mut cumulative_called = 0.0;
        let mut cumulative_distributed = 0.0;
        let mut catch_up_complete = false;
        for p in &schedule.periods {
            cumulative_called += p.capital_called;
            // No preferred return before return of capital is complete
            if p.preferred_return > 0.0 {
                assert!(
                    cumulative_distributed + p.return_of_capital >= cumulative_called - 1e-3,
                    "preferred paid before capital returned at period {}",
                    p.period_index
                );
            }
            // No residual carry before catch-up completes
            if p.carry > 0.0 {
                catch_up_complete = true;
            }
            if !catch_up_complete {
                assert_abs_diff_eq!(p.carry, 0.0);
            }
            cumulative_distributed += p.distributions;
        }

        // The fund is profitable enough that carry is eventually paid
        assert!(catch_up_complete);

        // GP cumulative share of profit tiers equals the carry rate once the
        // residual tier has been reached
        let total_pref: f64 = schedule.periods.iter().map(|p| p.preferred_return).sum();
        let total_catch_up: f64 = schedule.periods.iter().map(|p| p.gp_catch_up).sum();
        assert_relative_eq!(
            total_catch_up / (total_pref + total_catch_up),
            config.carry_rate,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_over_call_fails_at_offending_period() {
        // Curve defect that bypassed validation: second call exceeds the
        // remaining commitment.
        let config = FundConfig {
            investment_period_periods: 2,
            deployment_curve: vec![0.5, 0.6],
            ..base_config()
        };
        match compute_schedule(&config) {
            Err(ScheduleError::OverCall { period, excess }) => {
                assert_eq!(period, 1);
                assert_relative_eq!(excess, 10.0, epsilon = 1e-9);
            }
            other => panic!("expected OverCall, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_balance_fails_fast() {
        // A negative deployment would drive invested capital below zero.
        let config = FundConfig {
            investment_period_periods: 2,
            deployment_curve: vec![-0.5, 1.5],
            ..base_config()
        };
        match compute_schedule(&config) {
            Err(ScheduleError::NegativeBalance {
                period, balance, ..
            }) => {
                assert_eq!(period, 0);
                assert_eq!(balance, "invested_capital");
            }
            other => panic!("expected NegativeBalance, got {:?}", other),
        }
    }

    #[test]
    fn test_residual_unfunded_commitment_is_not_an_error() {
        // Curve drawing only 60% of the commitment (bypassed validation):
        // the engine completes and reports the residual.
        let config = FundConfig {
            investment_period_periods: 2,
            deployment_curve: vec![0.3, 0.3],
            ..base_config()
        };
        let schedule = compute_schedule(&config).unwrap();
        assert_relative_eq!(
            schedule.periods.last().unwrap().unfunded_commitment,
            40.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_fees_netted_from_distributions() {
        let config = FundConfig {
            fee_funding: FeeFunding::NettedFromDistributions,
            fund_term_periods: 12,
            investment_period_periods: 2,
            deployment_curve: FundConfig::flat_curve(2),
            returns: ReturnModel::FixedIrr {
                annual_irr: 0.12,
                holding_periods: 6,
            },
            ..base_config()
        }
        .validated()
        .unwrap();
        let schedule = compute_schedule(&config).unwrap();

        // Calls fund deployments only
        for p in &schedule.periods {
            assert_relative_eq!(p.capital_called, p.capital_deployed);
        }

        // Fees come out of proceeds before the waterfall
        let total_fees: f64 = schedule.periods.iter().map(|p| p.management_fee).sum();
        let total_proceeds: f64 = schedule.periods.iter().map(|p| p.gross_proceeds).sum();
        let total_distributed: f64 = schedule.periods.iter().map(|p| p.distributions).sum();
        // Fees accrued after the last proceed stay receivable, so compare
        // against fees accrued up to the final realisation
        let last_proceed = schedule
            .periods
            .iter()
            .rposition(|p| p.gross_proceeds > 0.0)
            .unwrap();
        let fees_before: f64 = schedule.periods[..=last_proceed]
            .iter()
            .map(|p| p.management_fee)
            .sum();
        assert_relative_eq!(total_distributed, total_proceeds - fees_before, epsilon = 1e-9);
        assert!(total_fees >= fees_before);
    }

    #[test]
    fn test_fee_step_down_applies_from_effective_period() {
        let config = FundConfig {
            fee_step_down: Some(crate::fund::FeeStepDown {
                effective_period: 4,
                rate: 0.01,
            }),
            fee_basis_post: FeeBasis::Committed,
            ..base_config()
        }
        .validated()
        .unwrap();
        let schedule = compute_schedule(&config).unwrap();

        let p3 = &schedule.periods[3];
        let p4 = &schedule.periods[4];
        let yf3 = year_fraction(p3.period_start, p3.period_end, DayCount::ActAct);
        let yf4 = year_fraction(p4.period_start, p4.period_end, DayCount::ActAct);
        assert_relative_eq!(p3.management_fee, 100.0 * 0.02 * yf3, epsilon = 1e-12);
        assert_relative_eq!(p4.management_fee, 100.0 * 0.01 * yf4, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_returns_drive_the_waterfall() {
        let mut proceeds = vec![0.0; 12];
        proceeds[6] = 90.0;
        proceeds[8] = 40.0;
        let config = FundConfig {
            management_fee_rate: 0.0,
            returns: ReturnModel::Explicit(proceeds),
            ..base_config()
        }
        .validated()
        .unwrap();
        let schedule = compute_schedule(&config).unwrap();

        // Period 6: all return of capital (called capital is 100)
        let p6 = &schedule.periods[6];
        assert_relative_eq!(p6.return_of_capital, 90.0);
        assert_relative_eq!(p6.preferred_return, 0.0);

        // Period 8: remaining capital, then preferred, then profit tiers
        let p8 = &schedule.periods[8];
        assert_relative_eq!(p8.return_of_capital, 10.0);
        assert!(p8.preferred_return > 0.0);
        assert_relative_eq!(p8.distributions, 40.0);
    }

    #[test]
    fn test_structural_defects_reported_as_config_errors() {
        let config = FundConfig {
            deployment_curve: FundConfig::flat_curve(3),
            ..base_config()
        };
        assert!(matches!(
            compute_schedule(&config),
            Err(ScheduleError::Config(ConfigError::CurveLength { .. }))
        ));
    }
}
