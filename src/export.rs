//! Flat tabular export of fund inputs and schedules
//!
//! Two row layouts mirror the reporting datasets: one row per fund
//! summarising its configuration, and one row per fund per period. Every
//! column is a scalar, so the CSVs load directly into analytical tools.

use std::io::Write;

use serde::Serialize;

use crate::fund::{FeeBasis, FeeFunding, FundConfig, ReturnModel};
use crate::schedule::{FundSchedule, PeriodRecord};

/// One row per fund: the configuration that produced its schedule
#[derive(Debug, Clone, Serialize)]
pub struct FundInputsRow {
    pub fund_name: String,
    pub fund_start: chrono::NaiveDate,
    pub frequency: crate::dates::Frequency,
    pub day_count: crate::dates::DayCount,
    pub committed_capital: f64,
    pub management_fee_rate: f64,
    pub fee_step_down_period: Option<usize>,
    pub fee_step_down_rate: Option<f64>,
    pub fee_basis_investment: FeeBasis,
    pub fee_basis_post: FeeBasis,
    pub fee_funding: FeeFunding,
    pub expense_rate: f64,
    pub carry_rate: f64,
    pub hurdle_rate: f64,
    pub carry_catch_up: bool,
    pub fund_term_periods: usize,
    pub investment_period_periods: usize,
    pub return_annual_irr: Option<f64>,
    pub return_holding_periods: Option<usize>,
}

impl FundInputsRow {
    pub fn from_config(config: &FundConfig) -> Self {
        let (return_annual_irr, return_holding_periods) = match config.returns {
            ReturnModel::FixedIrr {
                annual_irr,
                holding_periods,
            } => (Some(annual_irr), Some(holding_periods)),
            _ => (None, None),
        };
        Self {
            fund_name: config.fund_name.clone(),
            fund_start: config.fund_start,
            frequency: config.frequency,
            day_count: config.day_count,
            committed_capital: config.committed_capital,
            management_fee_rate: config.management_fee_rate,
            fee_step_down_period: config.fee_step_down.map(|s| s.effective_period),
            fee_step_down_rate: config.fee_step_down.map(|s| s.rate),
            fee_basis_investment: config.fee_basis_investment,
            fee_basis_post: config.fee_basis_post,
            fee_funding: config.fee_funding,
            expense_rate: config.expense_rate,
            carry_rate: config.carry_rate,
            hurdle_rate: config.hurdle_rate,
            carry_catch_up: config.carry_catch_up,
            fund_term_periods: config.fund_term_periods,
            investment_period_periods: config.investment_period_periods,
            return_annual_irr,
            return_holding_periods,
        }
    }
}

/// One row per fund per period: a flattened `PeriodRecord`
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRow {
    pub fund_name: String,
    pub period_index: usize,
    pub period_start: chrono::NaiveDate,
    pub period_end: chrono::NaiveDate,
    pub capital_called: f64,
    pub capital_deployed: f64,
    pub unfunded_commitment: f64,
    pub capital_returned: f64,
    pub invested_capital: f64,
    pub nav: f64,
    pub fee_basis: f64,
    pub management_fee: f64,
    pub fund_expenses: f64,
    pub gross_proceeds: f64,
    pub distributions: f64,
    pub return_of_capital: f64,
    pub preferred_return: f64,
    pub gp_catch_up: f64,
    pub carry: f64,
    pub net_to_lp: f64,
    pub net_to_gp: f64,
}

impl ScheduleRow {
    pub fn new(fund_name: &str, record: &PeriodRecord) -> Self {
        Self {
            fund_name: fund_name.to_string(),
            period_index: record.period_index,
            period_start: record.period_start,
            period_end: record.period_end,
            capital_called: record.capital_called,
            capital_deployed: record.capital_deployed,
            unfunded_commitment: record.unfunded_commitment,
            capital_returned: record.capital_returned,
            invested_capital: record.invested_capital,
            nav: record.nav,
            fee_basis: record.fee_basis,
            management_fee: record.management_fee,
            fund_expenses: record.fund_expenses,
            gross_proceeds: record.gross_proceeds,
            distributions: record.distributions,
            return_of_capital: record.return_of_capital,
            preferred_return: record.preferred_return,
            gp_catch_up: record.gp_catch_up,
            carry: record.carry,
            net_to_lp: record.net_to_lp,
            net_to_gp: record.net_to_gp,
        }
    }
}

/// One entry per fund in the JSON summaries artifact
#[derive(Debug, Clone, Serialize)]
pub struct FundSummaryEntry {
    pub fund_name: String,
    #[serde(flatten)]
    pub summary: crate::schedule::ScheduleSummary,
}

/// Write fund-level summaries as pretty-printed JSON, one entry per fund.
pub fn write_fund_summaries<W: Write>(
    writer: W,
    schedules: &[FundSchedule],
) -> serde_json::Result<()> {
    let entries: Vec<FundSummaryEntry> = schedules
        .iter()
        .map(|schedule| FundSummaryEntry {
            fund_name: schedule.fund_name.clone(),
            summary: schedule.summary(),
        })
        .collect();
    serde_json::to_writer_pretty(writer, &entries)
}

/// Write the fund inputs table, one row per configuration.
pub fn write_fund_inputs<W: Write>(writer: W, configs: &[FundConfig]) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for config in configs {
        csv_writer.serialize(FundInputsRow::from_config(config))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write the fund schedules table, one row per fund per period.
pub fn write_fund_schedules<W: Write>(writer: W, schedules: &[FundSchedule]) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for schedule in schedules {
        for record in &schedule.periods {
            csv_writer.serialize(ScheduleRow::new(&schedule.fund_name, record))?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{DayCount, Frequency};
    use crate::schedule::compute_schedule;
    use chrono::NaiveDate;

    fn demo_fund() -> FundConfig {
        FundConfig {
            fund_name: "Export Test".to_string(),
            fund_start: NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
            frequency: Frequency::Monthly,
            day_count: DayCount::ActAct,
            committed_capital: 1_000_000.0,
            management_fee_rate: 0.02,
            fee_step_down: None,
            fee_basis_investment: FeeBasis::Committed,
            fee_basis_post: FeeBasis::Invested,
            fee_funding: FeeFunding::CalledOnTop,
            expense_rate: 0.0,
            carry_rate: 0.2,
            hurdle_rate: 0.08,
            carry_catch_up: true,
            fund_term_periods: 24,
            investment_period_periods: 12,
            deployment_curve: FundConfig::flat_curve(12),
            returns: ReturnModel::FixedIrr {
                annual_irr: 0.15,
                holding_periods: 12,
            },
        }
        .validated()
        .unwrap()
    }

    #[test]
    fn test_inputs_csv_has_one_row_per_fund() {
        let configs = vec![demo_fund(), demo_fund()];
        let mut buffer = Vec::new();
        write_fund_inputs(&mut buffer, &configs).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3); // header + two funds
        assert!(lines[0].starts_with("fund_name,fund_start,frequency"));
        assert!(lines[1].contains("Export Test"));
    }

    #[test]
    fn test_summaries_json_keyed_by_fund() {
        let config = demo_fund();
        let schedule = compute_schedule(&config).unwrap();
        let mut buffer = Vec::new();
        write_fund_summaries(&mut buffer, std::slice::from_ref(&schedule)).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let entries = parsed.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["fund_name"], "Export Test");
        assert!(entries[0]["dpi"].is_number());
        assert_eq!(
            entries[0]["total_periods"].as_u64().unwrap() as usize,
            config.fund_term_periods
        );
    }

    #[test]
    fn test_schedules_csv_has_one_row_per_period() {
        let config = demo_fund();
        let schedule = compute_schedule(&config).unwrap();
        let mut buffer = Vec::new();
        write_fund_schedules(&mut buffer, std::slice::from_ref(&schedule)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        // header + one row per period
        assert_eq!(text.lines().count(), config.fund_term_periods + 1);
        let header = text.lines().next().unwrap();
        assert!(header.contains("capital_called"));
        assert!(header.contains("net_to_lp"));
    }
}
