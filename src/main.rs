//! Fund Models CLI
//!
//! Runs a set of demonstration closed-end funds through the cashflow engine
//! and writes the two reporting datasets (fund inputs, fund schedules).

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;

use fund_models::dates::{DayCount, Frequency};
use fund_models::export::{write_fund_inputs, write_fund_schedules, write_fund_summaries};
use fund_models::{FeeBasis, FeeFunding, FundConfig, ReturnModel, ScenarioRunner};

#[derive(Parser)]
#[command(name = "fund_models", version, about = "Closed-end fund cashflow projection")]
struct Cli {
    /// Directory the CSV datasets are written to
    #[arg(long, default_value = "datasets")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let runner = ScenarioRunner::new(demo_funds()?);
    let schedules = runner.run_all()?;

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating output directory {}", cli.output_dir.display()))?;

    let inputs_path = cli.output_dir.join("fund_inputs.csv");
    let schedules_path = cli.output_dir.join("fund_schedules.csv");
    write_fund_inputs(File::create(&inputs_path)?, runner.funds())
        .with_context(|| format!("writing {}", inputs_path.display()))?;
    write_fund_schedules(File::create(&schedules_path)?, &schedules)
        .with_context(|| format!("writing {}", schedules_path.display()))?;
    let summaries_path = cli.output_dir.join("fund_summaries.json");
    write_fund_summaries(File::create(&summaries_path)?, &schedules)
        .with_context(|| format!("writing {}", summaries_path.display()))?;

    println!("Fund Models v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "{:<8} {:>16} {:>16} {:>16} {:>8} {:>8} {:>10}",
        "Fund", "Called", "Distributed", "To LP", "DPI", "TVPI", "Net IRR"
    );
    println!("{}", "-".repeat(88));
    for schedule in &schedules {
        let summary = schedule.summary();
        println!(
            "{:<8} {:>16.0} {:>16.0} {:>16.0} {:>8.3} {:>8.3} {:>10}",
            schedule.fund_name,
            summary.total_called,
            summary.total_distributions,
            summary.total_to_lp,
            summary.dpi,
            summary.tvpi,
            summary
                .net_irr
                .map(|irr| format!("{:.2}%", irr * 100.0))
                .unwrap_or_else(|| "n/a".to_string()),
        );
    }

    println!("\nDatasets written to: {}", cli.output_dir.display());
    Ok(())
}

/// Four demonstration funds with staggered vintages and deployment pacing.
fn demo_funds() -> anyhow::Result<Vec<FundConfig>> {
    let base = FundConfig {
        fund_name: String::new(),
        fund_start: date(2021, 3, 31)?,
        frequency: Frequency::Monthly,
        day_count: DayCount::ActAct,
        committed_capital: 0.0,
        management_fee_rate: 0.005,
        fee_step_down: None,
        fee_basis_investment: FeeBasis::Committed,
        fee_basis_post: FeeBasis::Invested,
        fee_funding: FeeFunding::CalledOnTop,
        expense_rate: 0.0,
        carry_rate: 0.2,
        hurdle_rate: 0.10,
        carry_catch_up: true,
        fund_term_periods: 72,
        investment_period_periods: 36,
        deployment_curve: FundConfig::spaced_curve(36, 3),
        returns: ReturnModel::FixedIrr {
            annual_irr: 0.15,
            holding_periods: 36,
        },
    };

    let funds = vec![
        FundConfig {
            fund_name: "Fund1".to_string(),
            committed_capital: 500_000_000.0,
            ..base.clone()
        },
        FundConfig {
            fund_name: "Fund2".to_string(),
            fund_start: date(2024, 3, 31)?,
            committed_capital: 600_000_000.0,
            ..base.clone()
        },
        // Faster monthly deployment pace, no GP catch-up
        FundConfig {
            fund_name: "Fund3".to_string(),
            fund_start: date(2024, 3, 31)?,
            committed_capital: 200_000_000.0,
            carry_catch_up: false,
            fund_term_periods: 60,
            investment_period_periods: 24,
            deployment_curve: FundConfig::flat_curve(24),
            returns: ReturnModel::FixedIrr {
                annual_irr: 0.12,
                holding_periods: 36,
            },
            ..base.clone()
        },
        FundConfig {
            fund_name: "Fund4".to_string(),
            fund_start: date(2024, 3, 31)?,
            committed_capital: 200_000_000.0,
            carry_catch_up: false,
            fund_term_periods: 60,
            investment_period_periods: 24,
            deployment_curve: FundConfig::flat_curve(24),
            returns: ReturnModel::FixedIrr {
                annual_irr: 0.20,
                holding_periods: 36,
            },
            ..base
        },
    ];

    funds
        .into_iter()
        .map(|f| {
            let name = f.fund_name.clone();
            f.validated()
                .with_context(|| format!("invalid configuration for {}", name))
        })
        .collect()
}

fn date(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid date {year}-{month}-{day}"))
}
