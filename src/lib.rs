//! Fund Models - cashflow projection engine for closed-end private equity funds
//!
//! This library provides:
//! - Validated, immutable fund configurations (fees, carry, hurdle, deployment pacing)
//! - A pure period-by-period cashflow engine with a tiered distribution waterfall
//! - Pluggable return models (fixed-IRR holding model or explicit proceeds)
//! - Multi-fund scenario runs and flat CSV export for reporting tools

pub mod dates;
pub mod error;
pub mod export;
pub mod fund;
pub mod scenario;
pub mod schedule;

// Re-export commonly used types
pub use error::{ConfigError, DateError, ScheduleError};
pub use fund::{FeeBasis, FeeFunding, FeeStepDown, FundConfig, ReturnModel};
pub use scenario::{ScenarioError, ScenarioRunner};
pub use schedule::{compute_schedule, FundSchedule, PeriodRecord, ScheduleSummary};
