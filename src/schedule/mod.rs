//! Fund cashflow engine: periods, running state, waterfall, and metrics

mod engine;
mod metrics;
mod period;
mod state;
mod waterfall;

pub use engine::compute_schedule;
pub use metrics::{annualized_irr, net_lp_irr, periodic_irr};
pub use period::{FundSchedule, PeriodRecord, ScheduleSummary};
pub use state::EngineState;
pub use waterfall::{TierAllocation, WaterfallState};
