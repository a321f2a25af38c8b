//! Error types for configuration validation and schedule computation

use chrono::NaiveDate;
use thiserror::Error;

/// Errors from the date/period utilities
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DateError {
    #[error("end date {end} precedes start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Invalid or inconsistent fund assumptions, detected at construction.
///
/// Each variant names the violated invariant and the offending value so the
/// caller can correct the assumptions and recompute.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("committed capital must be positive, got {0}")]
    NonPositiveCommitment(f64),

    #[error("{name} must lie within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },

    #[error("fund term must cover at least one period")]
    EmptyTerm,

    #[error("investment period ({investment_periods} periods) exceeds fund term ({term_periods} periods)")]
    InvestmentPeriodTooLong {
        investment_periods: usize,
        term_periods: usize,
    },

    #[error("deployment curve has {actual} entries, expected {expected} (one per investment period)")]
    CurveLength { actual: usize, expected: usize },

    #[error("deployment curve entry {index} is negative ({value})")]
    NegativeCurveEntry { index: usize, value: f64 },

    #[error("deployment curve sums to {sum:.6}, expected 1.0 within ±{tolerance:e}")]
    CurveSum { sum: f64, tolerance: f64 },

    #[error("fee step-down takes effect at period {effective_period}, beyond fund term of {term_periods} periods")]
    StepDownBeyondTerm {
        effective_period: usize,
        term_periods: usize,
    },

    #[error("return model annual irr must exceed -1.0, got {0}")]
    IrrBelowFloor(f64),

    #[error("return model holding period must cover at least one period")]
    EmptyHoldingPeriod,

    #[error("return model matures at period {matures}, beyond fund term of {term_periods} periods")]
    ReturnsBeyondTerm { matures: usize, term_periods: usize },

    #[error("explicit proceeds series has {actual} entries, expected {expected} (one per period)")]
    ReturnsLength { actual: usize, expected: usize },

    #[error("explicit proceeds entry {index} is negative ({value})")]
    NegativeProceedsEntry { index: usize, value: f64 },
}

/// Fatal failures while computing a fund schedule.
///
/// These propagate synchronously to the caller; the engine performs no local
/// recovery or default substitution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("capital call at period {period} exceeds unfunded commitment by {excess:.2}")]
    OverCall { period: usize, excess: f64 },

    #[error("{balance} would fall below zero at period {period} ({value:.2})")]
    NegativeBalance {
        period: usize,
        balance: &'static str,
        value: f64,
    },
}
