//! Pure calendar math for period boundaries and accrual fractions
//!
//! All functions are side-effect-free; the same inputs always produce the
//! same outputs. Dates are plain calendar dates (`chrono::NaiveDate`), no
//! timezone handling.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::DateError;

/// Projection frequency for a fund schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn months_per_period(&self) -> i32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Annual => 12,
        }
    }

    pub fn periods_per_year(&self) -> f64 {
        match self {
            Frequency::Monthly => 12.0,
            Frequency::Quarterly => 4.0,
            Frequency::Annual => 1.0,
        }
    }
}

/// Day-count convention for fee and hurdle accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayCount {
    /// Actual days over a fixed 365-day year
    Act365Fixed,
    /// Actual days over the actual length of the accrual year
    ActAct,
    /// 30-day months over a 360-day year
    Thirty360,
}

/// Zero-based month index since year 0; monotone over the calendar.
fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month() as i32 - 1
}

/// First day of the month with the given zero-based month index.
fn month_start(index: i32) -> NaiveDate {
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is a valid date")
}

/// Last day of the month containing `date`.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    month_start(month_index(date) + 1)
        .pred_opt()
        .expect("month start has a predecessor")
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    end_of_month(date).day()
}

/// Number of days in the calendar year containing `date`.
pub fn days_in_year(date: NaiveDate) -> i64 {
    if date.leap_year() {
        366
    } else {
        365
    }
}

/// Shift `date` by a number of calendar months.
///
/// A month-end input lands on the month end of the target month; otherwise
/// the day of month is preserved, clamped to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let target = month_start(month_index(date) + months);
    let target_eom = end_of_month(target);
    if date == end_of_month(date) {
        target_eom
    } else {
        target
            .with_day(date.day().min(target_eom.day()))
            .expect("clamped day is valid")
    }
}

/// Number of whole periods between two dates at the given frequency.
pub fn period_count(
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
) -> Result<usize, DateError> {
    if end < start {
        return Err(DateError::InvalidRange { start, end });
    }
    let months = month_index(end) - month_index(start);
    Ok((months / frequency.months_per_period()) as usize)
}

/// First day of period `index` for a fund starting in the month of `fund_start`.
pub fn period_start_date(fund_start: NaiveDate, index: usize, frequency: Frequency) -> NaiveDate {
    month_start(month_index(fund_start) + index as i32 * frequency.months_per_period())
}

/// Last day of period `index` for a fund starting in the month of `fund_start`.
///
/// Periods span whole calendar months; month-length and leap-year handling
/// comes from the underlying calendar arithmetic.
pub fn period_end_date(fund_start: NaiveDate, index: usize, frequency: Frequency) -> NaiveDate {
    let months = (index as i32 + 1) * frequency.months_per_period() - 1;
    end_of_month(month_start(month_index(fund_start) + months))
}

/// Accrual fraction of a year between two dates, inclusive of both endpoints.
pub fn year_fraction(start: NaiveDate, end: NaiveDate, convention: DayCount) -> f64 {
    match convention {
        DayCount::Act365Fixed => accrual_days(start, end) / 365.0,
        DayCount::ActAct => accrual_days(start, end) / days_in_year(end) as f64,
        DayCount::Thirty360 => {
            // Exclusive end: a full calendar month accrues exactly 30/360.
            let excl = end.succ_opt().expect("period end has a successor");
            let days = 360 * (excl.year() - start.year())
                + 30 * (excl.month() as i32 - start.month() as i32)
                + (excl.day().min(30) as i32 - start.day().min(30) as i32);
            days as f64 / 360.0
        }
    }
}

fn accrual_days(start: NaiveDate, end: NaiveDate) -> f64 {
    ((end - start).num_days() + 1) as f64
}
