//! Return metrics derived from a computed schedule
//!
//! IRR is solved on the periodic LP cashflow series (calls negative,
//! distributions positive) with Newton-Raphson, falling back to bisection
//! when the derivative degenerates.

use crate::schedule::period::FundSchedule;

/// Annualised net IRR of the LP cashflow series for a schedule.
///
/// Returns `None` when no IRR exists (empty schedule or no sign change in
/// the cashflows).
pub fn net_lp_irr(schedule: &FundSchedule) -> Option<f64> {
    let cashflows: Vec<f64> = schedule
        .periods
        .iter()
        .map(|p| p.net_to_lp - p.capital_called)
        .collect();
    annualized_irr(&cashflows, schedule.frequency.periods_per_year())
}

/// IRR of a periodic cashflow series, annualised at the given frequency.
pub fn annualized_irr(cashflows: &[f64], periods_per_year: f64) -> Option<f64> {
    periodic_irr(cashflows).map(|rate| (1.0 + rate).powf(periods_per_year) - 1.0)
}

/// Per-period IRR of a cashflow series.
pub fn periodic_irr(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }
    if cashflows.iter().all(|&cf| cf.abs() < 1e-10) {
        return Some(0.0);
    }
    // An IRR requires at least one sign change
    let has_positive = cashflows.iter().any(|&cf| cf > 1e-10);
    let has_negative = cashflows.iter().any(|&cf| cf < -1e-10);
    if !has_positive || !has_negative {
        return None;
    }

    newton_irr(cashflows).or_else(|| bisection_irr(cashflows))
}

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 200;
const RATE_FLOOR: f64 = -0.99;
const RATE_CEILING: f64 = 10.0;

fn newton_irr(cashflows: &[f64]) -> Option<f64> {
    let scale: f64 = cashflows.iter().map(|cf| cf.abs()).sum();
    let mut rate = 0.01;
    for _ in 0..MAX_ITERATIONS {
        let (value, derivative) = npv_with_derivative(cashflows, rate);
        if derivative.abs() < 1e-20 {
            return None;
        }
        let next = (rate - value / derivative).clamp(RATE_FLOOR, RATE_CEILING);
        if (next - rate).abs() < TOLERANCE {
            // Clamping can stall at a bound that is not a root
            if npv(cashflows, next).abs() < scale * 1e-6 {
                return Some(next);
            }
            return None;
        }
        rate = next;
    }
    None
}

fn bisection_irr(cashflows: &[f64]) -> Option<f64> {
    let mut low = RATE_FLOOR;
    let mut high = RATE_CEILING;
    if npv(cashflows, low) * npv(cashflows, high) > 0.0 {
        return None;
    }
    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv(cashflows, mid);
        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }
        if npv_mid * npv(cashflows, low) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }
    None
}

fn npv(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

fn npv_with_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut value = 0.0;
    let mut derivative = 0.0;
    for (t, &cf) in cashflows.iter().enumerate() {
        value += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            derivative -= t as f64 * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }
    (value, derivative)
}
