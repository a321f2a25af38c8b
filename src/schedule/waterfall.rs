//! Tiered distribution waterfall
//!
//! Distributable cash flows through strict tiers: return of capital,
//! preferred return, GP catch-up, then the residual carry split. Each tier
//! fully exhausts before the next begins; a partial fill terminates the
//! waterfall for the period.

/// How one period's distributable cash was allocated across tiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierAllocation {
    /// Tier (a): return of called capital to LPs
    pub return_of_capital: f64,
    /// Tier (b): preferred return to LPs up to the hurdle
    pub preferred_return: f64,
    /// Tier (c): GP catch-up
    pub gp_catch_up: f64,
    /// Tier (d): GP share of the residual split
    pub carry: f64,
    /// Tier (d): LP share of the residual split
    pub residual_to_lp: f64,
}

impl TierAllocation {
    pub fn total(&self) -> f64 {
        self.return_of_capital
            + self.preferred_return
            + self.gp_catch_up
            + self.carry
            + self.residual_to_lp
    }

    pub fn to_lp(&self) -> f64 {
        self.return_of_capital + self.preferred_return + self.residual_to_lp
    }

    pub fn to_gp(&self) -> f64 {
        self.gp_catch_up + self.carry
    }
}

/// Waterfall balances carried across periods
#[derive(Debug, Clone, Default)]
pub struct WaterfallState {
    /// Called capital not yet returned to LPs
    capital_outstanding: f64,
    /// Accrued, unpaid preferred return
    preferred_outstanding: f64,
    /// Preferred return paid so far
    cumulative_preferred_paid: f64,
    /// Catch-up paid to the GP so far
    cumulative_catch_up: f64,
}

impl WaterfallState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called capital joins the return-of-capital tier.
    pub fn on_capital_called(&mut self, amount: f64) {
        self.capital_outstanding += amount;
    }

    /// Accrue one period of preferred return on called-and-unreturned
    /// capital, compounding on any unpaid accrual. Call before this period's
    /// capital call; cash called this period starts accruing next period.
    pub fn accrue_preferred(&mut self, period_hurdle_rate: f64) {
        self.preferred_outstanding +=
            (self.capital_outstanding + self.preferred_outstanding) * period_hurdle_rate;
    }

    /// Run one period's distributable cash through the tiers.
    pub fn distribute(&mut self, cash: f64, carry_rate: f64, catch_up: bool) -> TierAllocation {
        let mut remaining = cash;

        // (a) return of capital until cumulative distributions cover
        // cumulative called capital
        let return_of_capital = remaining.min(self.capital_outstanding);
        self.capital_outstanding -= return_of_capital;
        remaining -= return_of_capital;

        // (b) preferred return up to the hurdle
        let preferred_return = remaining.min(self.preferred_outstanding);
        self.preferred_outstanding -= preferred_return;
        self.cumulative_preferred_paid += preferred_return;
        remaining -= preferred_return;

        // (c) GP catch-up until the GP's cumulative share of tiers (b)+(c)
        // reaches the carry rate
        let mut gp_catch_up = 0.0;
        if catch_up && carry_rate > 0.0 && remaining > 0.0 {
            let target = carry_rate / (1.0 - carry_rate) * self.cumulative_preferred_paid;
            gp_catch_up = remaining.min((target - self.cumulative_catch_up).max(0.0));
            self.cumulative_catch_up += gp_catch_up;
            remaining -= gp_catch_up;
        }

        // (d) residual split
        let carry = remaining * carry_rate;
        let residual_to_lp = remaining - carry;

        TierAllocation {
            return_of_capital,
            preferred_return,
            gp_catch_up,
            carry,
            residual_to_lp,
        }
    }

    /// Called capital not yet returned to LPs.
    pub fn capital_outstanding(&self) -> f64 {
        self.capital_outstanding
    }

    /// Accrued preferred return not yet paid.
    pub fn preferred_outstanding(&self) -> f64 {
        self.preferred_outstanding
    }
}
