//! Running balance across periods.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::types::Period;

/// Opening and closing balance of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBalance {
    /// Balance carried in.
    pub opening: Decimal,
    /// `opening + income - expense`.
    pub closing: Decimal,
}

/// Chains closing balances into the next period's opening balance.
///
/// The accumulator is seeded with the balance before the reported range. A
/// period recognised as a fiscal year start (see [`is_fiscal_year_start`])
/// opens with that seed again instead of the previous closing balance.
#[derive(Debug, Clone)]
pub struct BalanceAccumulator {
    pre_range: Decimal,
    first_start: NaiveDate,
    running: Decimal,
}

impl BalanceAccumulator {
    /// Creates an accumulator for periods whose first one starts on `first_start`.
    #[must_use]
    pub const fn new(pre_range: Decimal, first_start: NaiveDate) -> Self {
        Self {
            pre_range,
            first_start,
            running: pre_range,
        }
    }

    /// Books one period and returns its balances. Periods must be fed in order.
    pub fn post(&mut self, period: &Period, income: Decimal, expense: Decimal) -> PeriodBalance {
        let opening = if is_fiscal_year_start(period.start_date, self.first_start) {
            self.pre_range
        } else {
            self.running
        };
        let closing = opening + income - expense;
        self.running = closing;

        PeriodBalance { opening, closing }
    }

    /// Closing balance of the last booked period.
    #[must_use]
    pub const fn balance(&self) -> Decimal {
        self.running
    }
}

/// Whether a period starting on `start` opens with the pre-range balance.
///
/// When the first period starts on January 1st, any period starting on the same
/// day and month matches, whatever its year. Otherwise day, month and year must
/// all match.
#[must_use]
pub fn is_fiscal_year_start(start: NaiveDate, first_start: NaiveDate) -> bool {
    let same_day_and_month =
        start.day() == first_start.day() && start.month() == first_start.month();

    if first_start.day() == 1 && first_start.month() == 1 {
        same_day_and_month
    } else {
        same_day_and_month && start.year() == first_start.year()
    }
}
