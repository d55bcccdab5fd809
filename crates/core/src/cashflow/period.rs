//! Period resolution.
//!
//! Calendar periods come from the fiscal period table and are only filtered and
//! ordered here. Weekly periods are generated.

use bhima_shared::types::DateRange;
use chrono::{Datelike, Days};

use super::error::CashflowError;
use super::types::Period;

/// Generates Monday-to-Sunday weeks covering `range`.
///
/// Windows start on the Monday of the week containing the first day and advance
/// seven days while the window start is on or before the last day. The first
/// window starts on the requested first day itself, so no flow from before the
/// range is credited to it. Weeks are numbered from 1.
#[must_use]
pub fn weekly_periods(range: DateRange) -> Vec<Period> {
    let from = range.start();
    let offset = u64::from(from.weekday().num_days_from_monday());
    let Some(mut week_start) = from.checked_sub_days(Days::new(offset)) else {
        return Vec::new();
    };

    let mut periods = Vec::new();
    let mut number = 1;

    while week_start <= range.end() {
        let Some(week_end) = week_start.checked_add_days(Days::new(6)) else {
            break;
        };

        periods.push(Period {
            id: number,
            start_date: if number == 1 { from } else { week_start },
            end_date: week_end,
        });

        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
        number += 1;
    }

    periods
}

/// Keeps the fiscal periods overlapping `range`, ordered by start date.
#[must_use]
pub fn calendar_periods(candidates: Vec<Period>, range: DateRange) -> Vec<Period> {
    let mut periods: Vec<Period> = candidates
        .into_iter()
        .filter(|p| range.overlaps(p.start_date, p.end_date))
        .collect();
    periods.sort_by_key(|p| p.start_date);
    periods
}

/// Fails with [`CashflowError::NoPeriods`] when nothing was resolved.
pub fn ensure_resolved(periods: Vec<Period>, range: DateRange) -> Result<Vec<Period>, CashflowError> {
    if periods.is_empty() {
        return Err(CashflowError::NoPeriods {
            from: range.start(),
            to: range.end(),
        });
    }
    Ok(periods)
}
