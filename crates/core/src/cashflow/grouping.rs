//! Period grouping of postings.

use super::types::{Period, PeriodMode, Posting};

/// Postings bucketed by period index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBuckets<'a> {
    /// One bucket per period, same order as the periods.
    pub buckets: Vec<Vec<&'a Posting>>,
    /// Postings that matched no period.
    pub unassigned: usize,
}

/// Buckets postings into `periods`.
///
/// Calendar mode matches on the posting's fiscal period id; weekly mode on
/// inclusive date membership. A posting matching no period is left out of every
/// bucket and counted in [`PeriodBuckets::unassigned`]. A posting is placed in
/// the first period that matches.
#[must_use]
pub fn group_by_period<'a>(
    periods: &[Period],
    postings: &'a [Posting],
    mode: PeriodMode,
) -> PeriodBuckets<'a> {
    let mut buckets = vec![Vec::new(); periods.len()];
    let mut unassigned = 0;

    for posting in postings {
        let slot = periods.iter().position(|period| match mode {
            PeriodMode::Calendar => posting
                .period_id
                .is_some_and(|id| id.into_inner() == period.id),
            PeriodMode::Weekly => period.contains_date(posting.date),
        });

        match slot {
            Some(index) => buckets[index].push(posting),
            None => unassigned += 1,
        }
    }

    PeriodBuckets {
        buckets,
        unassigned,
    }
}
