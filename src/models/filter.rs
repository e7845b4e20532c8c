use chrono::NaiveDate;
use std::collections::HashSet;

/// User-selected filter state, built fresh per interaction and immutable once
/// handed to the filter engine. All bounds are inclusive; an empty payment
/// set selects nothing, not everything.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hour_start: u8,
    pub hour_end: u8,
    pub payment_types: HashSet<String>,
}

impl FilterCriteria {
    /// Criteria covering every hour of the given date range with the given
    /// payment labels selected, mirroring the dashboard's default widget state.
    pub fn all_hours<I, S>(start_date: NaiveDate, end_date: NaiveDate, payment_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterCriteria {
            start_date,
            end_date,
            hour_start: 0,
            hour_end: 23,
            payment_types: payment_types.into_iter().map(Into::into).collect(),
        }
    }
}
