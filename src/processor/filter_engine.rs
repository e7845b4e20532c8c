use anyhow::Result;
use polars::prelude::*;

use crate::models::trip::{days_since_epoch, COL_PAYMENT_LABEL, COL_PICKUP_DATE, COL_PICKUP_HOUR};
use crate::models::FilterCriteria;

/// Apply user filter criteria to the enriched table. A row survives iff its
/// pickup date, pickup hour and payment label all match; every bound is
/// inclusive, so a [d, d] date range selects that single day. An empty
/// payment set selects nothing.
pub fn apply(df: &DataFrame, criteria: &FilterCriteria) -> Result<DataFrame> {
    let dates_c = df.column(COL_PICKUP_DATE)?.cast(&DataType::Int32)?;
    let dates = dates_c.i32()?;
    let hours = df.column(COL_PICKUP_HOUR)?.i32()?;
    let labels = df.column(COL_PAYMENT_LABEL)?.str()?;

    let start = days_since_epoch(criteria.start_date);
    let end = days_since_epoch(criteria.end_date);
    let hour_start = criteria.hour_start as i32;
    let hour_end = criteria.hour_end as i32;

    let mut keep = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let in_dates = matches!(dates.get(i), Some(d) if d >= start && d <= end);
        let in_hours = matches!(hours.get(i), Some(h) if h >= hour_start && h <= hour_end);
        let in_payments = matches!(labels.get(i), Some(l) if criteria.payment_types.contains(l));
        keep.push(in_dates && in_hours && in_payments);
    }

    let mask = BooleanChunked::from_slice("keep".into(), &keep);
    Ok(df.filter(&mask)?)
}
