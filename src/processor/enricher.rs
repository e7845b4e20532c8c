use anyhow::{bail, Result};
use polars::prelude::*;
use tracing::info;

use crate::models::trip::{
    day_of_week_label, payment_type_label, COL_DISTANCE, COL_DROPOFF_TIME, COL_DROP_DATE,
    COL_DURATION_MIN, COL_PAYMENT_LABEL, COL_PAYMENT_TYPE, COL_PICKUP_DATE, COL_PICKUP_DOW,
    COL_PICKUP_HOUR, COL_PICKUP_TIME, COL_SPEED_MPH,
};

const SECONDS_PER_DAY: i64 = 86_400;

fn ticks_per_second(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    }
}

fn datetime_unit(df: &DataFrame, name: &str) -> Result<TimeUnit> {
    match df.column(name)?.dtype() {
        DataType::Datetime(unit, _) => Ok(*unit),
        other => bail!("column {name} must be a datetime, got {other}"),
    }
}

// 1970-01-01 was a Thursday; weekday numbers are 1 = Monday .. 7 = Sunday.
fn weekday_number(days_since_epoch: i64) -> i64 {
    (days_since_epoch + 3).rem_euclid(7) + 1
}

/// Add the derived columns to a cleaned trip table: duration, speed, pickup
/// and drop-off calendar dates, pickup hour, payment label, weekday label.
/// Pure and total: no rows are dropped, null inputs yield null derivations.
pub fn enrich(mut df: DataFrame) -> Result<DataFrame> {
    let pickup_ticks = ticks_per_second(datetime_unit(&df, COL_PICKUP_TIME)?);
    let dropoff_ticks = ticks_per_second(datetime_unit(&df, COL_DROPOFF_TIME)?);

    let pickup_c = df.column(COL_PICKUP_TIME)?.cast(&DataType::Int64)?;
    let pickup = pickup_c.i64()?;
    let dropoff_c = df.column(COL_DROPOFF_TIME)?.cast(&DataType::Int64)?;
    let dropoff = dropoff_c.i64()?;
    let distance_c = df.column(COL_DISTANCE)?.cast(&DataType::Float64)?;
    let distance = distance_c.f64()?;
    let payment_c = df.column(COL_PAYMENT_TYPE)?.cast(&DataType::Int64)?;
    let payment = payment_c.i64()?;

    let height = df.height();
    let mut duration_min: Vec<Option<f64>> = Vec::with_capacity(height);
    let mut speed_mph: Vec<Option<f64>> = Vec::with_capacity(height);
    let mut pickup_days: Vec<Option<i32>> = Vec::with_capacity(height);
    let mut drop_days: Vec<Option<i32>> = Vec::with_capacity(height);
    let mut pickup_hours: Vec<Option<i32>> = Vec::with_capacity(height);
    let mut pickup_dows: Vec<Option<String>> = Vec::with_capacity(height);
    let mut payment_labels: Vec<Option<String>> = Vec::with_capacity(height);

    for i in 0..height {
        let pickup_secs = pickup.get(i).map(|t| t.div_euclid(pickup_ticks));
        let dropoff_secs = dropoff.get(i).map(|t| t.div_euclid(dropoff_ticks));

        let minutes = match (pickup.get(i), dropoff.get(i)) {
            (Some(p), Some(d)) => Some(
                (d as f64 / dropoff_ticks as f64 - p as f64 / pickup_ticks as f64) / 60.0,
            ),
            _ => None,
        };
        duration_min.push(minutes);

        // Speed mirrors the source definition exactly: distance over
        // duration-in-minutes, forced to 0 when the duration is not positive.
        speed_mph.push(match minutes {
            Some(m) if m <= 0.0 => Some(0.0),
            Some(m) => distance.get(i).map(|miles| miles / m),
            None => None,
        });

        pickup_days.push(pickup_secs.map(|s| s.div_euclid(SECONDS_PER_DAY) as i32));
        drop_days.push(dropoff_secs.map(|s| s.div_euclid(SECONDS_PER_DAY) as i32));
        pickup_hours.push(pickup_secs.map(|s| (s.rem_euclid(SECONDS_PER_DAY) / 3_600) as i32));
        pickup_dows.push(pickup_secs.map(|s| {
            let days = s.div_euclid(SECONDS_PER_DAY);
            day_of_week_label(weekday_number(days)).to_string()
        }));
        payment_labels.push(payment.get(i).map(|code| payment_type_label(code).to_string()));
    }

    df.with_column(Series::new(COL_DURATION_MIN.into(), duration_min))?;
    df.with_column(Series::new(COL_SPEED_MPH.into(), speed_mph))?;
    let pickup_date = Series::new(COL_PICKUP_DATE.into(), pickup_days).cast(&DataType::Date)?;
    df.with_column(pickup_date)?;
    let drop_date = Series::new(COL_DROP_DATE.into(), drop_days).cast(&DataType::Date)?;
    df.with_column(drop_date)?;
    df.with_column(Series::new(COL_PICKUP_HOUR.into(), pickup_hours))?;
    df.with_column(Series::new(COL_PAYMENT_LABEL.into(), payment_labels))?;
    df.with_column(Series::new(COL_PICKUP_DOW.into(), pickup_dows))?;

    info!("Enriched trip table: {} rows, {} columns", df.height(), df.width());
    Ok(df)
}
