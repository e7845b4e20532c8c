use anyhow::Result;
use polars::prelude::*;
use tracing::info;

use crate::models::trip::{
    COL_DISTANCE, COL_DROPOFF_TIME, COL_FARE, COL_PICKUP_TIME, CRITICAL_COLUMNS,
};

/// Drop unusable rows from the raw trip table: nulls in critical columns,
/// non-positive distances, fares outside (0, 500), and trips that end before
/// they start. The result may be empty; that is not an error.
pub fn clean(df: DataFrame) -> Result<DataFrame> {
    let before = df.height();

    let critical = CRITICAL_COLUMNS
        .iter()
        .fold(lit(true), |acc, name| acc.and(col(*name).is_not_null()));
    let cleaned = df
        .lazy()
        .filter(critical)
        .filter(
            col(COL_DISTANCE)
                .gt(lit(0.0))
                .and(col(COL_FARE).gt(lit(0.0)))
                .and(col(COL_FARE).lt(lit(500.0))),
        )
        .filter(col(COL_DROPOFF_TIME).gt(col(COL_PICKUP_TIME)))
        .collect()?;

    info!("Cleaned trip table: {} -> {} rows", before, cleaned.height());
    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{trips_to_dataframe, TripRecord};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn trip(distance: f64, fare: f64, minutes: i64) -> TripRecord {
        let pickup = at(9);
        TripRecord {
            pickup,
            dropoff: pickup + Duration::minutes(minutes),
            pu_location_id: 142,
            do_location_id: 236,
            passenger_count: 1,
            trip_distance: distance,
            fare_amount: fare,
            total_amount: fare + 3.0,
            payment_type: 1,
        }
    }

    #[test]
    fn fare_bounds_are_strict() {
        let df = trips_to_dataframe(&[
            trip(1.0, 500.0, 10), // exactly 500: out
            trip(1.0, 0.0, 10),   // exactly 0: out
            trip(1.0, 499.99, 10),
            trip(1.0, 0.01, 10),
        ])
        .unwrap();

        let cleaned = clean(df).unwrap();
        assert_eq!(cleaned.height(), 2);
    }

    #[test]
    fn distance_has_no_upper_bound() {
        let df = trips_to_dataframe(&[trip(60.0, 10.0, 10), trip(0.0, 10.0, 10)]).unwrap();
        let cleaned = clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        let distances = cleaned.column(COL_DISTANCE).unwrap().f64().unwrap();
        assert_eq!(distances.get(0), Some(60.0));
    }

    #[test]
    fn dropoff_must_follow_pickup() {
        let df = trips_to_dataframe(&[
            trip(1.0, 10.0, 10),
            trip(1.0, 10.0, 0),   // zero duration: out
            trip(1.0, 10.0, -15), // negative duration: out
        ])
        .unwrap();

        let cleaned = clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
    }

    #[test]
    fn null_critical_columns_dropped() {
        let mut df = trips_to_dataframe(&[trip(1.0, 10.0, 10), trip(2.0, 20.0, 10)]).unwrap();
        df.with_column(Series::new(COL_FARE.into(), vec![Some(10.0f64), None]))
            .unwrap();

        let cleaned = clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
    }

    #[test]
    fn null_pickup_timestamp_dropped() {
        let mut df = trips_to_dataframe(&[trip(1.0, 10.0, 10), trip(2.0, 20.0, 10)]).unwrap();
        let first_ms = df
            .column(COL_PICKUP_TIME)
            .unwrap()
            .cast(&DataType::Int64)
            .unwrap()
            .i64()
            .unwrap()
            .get(0);
        let pickup = Series::new(COL_PICKUP_TIME.into(), vec![first_ms, None])
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        df.with_column(pickup).unwrap();

        let cleaned = clean(df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(
            cleaned.column(COL_PICKUP_TIME).unwrap().null_count(),
            0
        );
    }

    #[test]
    fn all_rows_rejected_yields_empty_table() {
        let df = trips_to_dataframe(&[trip(0.0, 10.0, 10), trip(1.0, 600.0, 10)]).unwrap();
        let cleaned = clean(df).unwrap();
        assert_eq!(cleaned.height(), 0);
    }
}
