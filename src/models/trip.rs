use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;

// Column names as they appear in the upstream parquet file.
pub const COL_PICKUP_TIME: &str = "tpep_pickup_datetime";
pub const COL_DROPOFF_TIME: &str = "tpep_dropoff_datetime";
pub const COL_PU_LOCATION: &str = "PULocationID";
pub const COL_DO_LOCATION: &str = "DOLocationID";
pub const COL_PASSENGERS: &str = "passenger_count";
pub const COL_DISTANCE: &str = "trip_distance";
pub const COL_FARE: &str = "fare_amount";
pub const COL_TOTAL: &str = "total_amount";
pub const COL_PAYMENT_TYPE: &str = "payment_type";

// Columns the enricher adds.
pub const COL_DURATION_MIN: &str = "trip_duration_minutes";
pub const COL_SPEED_MPH: &str = "trip_speed_mph";
pub const COL_PICKUP_DATE: &str = "pickup_date";
pub const COL_DROP_DATE: &str = "drop_date";
pub const COL_PICKUP_HOUR: &str = "pickup_hour";
pub const COL_PAYMENT_LABEL: &str = "payment_type_label";
pub const COL_PICKUP_DOW: &str = "pickup_day_of_week";

// Zone lookup CSV columns.
pub const COL_LOCATION_ID: &str = "LocationID";
pub const COL_ZONE: &str = "Zone";

/// Columns that must be present in the trip file for the pipeline to run.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_PICKUP_TIME,
    COL_DROPOFF_TIME,
    COL_PU_LOCATION,
    COL_DO_LOCATION,
    COL_PASSENGERS,
    COL_DISTANCE,
    COL_FARE,
    COL_TOTAL,
    COL_PAYMENT_TYPE,
];

/// Columns where a null makes the row unusable.
pub const CRITICAL_COLUMNS: [&str; 5] = [
    COL_PICKUP_TIME,
    COL_DROPOFF_TIME,
    COL_PU_LOCATION,
    COL_DO_LOCATION,
    COL_FARE,
];

pub const INVALID_LABEL: &str = "Invalid";

const PAYMENT_LABELS: [&str; 5] = ["Credit Card", "Cash", "No Charge", "Dispute", "Unknown"];

pub const DAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Human-readable label for a payment type code. Codes are bounded 1-5;
/// anything else (malformed upstream data) maps to the "Invalid" sentinel.
pub fn payment_type_label(code: i64) -> &'static str {
    if (1..=5).contains(&code) {
        PAYMENT_LABELS[(code - 1) as usize]
    } else {
        INVALID_LABEL
    }
}

/// Weekday label for a 1-7 weekday number (1 = Monday), "Invalid" otherwise.
pub fn day_of_week_label(num: i64) -> &'static str {
    if (1..=7).contains(&num) {
        DAY_LABELS[(num - 1) as usize]
    } else {
        INVALID_LABEL
    }
}

// chrono counts days from 0001-01-01; polars Date counts from 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + EPOCH_DAYS_FROM_CE)
}

/// One raw trip observation, typed. The pipeline itself works on DataFrames;
/// this record states the expected row shape once and lets callers (fixtures,
/// tests) build well-typed synthetic tables via [`trips_to_dataframe`].
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub pickup: NaiveDateTime,
    pub dropoff: NaiveDateTime,
    pub pu_location_id: i64,
    pub do_location_id: i64,
    pub passenger_count: i64,
    pub trip_distance: f64,
    pub fare_amount: f64,
    pub total_amount: f64,
    pub payment_type: i64,
}

/// Build a raw trip table with the upstream schema from typed records.
pub fn trips_to_dataframe(trips: &[TripRecord]) -> PolarsResult<DataFrame> {
    let pickup_ms: Vec<i64> = trips
        .iter()
        .map(|t| t.pickup.and_utc().timestamp_millis())
        .collect();
    let dropoff_ms: Vec<i64> = trips
        .iter()
        .map(|t| t.dropoff.and_utc().timestamp_millis())
        .collect();

    let mut df = df!(
        COL_PICKUP_TIME => pickup_ms,
        COL_DROPOFF_TIME => dropoff_ms,
        COL_PU_LOCATION => trips.iter().map(|t| t.pu_location_id).collect::<Vec<_>>(),
        COL_DO_LOCATION => trips.iter().map(|t| t.do_location_id).collect::<Vec<_>>(),
        COL_PASSENGERS => trips.iter().map(|t| t.passenger_count).collect::<Vec<_>>(),
        COL_DISTANCE => trips.iter().map(|t| t.trip_distance).collect::<Vec<_>>(),
        COL_FARE => trips.iter().map(|t| t.fare_amount).collect::<Vec<_>>(),
        COL_TOTAL => trips.iter().map(|t| t.total_amount).collect::<Vec<_>>(),
        COL_PAYMENT_TYPE => trips.iter().map(|t| t.payment_type).collect::<Vec<_>>(),
    )?;

    let dtype = DataType::Datetime(TimeUnit::Milliseconds, None);
    let pickup = df.column(COL_PICKUP_TIME)?.cast(&dtype)?;
    df.with_column(pickup)?;
    let dropoff = df.column(COL_DROPOFF_TIME)?.cast(&dtype)?;
    df.with_column(dropoff)?;

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_labels_in_range() {
        assert_eq!(payment_type_label(1), "Credit Card");
        assert_eq!(payment_type_label(2), "Cash");
        assert_eq!(payment_type_label(5), "Unknown");
    }

    #[test]
    fn payment_labels_out_of_range() {
        assert_eq!(payment_type_label(0), INVALID_LABEL);
        assert_eq!(payment_type_label(6), INVALID_LABEL);
        assert_eq!(payment_type_label(-3), INVALID_LABEL);
    }

    #[test]
    fn day_labels() {
        assert_eq!(day_of_week_label(1), "Monday");
        assert_eq!(day_of_week_label(7), "Sunday");
        assert_eq!(day_of_week_label(0), INVALID_LABEL);
        assert_eq!(day_of_week_label(8), INVALID_LABEL);
    }

    #[test]
    fn epoch_day_conversions_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let days = days_since_epoch(date);
        assert_eq!(date_from_days(days), Some(date));
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
    }

    #[test]
    fn typed_records_build_raw_table() {
        let pickup = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let trip = TripRecord {
            pickup,
            dropoff: pickup + chrono::Duration::minutes(10),
            pu_location_id: 132,
            do_location_id: 236,
            passenger_count: 1,
            trip_distance: 2.5,
            fare_amount: 12.0,
            total_amount: 15.0,
            payment_type: 1,
        };

        let df = trips_to_dataframe(&[trip]).unwrap();
        assert_eq!(df.height(), 1);
        for col in REQUIRED_COLUMNS {
            assert!(df.column(col).is_ok(), "missing {col}");
        }
        assert_eq!(
            df.column(COL_PICKUP_TIME).unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }
}
