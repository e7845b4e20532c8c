use anyhow::{Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::config::SourceConfig;
use crate::fetcher::SourceFetcher;
use crate::models::FilterCriteria;
use crate::processor::{cleaner, enricher, filter_engine, schema_validator};

/// One reporting session: the enriched trip table and zone lookup, computed
/// once per process and immutable thereafter. Every query result is a fresh
/// projection off these two tables.
pub struct TaxiSession {
    enriched: DataFrame,
    zones: DataFrame,
}

impl TaxiSession {
    /// Run the ingestion pipeline: ensure both source files are cached
    /// locally, read them, validate the trip schema, clean and enrich.
    /// Fetch and schema failures are terminal for the session.
    pub async fn load(config: &SourceConfig) -> Result<Self> {
        let fetcher = SourceFetcher::new()?;
        let trips_path = fetcher
            .ensure_local(&config.trips_path(), &config.trips.url)
            .await
            .context("Failed to obtain the trip data file")?;
        let zones_path = fetcher
            .ensure_local(&config.zones_path(), &config.zones.url)
            .await
            .context("Failed to obtain the zone lookup file")?;

        let raw = read_trips(&trips_path)?;
        info!("Loaded {} raw trip rows from {}", raw.height(), trips_path.display());
        schema_validator::validate(&raw)?;

        let cleaned = cleaner::clean(raw)?;
        let enriched = enricher::enrich(cleaned)?;
        let zones = read_zone_lookup(&zones_path)?;
        info!("Loaded {} zone lookup rows", zones.height());

        Ok(TaxiSession { enriched, zones })
    }

    /// Build a session from already-prepared tables. Used by tests and by
    /// callers that source the tables some other way.
    pub fn from_tables(enriched: DataFrame, zones: DataFrame) -> Self {
        TaxiSession { enriched, zones }
    }

    pub fn enriched_table(&self) -> &DataFrame {
        &self.enriched
    }

    pub fn zone_lookup(&self) -> &DataFrame {
        &self.zones
    }

    pub fn apply_filters(&self, criteria: &FilterCriteria) -> Result<DataFrame> {
        filter_engine::apply(&self.enriched, criteria)
    }
}

fn read_trips(path: &Path) -> Result<DataFrame> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let df = ParquetReader::new(file).finish()?;
    Ok(df)
}

fn read_zone_lookup(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::{trips_to_dataframe, TripRecord, COL_LOCATION_ID, COL_ZONE};
    use crate::processor::aggregator;
    use chrono::{Duration, NaiveDate};

    fn session() -> TaxiSession {
        let pickup = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let trips: Vec<TripRecord> = (0..4i64)
            .map(|i| TripRecord {
                pickup,
                dropoff: pickup + Duration::minutes(10),
                pu_location_id: 142,
                do_location_id: 236,
                passenger_count: 1,
                trip_distance: 2.0,
                fare_amount: 10.0 + i as f64,
                total_amount: 13.0 + i as f64,
                payment_type: 1 + (i % 2),
            })
            .collect();
        let enriched = enricher::enrich(trips_to_dataframe(&trips).unwrap()).unwrap();
        let zones = df!(
            COL_LOCATION_ID => [142i64],
            "Borough" => ["Manhattan"],
            COL_ZONE => ["Lincoln Square East"],
            "service_zone" => ["Yellow Zone"],
        )
        .unwrap();
        TaxiSession::from_tables(enriched, zones)
    }

    #[test]
    fn filter_and_query_through_the_session() {
        let session = session();
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let criteria = FilterCriteria::all_hours(day, day, ["Credit Card"]);

        let filtered = session.apply_filters(&criteria).unwrap();
        assert_eq!(filtered.height(), 2);

        let zones = aggregator::top_zones(&filtered, session.zone_lookup()).unwrap();
        assert_eq!(zones.height(), 1);
        assert_eq!(
            zones.column("zone").unwrap().str().unwrap().get(0),
            Some("Lincoln Square East")
        );

        let breakdown =
            aggregator::payment_breakdown(&filtered, session.enriched_table()).unwrap();
        // 2 of each label in the unfiltered table, 2 filtered rows: 100 each.
        let pct = breakdown.column("percentage").unwrap().i64().unwrap();
        assert_eq!(pct.get(0), Some(100));
        assert_eq!(pct.get(1), Some(100));
    }
}
