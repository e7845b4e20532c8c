use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::trip::{
    date_from_days, COL_DISTANCE, COL_DURATION_MIN, COL_FARE, COL_LOCATION_ID, COL_PAYMENT_LABEL,
    COL_PICKUP_DATE, COL_PICKUP_DOW, COL_PICKUP_HOUR, COL_PU_LOCATION, COL_ZONE, DAY_LABELS,
};

pub const TOP_ZONES_LIMIT: usize = 10;
pub const DISTANCE_BINS: usize = 100;
pub const DISTANCE_LIMIT: f64 = 50.0;

/// Trip counts per pickup zone over the filtered table, left-joined to the
/// zone lookup (pickup ids without a lookup entry keep a null zone). Sorted
/// by count descending, then zone name ascending (null zone first) so equal
/// counts order deterministically. At most ten rows.
pub fn top_zones(filtered: &DataFrame, zone_lookup: &DataFrame) -> Result<DataFrame> {
    let ids_c = filtered.column(COL_PU_LOCATION)?.cast(&DataType::Int64)?;
    let ids = ids_c.i64()?;

    let mut per_location: HashMap<Option<i64>, u32> = HashMap::new();
    for i in 0..filtered.height() {
        *per_location.entry(ids.get(i)).or_insert(0) += 1;
    }

    let zone_ids_c = zone_lookup.column(COL_LOCATION_ID)?.cast(&DataType::Int64)?;
    let zone_ids = zone_ids_c.i64()?;
    let zone_names = zone_lookup.column(COL_ZONE)?.str()?;
    let mut names: HashMap<i64, String> = HashMap::new();
    for i in 0..zone_lookup.height() {
        if let (Some(id), Some(name)) = (zone_ids.get(i), zone_names.get(i)) {
            names.entry(id).or_insert_with(|| name.to_string());
        }
    }

    // Group by zone name, not location id: distinct ids sharing a name (and
    // all unmatched ids) merge, matching the upstream GROUP BY.
    let mut per_zone: BTreeMap<Option<String>, u32> = BTreeMap::new();
    for (id, count) in per_location {
        let zone = id.and_then(|i| names.get(&i).cloned());
        *per_zone.entry(zone).or_insert(0) += count;
    }

    let mut rows: Vec<(Option<String>, u32)> = per_zone.into_iter().collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.truncate(TOP_ZONES_LIMIT);

    let zones: Vec<Option<String>> = rows.iter().map(|(zone, _)| zone.clone()).collect();
    let counts: Vec<u32> = rows.iter().map(|(_, count)| *count).collect();
    Ok(df!("zone" => zones, "total_trips" => counts)?)
}

/// Mean fare per pickup hour over the filtered table, ascending by hour.
/// Hours with no rows are absent, not zero-filled.
pub fn fare_by_hour(filtered: &DataFrame) -> Result<DataFrame> {
    let hours = filtered.column(COL_PICKUP_HOUR)?.i32()?;
    let fares_c = filtered.column(COL_FARE)?.cast(&DataType::Float64)?;
    let fares = fares_c.f64()?;

    let mut sums: BTreeMap<i32, (f64, u32)> = BTreeMap::new();
    for i in 0..filtered.height() {
        if let (Some(hour), Some(fare)) = (hours.get(i), fares.get(i)) {
            let entry = sums.entry(hour).or_insert((0.0, 0));
            entry.0 += fare;
            entry.1 += 1;
        }
    }

    let hour_col: Vec<i32> = sums.keys().copied().collect();
    let avg_fare: Vec<f64> = sums.values().map(|(sum, n)| sum / *n as f64).collect();
    Ok(df!("hour" => hour_col, "avg_fare" => avg_fare)?)
}

/// Percentage of trips per payment label. The numerator counts groups of the
/// *unfiltered* enriched table while the denominator is the *filtered* row
/// count — the upstream query mixes the two populations and that behavior is
/// kept verbatim. Integer floor division; a zero denominator yields null
/// percentages instead of a fault.
pub fn payment_breakdown(filtered: &DataFrame, unfiltered: &DataFrame) -> Result<DataFrame> {
    let labels = unfiltered.column(COL_PAYMENT_LABEL)?.str()?;
    let mut counts: BTreeMap<Option<String>, u64> = BTreeMap::new();
    for i in 0..unfiltered.height() {
        *counts
            .entry(labels.get(i).map(str::to_string))
            .or_insert(0) += 1;
    }

    let denominator = filtered.height() as u64;
    let label_col: Vec<Option<String>> = counts.keys().cloned().collect();
    let percentage: Vec<Option<i64>> = counts
        .values()
        .map(|count| {
            if denominator == 0 {
                None
            } else {
                Some((count * 100 / denominator) as i64)
            }
        })
        .collect();
    Ok(df!("payment_type" => label_col, "percentage" => percentage)?)
}

/// Histogram density of trip distances over the full enriched table,
/// restricted to 0 < distance < 50 and split into 100 equal-width bins over
/// that range. Each bin carries its percent of the restricted total.
pub fn distance_distribution(unfiltered: &DataFrame) -> Result<DataFrame> {
    let dist_c = unfiltered.column(COL_DISTANCE)?.cast(&DataType::Float64)?;
    let distances = dist_c.f64()?;

    let width = DISTANCE_LIMIT / DISTANCE_BINS as f64;
    let mut counts = vec![0u64; DISTANCE_BINS];
    let mut total = 0u64;
    for i in 0..unfiltered.height() {
        if let Some(d) = distances.get(i) {
            if d > 0.0 && d < DISTANCE_LIMIT {
                let bin = ((d / width) as usize).min(DISTANCE_BINS - 1);
                counts[bin] += 1;
                total += 1;
            }
        }
    }

    let bin_start: Vec<f64> = (0..DISTANCE_BINS).map(|b| b as f64 * width).collect();
    let bin_end: Vec<f64> = (1..=DISTANCE_BINS).map(|b| b as f64 * width).collect();
    let percent: Vec<f64> = counts
        .iter()
        .map(|&count| {
            if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            }
        })
        .collect();
    Ok(df!("bin_start" => bin_start, "bin_end" => bin_end, "percent" => percent)?)
}

/// Trip counts per (day of week, hour) cell of the filtered table for heatmap
/// rendering. All 7x24 cells are emitted, zero-filled, ordered Monday through
/// Sunday and hour 0 through 23.
pub fn day_hour_heatmap(filtered: &DataFrame) -> Result<DataFrame> {
    let dows = filtered.column(COL_PICKUP_DOW)?.str()?;
    let hours = filtered.column(COL_PICKUP_HOUR)?.i32()?;

    let mut grid = [[0u32; 24]; 7];
    for i in 0..filtered.height() {
        if let (Some(day), Some(hour)) = (dows.get(i), hours.get(i)) {
            if let Some(day_idx) = DAY_LABELS.iter().position(|label| *label == day) {
                if (0..24).contains(&hour) {
                    grid[day_idx][hour as usize] += 1;
                }
            }
        }
    }

    let mut day_col = Vec::with_capacity(7 * 24);
    let mut hour_col = Vec::with_capacity(7 * 24);
    let mut trips = Vec::with_capacity(7 * 24);
    for (day_idx, label) in DAY_LABELS.iter().enumerate() {
        for hour in 0..24 {
            day_col.push(label.to_string());
            hour_col.push(hour as i32);
            trips.push(grid[day_idx][hour]);
        }
    }
    Ok(df!("pickup_day_of_week" => day_col, "pickup_hour" => hour_col, "trips" => trips)?)
}

/// Headline metrics for the enriched table. Means over an empty table are
/// `None`, never NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub total_trips: usize,
    pub avg_fare: Option<f64>,
    pub total_revenue: f64,
    pub avg_distance: Option<f64>,
    pub avg_duration_minutes: Option<f64>,
}

pub fn summary_stats(enriched: &DataFrame) -> Result<SummaryStats> {
    let fares_c = enriched.column(COL_FARE)?.cast(&DataType::Float64)?;
    let fares = fares_c.f64()?;
    let dist_c = enriched.column(COL_DISTANCE)?.cast(&DataType::Float64)?;
    let distances = dist_c.f64()?;
    let durations = enriched.column(COL_DURATION_MIN)?.f64()?;

    Ok(SummaryStats {
        total_trips: enriched.height(),
        avg_fare: fares.mean(),
        total_revenue: fares.sum().unwrap_or(0.0),
        avg_distance: distances.mean(),
        avg_duration_minutes: durations.mean(),
    })
}

/// Earliest and latest pickup date present, for seeding the date-range
/// picker. `None` when the table is empty.
pub fn date_bounds(enriched: &DataFrame) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let days_c = enriched.column(COL_PICKUP_DATE)?.cast(&DataType::Int32)?;
    let days = days_c.i32()?;
    match (days.min(), days.max()) {
        (Some(lo), Some(hi)) => Ok(date_from_days(lo).zip(date_from_days(hi))),
        _ => Ok(None),
    }
}

/// Sorted distinct payment labels present in the table, for seeding the
/// payment multiselect.
pub fn payment_options(enriched: &DataFrame) -> Result<Vec<String>> {
    let labels = enriched.column(COL_PAYMENT_LABEL)?.str()?;
    let mut options = BTreeSet::new();
    for i in 0..enriched.height() {
        if let Some(label) = labels.get(i) {
            options.insert(label.to_string());
        }
    }
    Ok(options.into_iter().collect())
}
