use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tracing::{info, warn};

use taxi_pipeline::config::SourceConfig;
use taxi_pipeline::models::FilterCriteria;
use taxi_pipeline::processor::aggregator;
use taxi_pipeline::session::TaxiSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("🚕 Starting NYC Yellow Taxi reporting pipeline");

    // Optional config file path as first argument; coded defaults otherwise
    let config = match env::args().nth(1) {
        Some(path) if Path::new(&path).exists() => SourceConfig::from_file(&path)
            .with_context(|| format!("Failed to load source configuration from {path}"))?,
        Some(path) => {
            warn!("Config file not found: {}, using built-in defaults", path);
            SourceConfig::default()
        }
        None => SourceConfig::default(),
    };

    let session = TaxiSession::load(&config)
        .await
        .context("Pipeline failed before the enriched table was ready")?;

    let enriched = session.enriched_table();
    let stats = aggregator::summary_stats(enriched)?;
    info!("📊 Total trips: {}", stats.total_trips);
    if let Some(avg_fare) = stats.avg_fare {
        info!("📊 Avg fare: ${:.2}", avg_fare);
    }
    info!("📊 Total revenue: ${:.2}", stats.total_revenue);
    if let Some(avg_distance) = stats.avg_distance {
        info!("📊 Avg trip distance: {:.2} mi", avg_distance);
    }
    if let Some(avg_duration) = stats.avg_duration_minutes {
        info!("📊 Avg trip duration: {:.2} mins", avg_duration);
    }

    // Everything-included criteria, the dashboard's default widget state
    let Some((start_date, end_date)) = aggregator::date_bounds(enriched)? else {
        warn!("⚠️ No trips survived cleaning; nothing to report");
        return Ok(());
    };
    let payment_options = aggregator::payment_options(enriched)?;
    info!(
        "Reporting on {} - {} with payment types {:?}",
        start_date, end_date, payment_options
    );
    let criteria = FilterCriteria::all_hours(start_date, end_date, payment_options);
    let filtered = session.apply_filters(&criteria)?;
    info!("Filtered table has {} rows", filtered.height());

    let top_zones = aggregator::top_zones(&filtered, session.zone_lookup())?;
    info!("=== Top 10 Pickup Zones ===\n{}", top_zones);

    let fare_by_hour = aggregator::fare_by_hour(&filtered)?;
    info!("=== Average Fare by Hour ===\n{}", fare_by_hour);

    let breakdown = aggregator::payment_breakdown(&filtered, enriched)?;
    info!("=== Payment Type Breakdown ===\n{}", breakdown);

    let distances = aggregator::distance_distribution(enriched)?;
    info!("=== Trip Distance Distribution ===\n{}", distances.head(Some(10)));

    let heatmap = aggregator::day_hour_heatmap(&filtered)?;
    info!("=== Trips by Day and Hour ===\n{}", heatmap.head(Some(10)));

    info!("🎉 Pipeline run completed successfully");
    Ok(())
}
