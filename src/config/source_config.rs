use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Locations of the two reference files: remote URL plus the file name the
/// cached copy gets under the raw data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub raw_data_dir: PathBuf,
    pub trips: SourceEntry,
    pub zones: SourceEntry,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            raw_data_dir: PathBuf::from("data/raw"),
            trips: SourceEntry {
                url: "https://d37ci6vzurychx.cloudfront.net/trip-data/yellow_tripdata_2024-01.parquet"
                    .to_string(),
                file_name: "yellow_taxi.parquet".to_string(),
            },
            zones: SourceEntry {
                url: "https://d37ci6vzurychx.cloudfront.net/misc/taxi_zone_lookup.csv".to_string(),
                file_name: "taxi_lookup.csv".to_string(),
            },
        }
    }
}

impl SourceConfig {
    pub fn from_file(path: &str) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: SourceConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn trips_path(&self) -> PathBuf {
        self.trips.local_path(&self.raw_data_dir)
    }

    pub fn zones_path(&self) -> PathBuf {
        self.zones.local_path(&self.raw_data_dir)
    }
}

impl SourceEntry {
    pub fn local_path(&self, raw_data_dir: &Path) -> PathBuf {
        raw_data_dir.join(&self.file_name)
    }
}
