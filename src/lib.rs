pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod processor;
pub mod session;

pub use config::SourceConfig;
pub use error::PipelineError;
pub use models::{FilterCriteria, TripRecord};
pub use session::TaxiSession;
