pub mod aggregator;
pub mod cleaner;
pub mod enricher;
pub mod filter_engine;
pub mod schema_validator;
