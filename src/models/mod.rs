pub mod filter;
pub mod trip;

pub use filter::FilterCriteria;
pub use trip::TripRecord;
