use polars::prelude::*;

use crate::error::PipelineError;
use crate::models::trip::REQUIRED_COLUMNS;

/// Check the loaded trip table against the expected upstream schema. Every
/// missing column is collected so the error names them all in one pass.
pub fn validate(df: &DataFrame) -> Result<(), PipelineError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema { missing })
    }
}
