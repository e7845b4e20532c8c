/// Terminal pipeline failures. Both variants halt the session: there is no
/// retry policy, a fresh process run is required.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to download {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },
    #[error("required columns missing from trip data: {}", missing.join(", "))]
    Schema { missing: Vec<String> },
}
