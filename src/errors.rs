use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("query window is empty or inverted: start {start} is not before end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("NVD unreachable after {attempts} attempts: {reason}")]
    Exhausted { attempts: u32, reason: String },

    #[error("NVD rejected the query with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("NVD response is not valid JSON: {0}")]
    Decode(String),

    #[error("NVD request could not be built: {0}")]
    Request(String),
}

impl FetchError {
    /// Transient failures are worth another try on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Exhausted { .. })
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("posting API returned HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },

    #[error("posting API transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetch failed, skipping this cycle: {0}")]
    Fetch(#[from] FetchError),
}

impl CycleError {
    pub fn is_transient(&self) -> bool {
        match self {
            CycleError::Fetch(e) => e.is_transient(),
        }
    }
}
