use thiserror::Error;

/// Failures talking to the scheduling service
#[derive(Debug, Error)]
pub enum PcoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{context} failed with status {status}")]
    Status { context: &'static str, status: u16 },

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
