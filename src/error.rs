// ABOUTME: Error types with structured exit codes for CLI
// ABOUTME: Separates transport, HTTP, envelope and upload failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status} on {endpoint}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("Remote error {code} on {endpoint}: {message}")]
    Remote {
        endpoint: String,
        code: i64,
        message: String,
    },

    #[error("Missing data in response from {endpoint}")]
    MissingData { endpoint: String },

    #[error("Upload failed for: {}", .failed.join(", "))]
    Upload { failed: Vec<String> },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Auth(_) => 2,
            Error::Network(_) => 3,
            Error::Api { .. } => 4,
            Error::Remote { .. } => 5,
            Error::MissingData { .. } => 6,
            Error::Upload { .. } => 7,
            Error::Parse(_) => 8,
            Error::Filesystem(_) => 9,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
