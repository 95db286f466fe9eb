// src/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML preset: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("API key rejected: {detail}")]
    Unauthorized { detail: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// User-facing text for a failed operation. Server-provided detail wins
    /// when present; transport failures collapse to a generic connectivity
    /// message.
    pub fn surface(&self) -> String {
        match self {
            ClientError::Request(e) if e.is_decode() => {
                "Received an unexpected response from the prediction server".to_string()
            }
            ClientError::Request(_) => "Could not reach the prediction server".to_string(),
            ClientError::Api { detail, .. } | ClientError::Unauthorized { detail } => {
                if detail.trim().is_empty() {
                    "An error occurred".to_string()
                } else {
                    detail.clone()
                }
            }
            other => other.to_string(),
        }
    }

    /// True when the failure carried an HTTP response (as opposed to the
    /// request never reaching the server at all).
    pub fn received_response(&self) -> bool {
        matches!(
            self,
            ClientError::Api { .. } | ClientError::Unauthorized { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
