//! Error types for weather requests and favorites persistence.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    /// The request or its response body could not be transferred.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The HTTP client itself could not be set up; no request was sent.
    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("No weather data found for '{0}'")]
    NotFound(String),

    #[error("Weather API responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed weather API response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}
