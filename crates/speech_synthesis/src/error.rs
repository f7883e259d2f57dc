//! Speech synthesis errors

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the external synthesis capability
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Failed to connect to the synthesis service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the synthesis service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The service did not answer in time
    #[error("Synthesis request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The service answered with a non-success status
    #[error("Service rejected request with HTTP {status}: {cause}")]
    ServiceRejected {
        /// HTTP status code
        status: u16,
        /// Probable cause inferred from the status
        cause: String,
    },

    /// The response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Language code not accepted by the service
    #[error("Language not supported: {0}")]
    UnsupportedLanguage(String),

    /// The service returned no audio bytes
    #[error("Service returned empty audio")]
    EmptyAudio,
}

impl From<reqwest::Error> for SynthesisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

/// Errors returned by the synthesis adapter
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The synthesis capability could not produce audio
    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// The destination path could not be written
    #[error("Failed to write audio to {}: {source}", path.display())]
    Write {
        /// Destination that was being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SpeechError {
    /// Stable error code for host-facing responses
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Synthesis(_) => "SYNTHESIS_ERROR",
            Self::Write { .. } => "WRITE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
