//! Configuration for speech synthesis

use serde::{Deserialize, Serialize};

use crate::languages;

/// Configuration for the synthesis provider and adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Language code sent with every request
    #[serde(default = "default_language")]
    pub language: String,

    /// Top-level domain of the Google host (`translate.google.<tld>`)
    #[serde(default = "default_tld")]
    pub tld: String,

    /// Request slower speech
    #[serde(default)]
    pub slow: bool,

    /// Endpoint override; derived from `tld` when unset
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum characters per synthesis request
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Reject languages missing from the language table
    #[serde(default = "default_language_check")]
    pub language_check: bool,
}

fn default_language() -> String {
    languages::DEFAULT_LANGUAGE.to_string()
}

fn default_tld() -> String {
    "com".to_string()
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_max_chunk_chars() -> usize {
    100
}

const fn default_language_check() -> bool {
    true
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            tld: default_tld(),
            slow: false,
            base_url: None,
            timeout_ms: default_timeout_ms(),
            max_chunk_chars: default_max_chunk_chars(),
            language_check: default_language_check(),
        }
    }
}

impl SpeechConfig {
    /// Base URL of the service, honouring the override
    #[must_use]
    pub fn endpoint_base(&self) -> String {
        self.base_url.as_deref().map_or_else(
            || format!("https://translate.google.{}", self.tld),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.tld.trim().is_empty() {
            return Err("Top-level domain must not be empty".to_string());
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.max_chunk_chars == 0 {
            return Err("Chunk size must be greater than 0".to_string());
        }

        if self.language_check && !languages::is_supported(&self.language) {
            return Err(format!("Language not supported: {}", self.language));
        }

        Ok(())
    }
}
