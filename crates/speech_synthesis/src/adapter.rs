//! Synthesis adapter
//!
//! Turns text into an MP3 file at a caller-chosen path.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::SpeechConfig;
use crate::error::{SpeechError, SynthesisError};
use crate::languages::DEFAULT_LANGUAGE;
use crate::output;
use crate::ports::SpeechSynthesizer;
use crate::providers::google_translate::GoogleTranslateProvider;

/// Text sent in place of empty input
pub const EMPTY_TEXT_PLACEHOLDER: &str = " ";

/// Writes synthesized speech for a text to a file
///
/// Stateless apart from its configuration; calls may run concurrently
/// as long as their destination paths differ.
#[derive(Clone)]
pub struct SynthesisAdapter {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    language: String,
}

impl fmt::Debug for SynthesisAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SynthesisAdapter")
            .field("provider", &self.synthesizer.provider_name())
            .field("language", &self.language)
            .finish()
    }
}

impl SynthesisAdapter {
    /// Create an adapter speaking the default language (`"en"`)
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    /// Build an adapter over the Google Translate provider
    ///
    /// The adapter speaks the configured language.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn from_config(config: SpeechConfig) -> Result<Self, SpeechError> {
        let language = config.language.clone();
        let provider = GoogleTranslateProvider::new(config)?;
        Ok(Self::new(Arc::new(provider)).with_language(language))
    }

    /// Use a different language code
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Language code sent with every request
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Synthesize `text` and write the MP3 audio to `path`
    ///
    /// Empty text is replaced by a single space. An existing file at
    /// `path` is overwritten. Returns `path` unchanged.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Synthesis` if no audio could be produced, in
    /// which case the file system is untouched, and `SpeechError::Write`
    /// if the audio could not be stored at `path`.
    #[instrument(skip(self, text, path), fields(text_len = text.len(), language = %self.language))]
    pub async fn synthesize<P>(&self, text: &str, path: P) -> Result<P, SpeechError>
    where
        P: AsRef<Path> + Send,
    {
        let text = if text.is_empty() {
            EMPTY_TEXT_PLACEHOLDER
        } else {
            text
        };

        let audio = self.synthesizer.synthesize(text, &self.language).await?;
        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio.into());
        }

        let size = audio.size_bytes();
        output::write_atomically(path.as_ref(), audio.into_data()).await?;

        info!(
            path = %path.as_ref().display(),
            audio_size = size,
            provider = self.synthesizer.provider_name(),
            "Speech saved"
        );
        Ok(path)
    }
}
