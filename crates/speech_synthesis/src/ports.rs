//! Port definitions for speech synthesis
//!
//! Defines the trait (port) that synthesis adapters call into.

use async_trait::async_trait;

use crate::error::SynthesisError;
use crate::types::AudioData;

/// Port for an external text-to-speech capability
///
/// Implementations convert text plus a language code into encoded audio.
///
/// # Example
///
/// ```ignore
/// use speech_synthesis::SpeechSynthesizer;
///
/// async fn speak(tts: &impl SpeechSynthesizer) -> Result<Vec<u8>, SynthesisError> {
///     let audio = tts.synthesize("Hello", "en").await?;
///     Ok(audio.into_data())
/// }
/// ```
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Convert text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize, never empty
    /// * `language` - Language code (e.g., "en", "de", "zh-CN")
    ///
    /// # Errors
    ///
    /// Returns `SynthesisError` if the capability cannot produce audio.
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioData, SynthesisError>;

    /// Name of the provider, for logs
    fn provider_name(&self) -> &str;
}
