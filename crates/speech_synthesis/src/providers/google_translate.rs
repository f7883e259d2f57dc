//! Google Translate Speech Provider
//!
//! Implements `SpeechSynthesizer` using the speech RPC of the Google
//! Translate web client.
//!
//! # Protocol
//!
//! Each chunk of text is sent as a form-encoded `batchexecute` call
//! (RPC id `jQ1olc`). The reply is a line-oriented envelope; the line
//! carrying the RPC id holds the MP3 audio as base64. Chunk replies are
//! concatenated into one MP3 stream.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::{SpeechError, SynthesisError};
use crate::languages;
use crate::ports::SpeechSynthesizer;
use crate::tokenizer;
use crate::types::{AudioData, AudioFormat, looks_like_mp3};

/// RPC identifier of the speech call
const RPC_ID: &str = "jQ1olc";

const BATCHEXECUTE_PATH: &str = "/_/TranslateWebserverUi/data/batchexecute";

/// Start of the audio payload inside the reply line
const AUDIO_PREFIX: &str = r#"jQ1olc","[\""#;

/// End of the audio payload inside the reply line
const AUDIO_SUFFIX: &str = r#"\"]"#;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/47.0.2526.106 Safari/537.36";

/// Speech provider backed by Google Translate
#[derive(Debug, Clone)]
pub struct GoogleTranslateProvider {
    client: Client,
    config: SpeechConfig,
}

impl GoogleTranslateProvider {
    /// Create a new Google Translate speech provider
    ///
    /// # Arguments
    ///
    /// * `config` - Speech configuration
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_static("http://translate.google.com/"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    fn rpc_url(&self) -> String {
        format!("{}{BATCHEXECUTE_PATH}", self.config.endpoint_base())
    }

    /// Build the `f.req` form value for one chunk
    fn package_rpc(&self, text: &str, language: &str) -> String {
        let speed = if self.config.slow {
            Value::Bool(true)
        } else {
            Value::Null
        };
        let parameter = json!([text, language, speed, "null"]).to_string();
        json!([[[RPC_ID, parameter, null, "generic"]]]).to_string()
    }

    fn resolve_language(&self, language: &str) -> Result<String, SynthesisError> {
        if !self.config.language_check {
            return Ok(language.to_string());
        }

        languages::canonical_code(language)
            .map(str::to_string)
            .ok_or_else(|| SynthesisError::UnsupportedLanguage(language.to_string()))
    }

    /// Probable cause of a failed request
    fn infer_cause(&self, status: StatusCode, language: &str) -> String {
        match status.as_u16() {
            403 => "Bad token or upstream API changes".to_string(),
            404 if self.config.tld != "com" => {
                format!("Unsupported tld '{}'", self.config.tld)
            },
            200 if !self.config.language_check => {
                format!("No audio stream in response. Unsupported language '{language}'")
            },
            500.. => "Upstream API error. Try again later.".to_string(),
            _ => "Unexpected response from speech service".to_string(),
        }
    }

    #[instrument(skip(self, chunk), fields(chunk_len = chunk.chars().count()))]
    async fn request_chunk(
        &self,
        chunk: &str,
        language: &str,
    ) -> Result<Vec<u8>, SynthesisError> {
        let rpc = self.package_rpc(chunk, language);

        let response = self
            .client
            .post(self.rpc_url())
            .form(&[("f.req", rpc.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SynthesisError::RateLimited);
        }
        if !status.is_success() {
            let cause = self.infer_cause(status, language);
            warn!(status = status.as_u16(), %cause, "Speech request rejected");
            return Err(SynthesisError::ServiceRejected {
                status: status.as_u16(),
                cause,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read reply: {e}")))?;

        match extract_audio(&body)? {
            Some(audio) if !audio.is_empty() && !looks_like_mp3(&audio) => Err(
                SynthesisError::InvalidResponse("Audio payload is not an MP3 stream".to_string()),
            ),
            Some(audio) => Ok(audio),
            None if !self.config.language_check => Err(SynthesisError::ServiceRejected {
                status: status.as_u16(),
                cause: self.infer_cause(status, language),
            }),
            None => Err(SynthesisError::InvalidResponse(
                "No audio stream in response".to_string(),
            )),
        }
    }
}

/// Find and decode the audio payload of a `batchexecute` reply
fn extract_audio(body: &str) -> Result<Option<Vec<u8>>, SynthesisError> {
    for line in body.lines().filter(|line| line.contains(RPC_ID)) {
        let Some(start) = line.find(AUDIO_PREFIX) else {
            continue;
        };
        let payload = &line[start + AUDIO_PREFIX.len()..];
        let Some(end) = payload.find(AUDIO_SUFFIX) else {
            continue;
        };

        let audio = STANDARD
            .decode(&payload[..end])
            .map_err(|e| SynthesisError::InvalidResponse(format!("Invalid audio encoding: {e}")))?;
        return Ok(Some(audio));
    }

    Ok(None)
}

#[async_trait]
impl SpeechSynthesizer for GoogleTranslateProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), language = %language))]
    async fn synthesize(&self, text: &str, language: &str) -> Result<AudioData, SynthesisError> {
        let language = self.resolve_language(language)?;

        let mut chunks = tokenizer::tokenize(text, self.config.max_chunk_chars);
        if chunks.is_empty() {
            // Nothing speakable survived cleanup; send the input as is.
            chunks.push(text.chars().take(self.config.max_chunk_chars).collect());
        }

        debug!(chunks = chunks.len(), slow = self.config.slow, "Synthesizing speech");

        let mut audio = AudioData::new(Vec::new(), AudioFormat::Mp3);
        for chunk in &chunks {
            let bytes = self.request_chunk(chunk, &language).await?;
            audio.append(AudioData::new(bytes, AudioFormat::Mp3));
        }

        if audio.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        debug!(audio_size = audio.size_bytes(), "Speech synthesis complete");
        Ok(audio)
    }

    fn provider_name(&self) -> &str {
        "google-translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MP3_FRAME: [u8; 8] = [0xFF, 0xFB, 0x90, 0x00, 0x00, 0x00, 0x00, 0x00];

    fn reply_with_audio(audio: &[u8]) -> String {
        let encoded = STANDARD.encode(audio);
        format!(
            ")]}}'\n\n104\n[[\"wrb.fr\",\"jQ1olc\",\"[\\\"{encoded}\\\"]\",null,null,null,\"generic\"]]\n25\n[[\"e\",4,null,null,140]]\n"
        )
    }

    fn create_test_provider(
        mock_server: &MockServer,
        config: SpeechConfig,
    ) -> GoogleTranslateProvider {
        GoogleTranslateProvider::new(SpeechConfig {
            base_url: Some(mock_server.uri()),
            timeout_ms: 5000,
            ..config
        })
        .unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        let config = SpeechConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            GoogleTranslateProvider::new(config),
            Err(SpeechError::Configuration(_))
        ));
    }

    #[test]
    fn rpc_url_uses_tld() {
        let provider = GoogleTranslateProvider::new(SpeechConfig {
            tld: "de".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            provider.rpc_url(),
            "https://translate.google.de/_/TranslateWebserverUi/data/batchexecute"
        );
    }

    #[test]
    fn package_rpc_nests_escaped_parameters() {
        let provider = GoogleTranslateProvider::new(SpeechConfig::default()).unwrap();
        assert_eq!(
            provider.package_rpc("Hi \"there\"", "en"),
            r#"[[["jQ1olc","[\"Hi \\\"there\\\"\",\"en\",null,\"null\"]",null,"generic"]]]"#
        );
    }

    #[test]
    fn package_rpc_marks_slow_speech() {
        let provider = GoogleTranslateProvider::new(SpeechConfig {
            slow: true,
            ..Default::default()
        })
        .unwrap();
        assert!(provider.package_rpc("Hi", "en").contains(r#"\"en\",true,"#));
    }

    #[test]
    fn extract_audio_decodes_payload() {
        let audio = extract_audio(&reply_with_audio(&MP3_FRAME)).unwrap();
        assert_eq!(audio, Some(MP3_FRAME.to_vec()));
    }

    #[test]
    fn extract_audio_without_payload_is_none() {
        let body = ")]}'\n\n[[\"wrb.fr\",\"jQ1olc\",null,null,null,[3],\"generic\"]]\n";
        assert_eq!(extract_audio(body).unwrap(), None);
    }

    #[test]
    fn extract_audio_rejects_bad_base64() {
        let body = "[[\"wrb.fr\",\"jQ1olc\",\"[\\\"***\\\"]\",null]]";
        assert!(matches!(
            extract_audio(body),
            Err(SynthesisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn infer_cause_explains_common_statuses() {
        let provider = GoogleTranslateProvider::new(SpeechConfig {
            tld: "xyz".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            provider.infer_cause(StatusCode::FORBIDDEN, "en"),
            "Bad token or upstream API changes"
        );
        assert_eq!(
            provider.infer_cause(StatusCode::NOT_FOUND, "en"),
            "Unsupported tld 'xyz'"
        );
        assert_eq!(
            provider.infer_cause(StatusCode::BAD_GATEWAY, "en"),
            "Upstream API error. Try again later."
        );
    }

    #[tokio::test]
    async fn synthesize_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .and(header("referer", "http://translate.google.com/"))
            .and(body_string_contains("f.req="))
            .and(body_string_contains(RPC_ID))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(&MP3_FRAME)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let audio = provider.synthesize("Hello world", "en").await.unwrap();

        assert_eq!(audio.data(), MP3_FRAME);
        assert_eq!(audio.format(), AudioFormat::Mp3);
        assert!(looks_like_mp3(audio.data()));
    }

    #[tokio::test]
    async fn synthesize_sends_language_and_speed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .and(body_string_contains("%5C%22de%5C%22%2Ctrue%2C"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(&MP3_FRAME)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(
            &mock_server,
            SpeechConfig {
                slow: true,
                ..Default::default()
            },
        );

        assert!(provider.synthesize("Hallo Welt", "DE").await.is_ok());
    }

    #[tokio::test]
    async fn synthesize_concatenates_chunks() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(&MP3_FRAME)))
            .expect(2)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(
            &mock_server,
            SpeechConfig {
                max_chunk_chars: 12,
                ..Default::default()
            },
        );

        let audio = provider
            .synthesize("First chunk. Second chunk.", "en")
            .await
            .unwrap();

        assert_eq!(audio.size_bytes(), MP3_FRAME.len() * 2);
    }

    #[tokio::test]
    async fn synthesize_whitespace_sends_input_as_is() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .and(body_string_contains("%5B%5C%22+%5C%22"))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(&MP3_FRAME)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        assert!(provider.synthesize(" ", "en").await.is_ok());
    }

    #[tokio::test]
    async fn synthesize_unspeakable_input_is_capped_to_one_chunk() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(&MP3_FRAME)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(
            &mock_server,
            SpeechConfig {
                max_chunk_chars: 100,
                ..Default::default()
            },
        );

        provider.synthesize(&".".repeat(300), "en").await.unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body = String::from_utf8(requests[0].body.clone()).unwrap();
        assert!(body.contains(&".".repeat(100)));
        assert!(!body.contains(&".".repeat(101)));
    }

    #[tokio::test]
    async fn synthesize_rejects_non_mp3_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(b"<html>")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let result = provider.synthesize("Hello", "en").await;

        assert!(matches!(result, Err(SynthesisError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn synthesize_rejects_unknown_language() {
        let mock_server = MockServer::start().await;
        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let result = provider.synthesize("Hello", "xx").await;

        assert!(matches!(
            result,
            Err(SynthesisError::UnsupportedLanguage(lang)) if lang == "xx"
        ));
    }

    #[tokio::test]
    async fn synthesize_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let result = provider.synthesize("Hello", "en").await;

        assert!(matches!(result, Err(SynthesisError::RateLimited)));
    }

    #[tokio::test]
    async fn synthesize_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let result = provider.synthesize("Hello", "en").await;

        assert!(matches!(
            result,
            Err(SynthesisError::ServiceRejected { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn synthesize_reply_without_audio() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n\n[]\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let result = provider.synthesize("Hello", "en").await;

        assert!(matches!(result, Err(SynthesisError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn synthesize_unchecked_language_without_audio() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n\n[]\n"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(
            &mock_server,
            SpeechConfig {
                language_check: false,
                ..Default::default()
            },
        );

        let result = provider.synthesize("Hello", "xx").await;

        assert!(matches!(
            result,
            Err(SynthesisError::ServiceRejected { status: 200, cause }) if cause.contains("'xx'")
        ));
    }

    #[tokio::test]
    async fn synthesize_empty_audio_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(BATCHEXECUTE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string(reply_with_audio(&[])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_test_provider(&mock_server, SpeechConfig::default());

        let result = provider.synthesize("Hello", "en").await;

        assert!(matches!(result, Err(SynthesisError::EmptyAudio)));
    }
}
