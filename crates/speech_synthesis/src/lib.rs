//! Speech Synthesis - text to MP3 files
//!
//! Converts text into spoken audio through an external text-to-speech
//! service and stores the result at a caller-chosen path.
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` defines the `SpeechSynthesizer` trait (the external capability)
//! - `providers` contains concrete implementations (Google Translate)
//! - `adapter` applies the input rules and persists the audio
//! - `bridge` exposes the adapter to a host application as method calls
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use speech_synthesis::{GoogleTranslateProvider, SpeechConfig, SynthesisAdapter};
//!
//! let provider = GoogleTranslateProvider::new(SpeechConfig::default())?;
//! let adapter = SynthesisAdapter::new(Arc::new(provider));
//!
//! let path = adapter.synthesize("Hello world", "/tmp/out.mp3").await?;
//! assert_eq!(path, "/tmp/out.mp3");
//! ```

pub mod adapter;
pub mod bridge;
pub mod config;
pub mod error;
pub mod languages;
pub mod output;
pub mod ports;
pub mod providers;
pub mod tokenizer;
pub mod types;

pub use adapter::{EMPTY_TEXT_PLACEHOLDER, SynthesisAdapter};
pub use bridge::{
    HOST_SYNTHESIZE_METHOD, MethodCall, MethodChannel, MethodResponse, SYNTHESIZE_METHOD,
};
pub use config::SpeechConfig;
pub use error::{SpeechError, SynthesisError};
pub use ports::SpeechSynthesizer;
pub use providers::google_translate::GoogleTranslateProvider;
pub use types::{AudioData, AudioFormat};
