//! Configuration loading
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML
//! file, then `LOGOS_TTS_*` environment variables.

use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use speech_synthesis::SpeechConfig;

/// Prefix of configuration environment variables (e.g. `LOGOS_TTS_LANGUAGE`)
pub const ENV_PREFIX: &str = "LOGOS_TTS";

/// Load the speech configuration from file and environment
pub fn load(file: Option<&Path>) -> Result<SpeechConfig, ConfigError> {
    load_with_env(file, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env(file: Option<&Path>, env: Environment) -> Result<SpeechConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(file) = file {
        builder = builder.add_source(File::from(file).format(FileFormat::Toml).required(true));
    }

    builder
        .add_source(env.try_parsing(true))
        .build()?
        .try_deserialize()
}
