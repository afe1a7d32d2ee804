//! Configuration module for the voicebridge server
//!
//! Configuration is loaded from environment variables (with `.env` support
//! via dotenvy in `main`). Two secrets are required and the process refuses
//! to start without them:
//!
//! - `OPENAI_API_KEY` - used by the translation adapter
//! - `GOOGLE_APPLICATION_CREDENTIALS` - service-account file used by the
//!   speech recognition and synthesis adapters
//!
//! Everything else has a default.
//!
//! # Example
//! ```rust,no_run
//! use voicebridge::config::ServerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Default HTTP/WebSocket port (matches the original deployment)
const DEFAULT_PORT: u16 = 5000;

/// Default translation model for the OpenAI adapter
const DEFAULT_TRANSLATION_MODEL: &str = "gpt-3.5-turbo";

/// Default source language for a new session, before any config message
const DEFAULT_SOURCE_LANGUAGE: &str = "en-US";

/// Default target language for a new session, before any config message
const DEFAULT_TARGET_LANGUAGE: &str = "hi-IN";

/// Default bound on each external call (translate, synthesize)
const DEFAULT_EXTERNAL_CALL_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading or validating startup configuration.
///
/// All of these are fatal: the process exits instead of starting with a
/// partially usable pipeline.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// An environment variable is set but cannot be parsed
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    /// Credentials could not be resolved at startup
    #[error("credential error: {0}")]
    Credentials(String),
}

/// Server configuration
///
/// Contains everything needed to run the voicebridge server: bind address,
/// the two required provider secrets, pipeline policy knobs and the static
/// client directory.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    /// OpenAI API key for the translation adapter
    pub openai_api_key: String,
    /// Path to the Google service-account JSON used by the STT/TTS adapters
    pub google_credentials: PathBuf,

    /// Chat-completions model used for translation
    pub translation_model: String,

    /// Language pair a session starts with, before any config message
    pub default_source_language: String,
    pub default_target_language: String,

    /// Whether interim (non-final) transcripts are run through the
    /// translate/synthesize pipeline. Off by default: only final results
    /// are translated and delivered.
    pub translate_interim_results: bool,

    /// Bound applied to each external translate/synthesize call
    pub external_call_timeout_secs: u64,

    /// Comma-separated allowed CORS origins, or "*" for any.
    /// None means same-origin only.
    pub cors_allowed_origins: Option<String>,

    /// Directory holding the compiled browser client
    pub client_build_dir: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails with [`ConfigError`] when a required secret is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key =
            require_env("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
        let google_credentials = require_env("GOOGLE_APPLICATION_CREDENTIALS")
            .ok_or(ConfigError::MissingVar("GOOGLE_APPLICATION_CREDENTIALS"))?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidVar {
                name: "PORT",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let external_call_timeout_secs = match std::env::var("EXTERNAL_CALL_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidVar {
                name: "EXTERNAL_CALL_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_EXTERNAL_CALL_TIMEOUT_SECS,
        };

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port,
            openai_api_key,
            google_credentials: PathBuf::from(google_credentials),
            translation_model: env_or("OPENAI_TRANSLATION_MODEL", DEFAULT_TRANSLATION_MODEL),
            default_source_language: env_or("DEFAULT_SOURCE_LANGUAGE", DEFAULT_SOURCE_LANGUAGE),
            default_target_language: env_or("DEFAULT_TARGET_LANGUAGE", DEFAULT_TARGET_LANGUAGE),
            translate_interim_results: env_flag("TRANSLATE_INTERIM_RESULTS"),
            external_call_timeout_secs,
            cors_allowed_origins: require_env("CORS_ALLOWED_ORIGINS"),
            client_build_dir: PathBuf::from(env_or("CLIENT_BUILD_DIR", "client/build")),
        })
    }

    /// Bind address in `host:port` form
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Bound applied to each external call as a [`std::time::Duration`]
    pub fn external_call_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.external_call_timeout_secs)
    }

    /// Fixed configuration for unit and integration tests. Binds to an
    /// ephemeral local port and carries placeholder secrets.
    #[doc(hidden)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            openai_api_key: "test_openai_key".to_string(),
            google_credentials: PathBuf::from("/tmp/creds.json"),
            translation_model: DEFAULT_TRANSLATION_MODEL.to_string(),
            default_source_language: DEFAULT_SOURCE_LANGUAGE.to_string(),
            default_target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            translate_interim_results: false,
            external_call_timeout_secs: DEFAULT_EXTERNAL_CALL_TIMEOUT_SECS,
            cors_allowed_origins: Some("*".to_string()),
            client_build_dir: PathBuf::from("client/build"),
        }
    }
}

/// Read an env var, treating empty strings as unset
fn require_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn env_or(name: &str, default: &str) -> String {
    require_env(name).unwrap_or_else(|| default.to_string())
}

/// Boolean env flag: "1", "true", "yes" (case-insensitive) enable it
fn env_flag(name: &str) -> bool {
    matches!(
        require_env(name).as_deref().map(str::to_ascii_lowercase),
        Some(ref v) if v == "1" || v == "true" || v == "yes"
    )
}
