//! Configuration management for the relay.
//!
//! Tunables come from an optional TOML file with CLI/env overrides.
//! Secrets come only from the environment and are validated before the
//! server starts.

use std::path::Path;

use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use nova_common::constants::{
    CODE_TTL_SECS, DEFAULT_ALLOWED_ORIGINS, DEFAULT_DATA_FILE, DEFAULT_FALLBACK_URL,
    DEFAULT_LISTEN_ADDR, MAX_ASK_BODY_BYTES, MAX_TTL_SECS, SESSION_TTL_SECS, env, gemini,
};

/// Startup configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is unset or empty
    #[error("{0} is not set in environment variables.")]
    MissingEnv(&'static str),

    /// The configuration file exists but could not be loaded
    #[error("Failed to load config file: {0}")]
    File(#[from] config::ConfigError),

    /// The admin password could not be hashed
    #[error("Failed to hash APP_PASSWORD: {0}")]
    Hash(String),

    /// A TTL is zero or longer than the supported maximum
    #[error("{field} must be between 1 and {max} seconds, got {value}")]
    InvalidTtl {
        field: &'static str,
        value: u64,
        max: u64,
    },

    /// The session key was rejected by the MAC
    #[error("Invalid SECRET_KEY: {0}")]
    SecretKey(String),
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Flat append store location
    #[serde(default = "default_data_file")]
    pub data_file: String,

    /// Redirect target for unmatched routes
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Browser origins allowed by CORS
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Verification code validity in seconds
    #[serde(default = "default_code_ttl")]
    pub code_ttl_secs: u64,

    /// Article session validity in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Largest request body accepted by POST /ask
    #[serde(default = "default_max_ask_body")]
    pub max_ask_body_bytes: usize,

    /// Delegate service settings
    #[serde(default)]
    pub gemini: GeminiSettings,
}

/// Gemini-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Upstream request timeout in seconds
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_data_file() -> String { DEFAULT_DATA_FILE.to_string() }
fn default_fallback_url() -> String { DEFAULT_FALLBACK_URL.to_string() }
fn default_allowed_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
}
fn default_code_ttl() -> u64 { CODE_TTL_SECS } // 5 minutes
fn default_session_ttl() -> u64 { SESSION_TTL_SECS } // 30 minutes
fn default_max_ask_body() -> usize { MAX_ASK_BODY_BYTES }
fn default_model() -> String { gemini::DEFAULT_MODEL.to_string() }
fn default_api_base() -> String { gemini::API_BASE.to_string() }
fn default_gemini_timeout() -> u64 { gemini::DEFAULT_TIMEOUT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self, ConfigError> {
        let mut config = if Path::new(config_path).exists() {
            config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()?
                .try_deserialize()?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!("Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(ref data_file) = args.data_file {
            config.data_file = data_file.clone();
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the registries cannot represent
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ttl("code_ttl_secs", self.code_ttl_secs)?;
        check_ttl("session_ttl_secs", self.session_ttl_secs)
    }
}

fn check_ttl(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_TTL_SECS {
        return Err(ConfigError::InvalidTtl {
            field,
            value,
            max: MAX_TTL_SECS,
        });
    }
    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            data_file: default_data_file(),
            fallback_url: default_fallback_url(),
            allowed_origins: default_allowed_origins(),
            code_ttl_secs: default_code_ttl(),
            session_ttl_secs: default_session_ttl(),
            max_ask_body_bytes: default_max_ask_body(),
            gemini: GeminiSettings::default(),
        }
    }
}

/// Secrets read from the environment at startup
pub struct Secrets {
    /// Admin password guarding /data and /generate-code
    pub app_password: String,
    /// Delegate service key
    pub gemini_api_key: String,
    /// Session signing key
    pub secret_key: Vec<u8>,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Validate secrets from any name -> value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::MissingEnv(name))
        };

        let app_password = required(env::APP_PASSWORD)?;
        let gemini_api_key = required(env::GEMINI_API_KEY)?;

        let secret_key = match lookup(env::SECRET_KEY).filter(|value| !value.is_empty()) {
            Some(key) => key.into_bytes(),
            None => {
                tracing::warn!("SECRET_KEY not set, using an ephemeral session key");
                let mut bytes = vec![0u8; 32];
                rand::rng().fill(bytes.as_mut_slice());
                bytes
            }
        };

        Ok(Self {
            app_password,
            gemini_api_key,
            secret_key,
        })
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_password_is_rejected() {
        let err = Secrets::from_lookup(lookup_from(&[("GEMINI_API_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("APP_PASSWORD")));
        assert_eq!(err.to_string(), "APP_PASSWORD is not set in environment variables.");
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = Secrets::from_lookup(lookup_from(&[("APP_PASSWORD", "pw")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("GEMINI_API_KEY")));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let err = Secrets::from_lookup(lookup_from(&[
            ("APP_PASSWORD", ""),
            ("GEMINI_API_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("APP_PASSWORD")));
    }

    #[test]
    fn test_secret_key_defaults_to_random() {
        let lookup = lookup_from(&[("APP_PASSWORD", "pw"), ("GEMINI_API_KEY", "k")]);
        let a = Secrets::from_lookup(&lookup).unwrap();
        let b = Secrets::from_lookup(&lookup).unwrap();
        assert_eq!(a.secret_key.len(), 32);
        assert_ne!(a.secret_key, b.secret_key);

        let pinned = Secrets::from_lookup(lookup_from(&[
            ("APP_PASSWORD", "pw"),
            ("GEMINI_API_KEY", "k"),
            ("SECRET_KEY", "sk"),
        ]))
        .unwrap();
        assert_eq!(pinned.secret_key, b"sk".to_vec());
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.data_file, "data.json");
        assert_eq!(config.code_ttl_secs, 300);
        assert_eq!(config.allowed_origins.len(), 3);
        assert_eq!(config.gemini.model, "gemini-2.0-flash-exp");
        assert_eq!(config.max_ask_body_bytes, 32 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        let config = AppConfig {
            code_ttl_secs: u64::MAX,
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTtl { field: "code_ttl_secs", value: u64::MAX, .. }
        ));

        let config = AppConfig {
            session_ttl_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTtl { field: "session_ttl_secs", .. })
        ));

        let config = AppConfig {
            session_ttl_secs: MAX_TTL_SECS,
            ..AppConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
