//! Application state and shared resources.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::auth::CredentialChecker;
use crate::codes::CodeRegistry;
use crate::config::{AppConfig, ConfigError, Secrets};
use crate::delegate::{Delegate, GeminiDelegate};
use crate::session::ArticleSessions;
use crate::store::FlatStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Admin credential (salted hash)
    pub credentials: Arc<CredentialChecker>,

    /// Live one-time verification codes
    pub codes: Arc<CodeRegistry>,

    /// Flat append log
    pub store: Arc<FlatStore>,

    /// Generation service
    pub delegate: Arc<dyn Delegate>,

    /// Article context per client
    pub sessions: Arc<ArticleSessions>,

    /// Runtime switch for /ask
    ask_enabled: Arc<AtomicBool>,
}

impl AppState {
    /// Build state for the production server, talking to Gemini
    pub fn new(config: AppConfig, secrets: Secrets) -> anyhow::Result<Self> {
        let delegate = Arc::new(GeminiDelegate::new(&config.gemini, secrets.gemini_api_key.clone())?);
        let credentials = CredentialChecker::from_secret(&secrets.app_password)
            .map_err(|e| ConfigError::Hash(e.to_string()))?;

        Ok(Self::with_parts(config, credentials, &secrets.secret_key, delegate)?)
    }

    /// Assemble state from already-built parts
    pub fn with_parts(
        config: AppConfig,
        credentials: CredentialChecker,
        secret_key: &[u8],
        delegate: Arc<dyn Delegate>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sessions = ArticleSessions::new(secret_key, config.session_ttl_secs)
            .map_err(|e| ConfigError::SecretKey(e.to_string()))?;

        Ok(Self {
            codes: Arc::new(CodeRegistry::new(config.code_ttl_secs)),
            store: Arc::new(FlatStore::new(&config.data_file)),
            credentials: Arc::new(credentials),
            sessions: Arc::new(sessions),
            delegate,
            config: Arc::new(config),
            ask_enabled: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Whether /ask currently accepts queries
    pub fn ask_enabled(&self) -> bool {
        self.ask_enabled.load(Ordering::SeqCst)
    }

    pub fn set_ask_enabled(&self, enabled: bool) {
        self.ask_enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(enabled, "Ask endpoint toggled");
    }
}
