//! Application state shared across all handlers.

use std::sync::Arc;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use rand::RngCore;
use tracing::{info, warn};

use magpie_core::{ArchiveStore, DownloadEngine, ImageFetcher, TaskRegistry};

use super::config::Configuration;

/// Application state shared across all handlers.
///
/// Built once at startup and handed to the HTTP server as `web::Data`.
pub struct AppState {
    pub configuration: Configuration,
    /// Base64-encoded JWT signing secret.
    pub token_secret: String,
    /// Bcrypt hash of the configured password.
    pub password_hash: String,
    pub registry: Arc<TaskRegistry>,
    pub store: ArchiveStore,
    pub engine: Arc<DownloadEngine>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("configuration", &self.configuration)
            .field("token_secret", &"<redacted>")
            .field("password_hash", &"<redacted>")
            .field("registry", &"<TaskRegistry>")
            .field("store", &self.store)
            .field("engine", &"<DownloadEngine>")
            .finish()
    }
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            configuration: self.configuration.clone(),
            token_secret: self.token_secret.clone(),
            password_hash: self.password_hash.clone(),
            registry: self.registry.clone(),
            store: self.store.clone(),
            engine: self.engine.clone(),
        }
    }
}

impl AppState {
    /// Assemble the full application state from configuration.
    ///
    /// Resolves the token secret and password hash, then wires the registry,
    /// archive store and download engine together.
    pub fn build(
        configuration: Configuration,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> anyhow::Result<Arc<Self>> {
        let token_secret = resolve_token_secret(&configuration);
        let password_hash = resolve_password_hash(&configuration)?;

        let registry = Arc::new(TaskRegistry::new());
        let store = ArchiveStore::new(configuration.tmp_dir());
        let engine = Arc::new(DownloadEngine::new(
            fetcher,
            registry.clone(),
            store.clone(),
            configuration.max_concurrent_tasks(),
        ));

        Ok(Arc::new(Self {
            configuration,
            token_secret,
            password_hash,
            registry,
            store,
            engine,
        }))
    }
}

/// Resolve the JWT signing secret into base64 form.
///
/// A configured value that already is valid base64 is used verbatim; any
/// other value is treated as raw bytes. Without a configured secret a random
/// one is generated, which invalidates sessions on restart.
fn resolve_token_secret(configuration: &Configuration) -> String {
    match configuration.token_secret_key() {
        Some(secret) if !secret.is_empty() => {
            if BASE64.decode(&secret).is_ok() {
                secret
            } else {
                info!("SECRET_KEY is not base64, treating it as raw bytes");
                BASE64.encode(secret.as_bytes())
            }
        }
        _ => {
            warn!("SECRET_KEY not set, using an ephemeral secret; logins will not survive a restart");
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            BASE64.encode(bytes)
        }
    }
}

/// Bcrypt hash for the configured password.
///
/// A value that already looks like a bcrypt hash is kept as-is, so operators
/// can configure a hash instead of a cleartext password.
fn resolve_password_hash(configuration: &Configuration) -> anyhow::Result<String> {
    let password = configuration.app_password();
    if password.starts_with("$2") {
        Ok(password)
    } else {
        Ok(bcrypt::hash(&password, bcrypt::DEFAULT_COST)?)
    }
}
