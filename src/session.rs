//! Session context. Configuration, the tiered store and the active
//! suggestion provider travel together in one struct that is passed to
//! whatever needs it, instead of living in process globals.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use crate::store::{COMPACT_BUDGET, TieredStore};
use crate::suggest::{HttpProvider, StaticProvider, SuggestionProvider};

const DEFAULT_RETRY_DELAY_MS: u64 = 300;

/// Runtime configuration for one engine session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Directory holding the compact and archive cache tiers
    pub cache_dir: PathBuf,
    /// Byte budget for a compact cache record
    pub compact_budget: usize,
    /// Suggestion endpoint URL; the static provider answers when unset
    pub suggest_endpoint: Option<String>,
    pub api_key: Option<String>,
    /// Pause before the single re-acquisition retry
    pub retry_delay_ms: u64,
}

impl SessionConfig {
    /// Read configuration from the environment, with platform defaults.
    pub fn from_env() -> Self {
        let cache_dir = std::env::var("FORMPROBE_CACHE_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_cache_dir);
        SessionConfig {
            cache_dir,
            compact_budget: COMPACT_BUDGET,
            suggest_endpoint: std::env::var("FORMPROBE_SUGGEST_URL").ok(),
            api_key: std::env::var("FORMPROBE_API_KEY").ok(),
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("formprobe"))
        .or_else(|| dirs::home_dir().map(|dir| dir.join(".formprobe")))
        .unwrap_or_else(|| std::env::temp_dir().join("formprobe"))
}

/// One engine session: store and provider bundled with the config
pub struct Session {
    pub id: uuid::Uuid,
    pub config: SessionConfig,
    pub store: TieredStore,
    pub provider: Box<dyn SuggestionProvider>,
}

impl Session {
    /// Open the on-disk cache tiers and build the configured provider.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let store = TieredStore::open(&config.cache_dir, config.compact_budget)?;
        let provider = build_provider(config.suggest_endpoint.as_deref(), config.api_key.clone())?;
        let id = uuid::Uuid::new_v4();
        debug!(
            "Session {id} caching under {}",
            config.cache_dir.display()
        );
        Ok(Session {
            id,
            config,
            store,
            provider,
        })
    }

    /// Session backed by an in-memory store, for tests and one-shot runs
    /// that should leave no cache behind.
    pub fn ephemeral(config: SessionConfig) -> Result<Self> {
        let store = TieredStore::in_memory(config.compact_budget);
        let provider = build_provider(config.suggest_endpoint.as_deref(), config.api_key.clone())?;
        Ok(Session {
            id: uuid::Uuid::new_v4(),
            config,
            store,
            provider,
        })
    }

    /// Swap the suggestion provider for a different endpoint or key.
    /// Passing `None` keeps the current value of that setting.
    pub fn reconfigure(&mut self, endpoint: Option<String>, api_key: Option<String>) -> Result<()> {
        if endpoint.is_some() {
            self.config.suggest_endpoint = endpoint;
        }
        if api_key.is_some() {
            self.config.api_key = api_key;
        }
        self.provider = build_provider(
            self.config.suggest_endpoint.as_deref(),
            self.config.api_key.clone(),
        )?;
        info!("Suggestion provider is now '{}'", self.provider.kind());
        Ok(())
    }
}

fn build_provider(
    endpoint: Option<&str>,
    api_key: Option<String>,
) -> Result<Box<dyn SuggestionProvider>> {
    match endpoint {
        Some(url) => Ok(Box::new(HttpProvider::new(url, api_key)?)),
        None => Ok(Box::new(StaticProvider)),
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
