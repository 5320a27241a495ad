use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{chat::errors::ChatError, store::KeyValueStore};

/// Storage key of the chat configuration
pub const CONFIG_KEY: &str = "openai-config";
/// Base URL offered when none is configured
pub static DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Credentials and endpoint of an OpenAI-compatible API, kept on this device only
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatConfig {
    #[serde(rename = "apiKey")]
    pub api_key: String,
    #[serde(rename = "baseURL")]
    pub base_url: String,
}

impl ChatConfig {
    /// Build a config, rejecting blank values
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self, ChatError> {
        let api_key = api_key.trim();
        let base_url = base_url.unwrap_or(DEFAULT_BASE_URL).trim();

        if api_key.is_empty() {
            return Err(ChatError::Config("API key is required".to_string()));
        }
        if base_url.is_empty() {
            return Err(ChatError::Config("Base URL is required".to_string()));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Stored configuration with the given overrides applied on top. An API key from either
    /// source is required.
    pub fn resolve(
        store: &impl KeyValueStore,
        api_key: Option<&str>,
        base_url: Option<&str>,
    ) -> Result<Self, ChatError> {
        let stored = Self::load(store);
        let api_key = api_key
            .or(stored.as_ref().map(|c| c.api_key.as_str()))
            .ok_or(ChatError::NotConfigured)?;
        let base_url = base_url.or(stored.as_ref().map(|c| c.base_url.as_str()));

        Self::new(api_key, base_url)
    }

    /// Stored configuration; unreadable entries count as absent
    pub fn load(store: &impl KeyValueStore) -> Option<Self> {
        let raw = match store.get(CONFIG_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                error!(%e, "Error reading chat configuration");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| error!(%e, "Error parsing chat configuration"))
            .ok()
    }

    pub fn save(&self, store: &impl KeyValueStore) -> Result<(), ChatError> {
        store.set(CONFIG_KEY, &serde_json::to_string(self)?)?;
        debug!(base_url = %self.base_url, "Chat configuration saved");
        Ok(())
    }
}
