use leptos::logging::log;
use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, CONFIG_SLOT};

pub const DEFAULT_PARKS_ENDPOINT: &str = "https://developer.nps.gov/api/v1";
pub const DEFAULT_GENERATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Application settings. Every field falls back to its default, so a saved
/// document only needs the values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub parks_endpoint: String,
    pub generative_endpoint: String,
    pub model: String,
    pub default_keyword: String,
    pub default_limit: u32,
    pub max_limit: u32,
    pub shown_results: usize,
    pub starter_prompt: String,
    pub greeting: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            parks_endpoint: DEFAULT_PARKS_ENDPOINT.to_string(),
            generative_endpoint: DEFAULT_GENERATIVE_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            default_keyword: "Yosemite".to_string(),
            default_limit: 8,
            max_limit: 50,
            shown_results: 8,
            starter_prompt: "Help me plan a 3-day road trip".to_string(),
            greeting: "Hi, I'm Gemini. Search for parks above, pick a few, and ask away."
                .to_string(),
        }
    }
}

impl AppConfig {
    /// Reads the JSON document in the config slot, if any.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(CONFIG_SLOT) else {
            return Self::default();
        };
        match serde_json::from_str::<AppConfig>(&raw) {
            Ok(config) => {
                log!("[INFO] [Config] Loaded overrides from '{}'", CONFIG_SLOT);
                config.sanitized()
            }
            Err(e) => {
                log!(
                    "[WARN] [Config] Ignoring malformed '{}': {}. Using defaults.",
                    CONFIG_SLOT,
                    e
                );
                Self::default()
            }
        }
    }

    fn sanitized(mut self) -> Self {
        self.max_limit = self.max_limit.max(1);
        self.default_limit = self.default_limit.clamp(1, self.max_limit);
        self.shown_results = self.shown_results.max(1);
        self.parks_endpoint = self.parks_endpoint.trim_end_matches('/').to_string();
        self.generative_endpoint = self.generative_endpoint.trim_end_matches('/').to_string();
        self
    }
}
