use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use leptos::logging::log;

// --- Storage slots ---
pub const NPS_KEY_SLOT: &str = "nps_api_key";
pub const GEMINI_KEY_SLOT: &str = "gemini_api_key";
pub const CONFIG_SLOT: &str = "parkchat_config";

/// String key-value persistence. The browser build is backed by
/// `localStorage`; tests swap in [`MemoryStore`].
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

/// `window.localStorage`. Looked up on every call since the handle itself is not `Send`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Result<web_sys::Storage> {
        let window = web_sys::window().ok_or_else(|| anyhow!("[Storage] No window available"))?;
        window
            .local_storage()
            .map_err(|e| anyhow!("[Storage] localStorage access denied: {:?}", e))?
            .ok_or_else(|| anyhow!("[Storage] localStorage is not available"))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        match Self::storage() {
            Ok(storage) => storage.get_item(key).ok().flatten(),
            Err(e) => {
                log!("[ERROR] {}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| anyhow!("[Storage] Failed to write '{}': {:?}", key, e))
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| anyhow!("[Storage] Failed to remove '{}': {:?}", key, e))
    }
}

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

#[cfg_attr(not(test), allow(dead_code))]
impl MemoryStore {
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("[Storage] Memory store lock poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("[Storage] Memory store lock poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// One persisted API key.
#[derive(Clone)]
pub struct CredentialSlot {
    store: SharedStore,
    slot: &'static str,
}

impl CredentialSlot {
    pub fn new(store: SharedStore, slot: &'static str) -> Self {
        Self { store, slot }
    }

    /// The saved key, or an empty string when nothing was saved.
    pub fn load(&self) -> String {
        self.store.get(self.slot).unwrap_or_default()
    }

    /// Writes a non-empty key; an empty key removes the saved copy.
    pub fn persist(&self, value: &str) -> Result<()> {
        if value.is_empty() {
            self.forget()
        } else {
            self.store.set(self.slot, value)
        }
    }

    pub fn forget(&self) -> Result<()> {
        self.store.remove(self.slot)
    }

    /// Applies a key edit under the "remember on this device" setting.
    pub fn update(&self, value: &str, remember: bool) {
        if !remember {
            return;
        }
        if let Err(e) = self.persist(value) {
            log!("[ERROR] [Storage] Failed to save '{}': {}", self.slot, e);
        }
    }

    /// Toggles persistence. Turning it off drops the saved copy right away.
    pub fn set_remember(&self, current_value: &str, remember: bool) {
        let result = if remember {
            self.persist(current_value)
        } else {
            self.forget()
        };
        if let Err(e) = result {
            log!("[ERROR] [Storage] Failed to update '{}': {}", self.slot, e);
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.forget() {
            log!("[ERROR] [Storage] Failed to clear '{}': {}", self.slot, e);
        }
    }
}
