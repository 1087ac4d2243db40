use crate::config::AppConfig;
use crate::persistence::{CredentialSlot, SharedStore, GEMINI_KEY_SLOT, NPS_KEY_SLOT};

/// App-wide state, provided once at the root and read with `use_context`.
#[derive(Clone)]
pub struct GlobalState {
    pub config: AppConfig,
    pub store: SharedStore,
}

impl GlobalState {
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        Self { config, store }
    }

    pub fn nps_key(&self) -> CredentialSlot {
        CredentialSlot::new(self.store.clone(), NPS_KEY_SLOT)
    }

    pub fn gemini_key(&self) -> CredentialSlot {
        CredentialSlot::new(self.store.clone(), GEMINI_KEY_SLOT)
    }
}
