mod chat;
mod config;
mod errors;
mod gemini;
mod http;
mod inflight;
mod key_bar;
mod markdown;
mod nps;
mod persistence;
mod search;
mod state;

use std::sync::Arc;

use leptos::logging::log;
use leptos::prelude::*;

use crate::chat::ChatInterface;
use crate::config::AppConfig;
use crate::persistence::{BrowserStorage, SharedStore};
use crate::search::selection::NpsContext;
use crate::search::NpsSearch;
use crate::state::GlobalState;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

#[component]
fn App() -> impl IntoView {
    let store: SharedStore = Arc::new(BrowserStorage);
    let config = AppConfig::load(store.as_ref());
    log!(
        "[INFO] [App] Starting with model '{}' against {}",
        config.model,
        config.parks_endpoint
    );
    provide_context(GlobalState::new(config, store));

    // Search hands a fresh snapshot to the chat on every selection change.
    let nps_context = RwSignal::new(NpsContext::default());

    view! {
        <main>
            <NpsSearch on_context=Callback::new(move |context: NpsContext| nps_context.set(context)) />
            <ChatInterface context=nps_context />
        </main>
    }
}
