pub mod controls;
pub mod message;
pub mod session;
pub mod types;

use leptos::logging::log;
use leptos::{html, prelude::*, task::spawn_local};

use crate::http::HttpClient;
use crate::key_bar::ApiKeyBar;
use crate::search::selection::NpsContext;
use crate::state::GlobalState;
use controls::ChatControls;
use message::ChatMessageView;
use session::{run_send, ChatSession};

#[component]
pub fn ChatInterface(#[prop(into)] context: Signal<NpsContext>) -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState context not found");
    let config = state.config.clone();
    let key_slot = state.gemini_key();

    let api_key = RwSignal::new(key_slot.load());
    let remember_key = RwSignal::new(true);
    let input = RwSignal::new(config.starter_prompt.clone());
    let session = RwSignal::new(ChatSession::with_greeting(&config.greeting));
    let busy = Signal::derive(move || session.with(|s| s.is_busy()));

    let ref_input: NodeRef<html::Input> = NodeRef::new();
    let ref_history: NodeRef<html::Custom<&str>> = NodeRef::new();

    on_cleanup(move || {
        session.try_update(|s| s.abort());
    });

    Effect::new(move |_| {
        session.track();
        if let Some(history) = ref_history.get() {
            history.set_scroll_top(history.scroll_height());
        }
    });

    let endpoint = config.generative_endpoint.clone();
    let model = config.model.clone();
    let submit = Callback::new(move |_: ()| {
        let text = input.get_untracked();
        let key = api_key.get_untracked();
        let current_context = context.get_untracked();
        let Some(started) = session.try_update(|s| s.begin_send(&text, &current_context, &key))
        else {
            return;
        };
        let pending = match started {
            Ok(Some(pending)) => pending,
            Ok(None) => return,
            Err(e) => {
                log!("[WARN] [Chat] {}", e);
                return;
            }
        };
        input.set(String::new());

        let endpoint = endpoint.clone();
        let model = model.clone();
        spawn_local(async move {
            let client = HttpClient::new();
            let (id, outcome) = run_send(&client, &endpoint, &model, &key, pending).await;
            session.try_update(|s| s.finish_send(id, outcome));
            if let Some(ref_input) = ref_input.get_untracked() {
                let _ = ref_input.focus();
            }
        });
    });

    let on_key_change = {
        let key_slot = key_slot.clone();
        Callback::new(move |value: String| key_slot.update(&value, remember_key.get_untracked()))
    };
    let on_key_clear = {
        let key_slot = key_slot.clone();
        Callback::new(move |_: ()| key_slot.clear())
    };
    let on_remember_change = move |remember: bool| {
        remember_key.set(remember);
        key_slot.set_remember(&api_key.get_untracked(), remember);
    };

    view! {
        <chat-interface>
            <ChatControls
                input=input
                input_disabled=busy
                can_send=Signal::derive(move || !api_key.get().is_empty())
                ref_input=ref_input
                submit=submit
            />
            <chat-history node_ref=ref_history>
                {move || {
                    session
                        .with(|s| s.history().to_vec())
                        .into_iter()
                        .map(|message| view! { <ChatMessageView message=message /> })
                        .collect_view()
                }}
                <Show when=move || busy.get()>
                    <chat-message data-role="model">
                        <chat-message-role>"Gemini"</chat-message-role>
                        <chat-message-content>"Thinking…"</chat-message-content>
                    </chat-message>
                </Show>
            </chat-history>
            {move || {
                session
                    .with(|s| s.error().map(ToString::to_string))
                    .map(|error| view! { <error-box>"⚠ " {error}</error-box> })
            }}
            <ApiKeyBar
                value=api_key
                placeholder="Your Gemini API key (stored only in localStorage)"
                on_change=on_key_change
                on_clear=on_key_clear
            />
            <label class="remember-key">
                <input
                    type="checkbox"
                    prop:checked=move || remember_key.get()
                    on:change:target=move |ev| on_remember_change(ev.target().checked())
                />
                <span>"Remember on this device (localStorage)"</span>
            </label>
            <context-status>
                "NPS context: "
                {move || {
                    if context.with(|c| c.is_empty()) {
                        "not loaded yet (enter an NPS key above, fetch, and select results)"
                    } else {
                        "loaded (attached to your next question)"
                    }
                }}
            </context-status>
        </chat-interface>
    }
}
