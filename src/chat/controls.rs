use leptos::{html, prelude::*};

#[component]
pub fn ChatControls(
    input: RwSignal<String>,
    #[prop(into)] input_disabled: Signal<bool>,
    #[prop(into)] can_send: Signal<bool>,
    ref_input: NodeRef<html::Input>,
    #[prop(into)] submit: Callback<()>,
) -> impl IntoView {
    view! {
        <chat-controls>
            <form on:submit=move |ev| {
                ev.prevent_default();
                if !input_disabled.get_untracked() {
                    submit.run(());
                }
            }>
                <input
                    type="text"
                    placeholder="Ask Gemini anything"
                    prop:value=move || input.get()
                    on:input:target=move |ev| input.set(ev.target().value())
                    node_ref=ref_input
                />
                <button
                    type="submit"
                    data-role="primary"
                    disabled=move || {
                        input_disabled.get() || input.get().trim().is_empty() || !can_send.get()
                    }
                >
                    "Send"
                </button>
            </form>
        </chat-controls>
    }
}
