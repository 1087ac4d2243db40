use leptos::prelude::*;

/// Password-style input for an API key, with show/hide and clear buttons.
#[component]
pub fn ApiKeyBar(
    value: RwSignal<String>,
    #[prop(into)] placeholder: String,
    #[prop(into)] on_change: Callback<String>,
    #[prop(into)] on_clear: Callback<()>,
) -> impl IntoView {
    let (show_key, set_show_key) = signal(false);

    view! {
        <key-bar>
            <input
                type=move || if show_key.get() { "text" } else { "password" }
                placeholder=placeholder
                prop:value=move || value.get()
                on:input:target=move |ev| {
                    let new_value = ev.target().value();
                    value.set(new_value.clone());
                    on_change.run(new_value);
                }
            />
            <button
                type="button"
                data-size="compact"
                on:click=move |_| set_show_key.update(|show| *show = !*show)
            >
                {move || if show_key.get() { "Hide" } else { "Show" }}
            </button>
            <button
                type="button"
                data-size="compact"
                data-role="secondary"
                on:click=move |_| {
                    value.set(String::new());
                    on_clear.run(());
                }
            >
                "Clear"
            </button>
        </key-bar>
    }
}
