use leptos::prelude::*;

use crate::nps::{parse_limit, ResourceKind};

#[component]
pub fn SearchControls(
    keyword: RwSignal<String>,
    resource: RwSignal<ResourceKind>,
    state_code: RwSignal<String>,
    park_code: RwSignal<String>,
    limit: RwSignal<u32>,
    max_limit: u32,
    #[prop(into)] busy: Signal<bool>,
    #[prop(into)] can_fetch: Signal<bool>,
    #[prop(into)] on_fetch: Callback<()>,
) -> impl IntoView {
    view! {
        <search-controls>
            <form on:submit=move |ev| {
                ev.prevent_default();
                if can_fetch.get_untracked() && !busy.get_untracked() {
                    on_fetch.run(());
                }
            }>
                <input
                    type="text"
                    placeholder="Search keyword (e.g. Yosemite)"
                    prop:value=move || keyword.get()
                    on:input:target=move |ev| keyword.set(ev.target().value())
                />
                <select
                    prop:value=move || resource.get().path()
                    on:change:target=move |ev| {
                        if let Ok(kind) = ev.target().value().parse::<ResourceKind>() {
                            resource.set(kind);
                        }
                    }
                >
                    {ResourceKind::ALL
                        .into_iter()
                        .map(|kind| {
                            view! {
                                <option value=kind.path() selected=move || resource.get() == kind>
                                    {kind.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <input
                    type="text"
                    placeholder="State code (CA / UT)"
                    prop:value=move || state_code.get()
                    on:input:target=move |ev| state_code.set(ev.target().value())
                />
                <input
                    type="text"
                    placeholder="Park code (yose / zion)"
                    prop:value=move || park_code.get()
                    on:input:target=move |ev| park_code.set(ev.target().value())
                />
                <input
                    type="number"
                    min="1"
                    max=max_limit.to_string()
                    prop:value=move || limit.get().to_string()
                    on:input:target=move |ev| limit.set(parse_limit(&ev.target().value(), max_limit))
                />
                <button
                    type="submit"
                    data-role="primary"
                    disabled=move || !can_fetch.get() || busy.get()
                >
                    {move || if busy.get() { "Loading..." } else { "Fetch" }}
                </button>
            </form>
        </search-controls>
    }
}
