use leptos::prelude::*;

use crate::nps::{present, ParkRecord, ResourceKind};

#[component]
pub fn ResultCard(
    record: ParkRecord,
    kind: ResourceKind,
    #[prop(into)] on_select: Callback<ParkRecord>,
) -> impl IntoView {
    let title = record.display_title().to_string();
    let image = record.first_image().map(str::to_string);
    let states = present(&record.states)
        .map(|states| format!("({states})"))
        .unwrap_or_default();
    let description = present(&record.description).unwrap_or_default().to_string();
    let official_url = present(&record.url).map(str::to_string);
    let alt = title.clone();

    view! {
        <result-card>
            {image.map(|src| view! { <img src=src alt=alt /> })}
            <result-card-body>
                <result-card-title>{title}</result-card-title>
                <result-card-meta>{format!("{states} · {}", kind.label())}</result-card-meta>
                <result-card-description>{description}</result-card-description>
                {official_url
                    .map(|href| {
                        view! {
                            <a href=href target="_blank" rel="noopener noreferrer">
                                "Official page"
                            </a>
                        }
                    })}
                <button
                    type="button"
                    data-size="compact"
                    data-role="primary"
                    on:click=move |_| on_select.run(record.clone())
                >
                    "Select"
                </button>
            </result-card-body>
        </result-card>
    }
}
