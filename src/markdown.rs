use leptos::{html, prelude::*};

fn markdown_options() -> markdown::Options {
    markdown::Options {
        parse: markdown::ParseOptions::gfm(),
        compile: markdown::CompileOptions::gfm(),
    }
}

/// Renders GFM to HTML. Raw HTML in the input is escaped.
pub fn render_markdown(text: &str) -> String {
    markdown::to_html_with_options(text, &markdown_options())
        .unwrap_or_else(|_| markdown::to_html(text))
}

#[component]
pub fn Markdown(#[prop(into)] markdown_text: String) -> impl IntoView {
    let content_div_ref = NodeRef::<html::Div>::new();

    Effect::new(move |_| {
        if let Some(div_element) = content_div_ref.get() {
            div_element.set_inner_html(&render_markdown(&markdown_text));
        }
    });

    view! { <div node_ref=content_div_ref></div> }
}
