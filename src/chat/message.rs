use leptos::prelude::*;

use super::types::{ChatMessage, Role};
use crate::markdown::Markdown;

#[component]
pub fn ChatMessageView(message: ChatMessage) -> impl IntoView {
    let role = message.role;
    let failed = message.failed;
    let content = match role {
        Role::Model => view! { <Markdown markdown_text=message.text /> }.into_any(),
        Role::User => message
            .text
            .lines()
            .map(|line| view! { <div style="white-space: pre-wrap; word-break: break-word">{line.to_string()}</div> })
            .collect_view()
            .into_any(),
    };

    view! {
        <chat-message data-role=role.as_str() data-failed=failed.to_string()>
            <chat-message-role>{role.label()}</chat-message-role>
            <chat-message-content>{content}</chat-message-content>
            {failed.then(|| view! { <chat-message-status>"not delivered"</chat-message-status> })}
        </chat-message>
    }
}
