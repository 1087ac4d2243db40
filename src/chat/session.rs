use leptos::logging::log;

use crate::errors::ChatError;
use crate::gemini::{self, Content, GenerativeTransport};
use crate::inflight::{RequestSlot, RequestToken};
use crate::search::selection::NpsContext;

use super::types::ChatMessage;

pub const CONTEXT_HEADER: &str = "[NPS context] Below is US National Park data (JSON) from the latest search. Refer to it when relevant.";
pub const QUESTION_HEADER: &str = "[User Question]";
/// Stored as the model turn when a reply carries no text.
pub const NO_CONTENT: &str = "[No content]";

/// Prefixes the user's text with the selection context, if there is one.
pub fn compose_prompt(text: &str, context: &NpsContext) -> String {
    let header = if context.is_empty() {
        QUESTION_HEADER.to_string()
    } else {
        format!("{CONTEXT_HEADER}\n{}\n\n{QUESTION_HEADER}", context.as_str())
    };
    format!("{header}\n{text}")
}

/// Conversation history plus the state of the single in-flight send.
#[derive(Debug, Default)]
pub struct ChatSession {
    history: Vec<ChatMessage>,
    pending_turn: Option<usize>,
    error: Option<ChatError>,
    slot: RequestSlot,
}

#[derive(Debug)]
pub struct PendingSend {
    pub token: RequestToken,
    pub contents: Vec<Content>,
}

impl ChatSession {
    pub fn with_greeting(greeting: &str) -> Self {
        let mut session = Self::default();
        if !greeting.is_empty() {
            session.history.push(ChatMessage::model(greeting));
        }
        session
    }

    /// Appends the user turn and admits the request.
    ///
    /// `Ok(None)` when the text is blank or a send is already in flight.
    pub fn begin_send(
        &mut self,
        text: &str,
        context: &NpsContext,
        api_key: &str,
    ) -> Result<Option<PendingSend>, ChatError> {
        let text = text.trim();
        if text.is_empty() || self.slot.is_busy() {
            return Ok(None);
        }
        if api_key.trim().is_empty() {
            self.error = Some(ChatError::MissingKey);
            return Err(ChatError::MissingKey);
        }
        let Some(token) = self.slot.try_begin() else {
            return Ok(None);
        };

        self.error = None;
        self.history.push(ChatMessage::user(compose_prompt(text, context)));
        self.pending_turn = Some(self.history.len() - 1);
        log!(
            "[INFO] [Chat] #{} sending {} turns (context: {})",
            token.id(),
            self.history.len(),
            if context.is_empty() { "none" } else { "loaded" }
        );

        Ok(Some(PendingSend {
            token,
            contents: self.history.iter().map(ChatMessage::to_content).collect(),
        }))
    }

    /// Applies the outcome of send `id`. Stale outcomes are dropped.
    pub fn finish_send(&mut self, id: u64, outcome: Result<Option<String>, ChatError>) -> bool {
        if !self.slot.finish(id) {
            return false;
        }
        let pending_turn = self.pending_turn.take();
        match outcome {
            Ok(reply) => {
                let text = reply.unwrap_or_else(|| NO_CONTENT.to_string());
                self.history.push(ChatMessage::model(text));
            }
            Err(e) => {
                log!("[WARN] [Chat] #{} failed: {}", id, e);
                if let Some(turn) = pending_turn.and_then(|i| self.history.get_mut(i)) {
                    turn.failed = true;
                }
                if e != ChatError::Aborted {
                    self.error = Some(e);
                }
            }
        }
        true
    }

    pub fn abort(&mut self) -> bool {
        self.slot.abort()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn error(&self) -> Option<&ChatError> {
        self.error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.is_busy()
    }
}

/// Runs an admitted send to completion (or abort).
pub async fn run_send<T: GenerativeTransport>(
    transport: &T,
    endpoint: &str,
    model: &str,
    api_key: &str,
    pending: PendingSend,
) -> (u64, Result<Option<String>, ChatError>) {
    let id = pending.token.id();
    let outcome = pending
        .token
        .run(gemini::generate_text(
            transport,
            endpoint,
            model,
            api_key,
            pending.contents,
        ))
        .await
        .unwrap_or(Err(ChatError::Aborted));
    (id, outcome)
}
