use leptos::logging::log;
use serde::{Deserialize, Serialize};

use crate::errors::ChatError;
use crate::http::{HttpClient, HttpReply};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Set on reasoning parts, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }
}

/// One turn of the conversation: `role` is `user` or `model`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Joined answer text of the first candidate, if it has any.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.as_ref()?.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<i64>,
    message: String,
    #[serde(default)]
    status: Option<String>,
}

#[allow(async_fn_in_trait)]
pub trait GenerativeTransport {
    async fn generate(
        &self,
        url: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<HttpReply>;
}

impl GenerativeTransport for HttpClient {
    async fn generate(
        &self,
        url: &str,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> anyhow::Result<HttpReply> {
        self.post_json(url, request, &[("x-goog-api-key", api_key)])
            .await
    }
}

pub fn generate_content_url(endpoint: &str, model: &str) -> String {
    format!(
        "{}/models/{}:generateContent",
        endpoint.trim_end_matches('/'),
        model
    )
}

/// Sends the whole conversation and returns the reply text. `Ok(None)` means
/// the model answered without any text.
pub async fn generate_text<T: GenerativeTransport>(
    transport: &T,
    endpoint: &str,
    model: &str,
    api_key: &str,
    contents: Vec<Content>,
) -> Result<Option<String>, ChatError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(ChatError::MissingKey);
    }

    let url = generate_content_url(endpoint, model);
    log!("[DEBUG] [Gemini] Sending {} turns to {}", contents.len(), model);
    let reply = transport
        .generate(&url, api_key, &GenerateContentRequest { contents })
        .await
        .map_err(|e| {
            log!("[ERROR] [Gemini] Transport error: {:#}", e);
            ChatError::Generation(e.to_string())
        })?;

    if !reply.is_success() {
        let message = match serde_json::from_str::<ErrorResponse>(&reply.body) {
            Ok(error_response) => error_response.error.message,
            Err(_) => format!("Generation request failed with status {}", reply.status),
        };
        log!("[WARN] [Gemini] Status {}: {}", reply.status, message);
        return Err(ChatError::Generation(message));
    }

    let response: GenerateContentResponse = serde_json::from_str(&reply.body).map_err(|e| {
        log!("[ERROR] [Gemini] Failed to parse response: {}", e);
        ChatError::Generation(format!("Unexpected response: {e}"))
    })?;
    Ok(response.text())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[derive(Default)]
    pub(crate) struct FakeGemini {
        pub replies: RefCell<Vec<anyhow::Result<HttpReply>>>,
        pub seen: RefCell<Vec<(String, String, GenerateContentRequest)>>,
    }

    impl FakeGemini {
        pub fn replying(status: u16, body: &str) -> Self {
            let fake = Self::default();
            fake.replies.borrow_mut().push(Ok(HttpReply {
                status,
                body: body.to_string(),
            }));
            fake
        }

        pub fn answering(text: &str) -> Self {
            let body = serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
            });
            Self::replying(200, &body.to_string())
        }
    }

    impl GenerativeTransport for FakeGemini {
        async fn generate(
            &self,
            url: &str,
            api_key: &str,
            request: &GenerateContentRequest,
        ) -> anyhow::Result<HttpReply> {
            self.seen
                .borrow_mut()
                .push((url.to_string(), api_key.to_string(), request.clone()));
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Err(anyhow!("no reply queued")))
        }
    }

    fn user(text: &str) -> Content {
        Content {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }

    #[test]
    fn request_body_has_role_and_parts() {
        let body = serde_json::to_value(GenerateContentRequest {
            contents: vec![user("hi")],
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn reply_text_is_returned_and_request_is_addressed_to_model() {
        let fake = FakeGemini::answering("Go to Yosemite.");
        let text = block_on(generate_text(
            &fake,
            "https://generativelanguage.googleapis.com/v1beta/",
            "gemini-2.5-flash",
            " key ",
            vec![user("hi")],
        ));
        assert_eq!(text, Ok(Some("Go to Yosemite.".to_string())));

        let seen = fake.seen.borrow();
        let (url, key, request) = &seen[0];
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(key, "key");
        assert_eq!(request.contents, vec![user("hi")]);
    }

    #[test]
    fn thought_parts_are_skipped_and_text_parts_joined() {
        let body = r#"{"candidates": [{"content": {"parts": [
            {"text": "thinking...", "thought": true},
            {"text": "Day 1: "},
            {"text": "Valley floor."}
        ]}}]}"#;
        let fake = FakeGemini::replying(200, body);
        let text = block_on(generate_text(&fake, "https://x", "m", "k", vec![user("hi")]));
        assert_eq!(text, Ok(Some("Day 1: Valley floor.".to_string())));
    }

    #[test]
    fn reply_without_text_is_none() {
        for body in [r#"{"candidates": []}"#, r#"{"candidates": [{"content": {"parts": []}}]}"#, "{}"] {
            let fake = FakeGemini::replying(200, body);
            let text = block_on(generate_text(&fake, "https://x", "m", "k", vec![user("hi")]));
            assert_eq!(text, Ok(None));
        }
    }

    #[test]
    fn api_error_message_is_surfaced() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let fake = FakeGemini::replying(400, body);
        let result = block_on(generate_text(&fake, "https://x", "m", "k", vec![user("hi")]));
        assert_eq!(result, Err(ChatError::Generation("API key not valid.".to_string())));
    }

    #[test]
    fn unknown_error_body_reports_status() {
        let fake = FakeGemini::replying(503, "upstream down");
        let result = block_on(generate_text(&fake, "https://x", "m", "k", vec![user("hi")]));
        assert_eq!(
            result,
            Err(ChatError::Generation("Generation request failed with status 503".to_string()))
        );
    }

    #[test]
    fn missing_key_fails_before_sending() {
        let fake = FakeGemini::answering("unused");
        let result = block_on(generate_text(&fake, "https://x", "m", "", vec![user("hi")]));
        assert_eq!(result, Err(ChatError::MissingKey));
        assert!(fake.seen.borrow().is_empty());
    }
}
