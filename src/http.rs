use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;

/// Status and raw body of a finished HTTP exchange. Decoding is left to the
/// API modules so they can map statuses to their own errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn get(
        &self,
        url: &str,
        query: &[(String, String)],
        headers: &[(&str, &str)],
    ) -> Result<HttpReply> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        Self::into_reply(response).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<HttpReply> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request
            .send()
            .await
            .with_context(|| format!("POST {url} failed"))?;
        Self::into_reply(response).await
    }

    async fn into_reply(response: reqwest::Response) -> Result<HttpReply> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;
        Ok(HttpReply { status, body })
    }
}
