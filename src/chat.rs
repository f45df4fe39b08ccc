//! Client for the OpenAI-style chat completions upstream (Perplexity).

use crate::config::{PERPLEXITY_API_KEY, require_secret};
use crate::errors::{AppError, Result};
use crate::models::ChatMessage;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Clone)]
pub struct ChatCompletions {
    client: reqwest::Client,
    url: Url,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletions {
    pub fn new(url: &str, model: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            url: Url::parse(url)?,
            model: model.into(),
            api_key,
        })
    }

    async fn send(&self, messages: &[ChatMessage], stream: bool) -> Result<reqwest::Response> {
        let api_key = require_secret(PERPLEXITY_API_KEY, self.api_key.as_deref())?;

        let resp = self
            .client
            .post(self.url.clone())
            .bearer_auth(api_key)
            .json(&CompletionRequest {
                model: &self.model,
                messages,
                stream,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("error");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: if body.is_empty() {
                    reason.to_string()
                } else {
                    format!("{reason}: {body}")
                },
            });
        }
        Ok(resp)
    }

    /// Start a streamed completion; the caller forwards the SSE body as is.
    pub async fn stream(&self, messages: &[ChatMessage]) -> Result<reqwest::Response> {
        self.send(messages, true).await
    }

    /// Non-streamed completion, returning the first choice's content.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let resp = self.send(messages, false).await?;
        let body: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| AppError::MalformedPayload(format!("completion body: {e}")))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::MalformedPayload("completion without choices".into()))
    }
}
