use anyhow::anyhow;
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use super::{
    config::ChatConfig,
    models::{Model, ModelsRawResponse},
    provider::Provider,
};
use crate::chat::Message;

/// Sampling temperature sent with every completion
const TEMPERATURE: f32 = 0.7;
/// Upper bound of generated tokens per reply
const MAX_TOKENS: i32 = 2000;
/// Reply text when the backend answers without content
pub static EMPTY_REPLY: &str = "No response generated";

/// Client for any OpenAI-compatible chat-completion API
pub struct OpenAiClient {
    config: ChatConfig,
    client: reqwest::Client,
}

/// Contain the commons parameters of the model for use in requests
#[derive(Serialize, Debug)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: i32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize, Debug)]
struct CompletionMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_completion(
        &self,
        model: &str,
        messages: &[Message],
        stream: bool,
    ) -> anyhow::Result<reqwest::Response> {
        let body = CompletionBody {
            model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream,
        };
        trace!(?body);

        let resp = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        debug!(status = %resp.status(), "completion response");

        ensure_success(resp).await
    }
}

/// Turn non-2xx responses into errors carrying the body the server sent
async fn ensure_success(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    Err(anyhow!("error in request, status code {}: {}", status, body.trim()))
}

impl Provider for OpenAiClient {
    async fn list_models(&self) -> anyhow::Result<Vec<Model>> {
        info!("Making request for retrieving models");

        let resp = self
            .client
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let resp_body = resp.json::<ModelsRawResponse>().await?;
        debug!(count = resp_body.data.len(), "Models retrieved");

        Ok(resp_body.data)
    }

    async fn complete(&self, model: &str, messages: &[Message]) -> anyhow::Result<String> {
        info!(%model, "Making request");
        let resp = self.post_completion(model, messages, false).await?;
        let resp_body = resp.json::<CompletionResponse>().await?;

        Ok(resp_body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string()))
    }

    async fn request(
        &self,
        model: &str,
        messages: &[Message],
    ) -> anyhow::Result<impl Stream<Item = reqwest::Result<bytes::Bytes>>> {
        info!(%model, "Making streaming request");
        let resp = self.post_completion(model, messages, true).await?;

        // Stream for processing the response
        Ok(resp.bytes_stream())
    }
}
