use futures_util::Stream;

use super::models::Model;
use crate::chat::Message;

/// A chat-completion backend
pub trait Provider {
    /// Models the backend can serve
    async fn list_models(&self) -> anyhow::Result<Vec<Model>>;

    /// Send the conversation and wait for the whole reply
    async fn complete(&self, model: &str, messages: &[Message]) -> anyhow::Result<String>;

    /// Send the conversation and return the raw server-sent event stream of the reply
    async fn request(
        &self,
        model: &str,
        messages: &[Message],
    ) -> anyhow::Result<impl Stream<Item = reqwest::Result<bytes::Bytes>>>;
}
