use serde::{Deserialize, Serialize};
use tokio::{io::AsyncWrite, sync::mpsc::channel};
use tracing::{debug, error, info, trace};

use super::{errors::ChatError, stream::Streamer};
use crate::client::provider::Provider;

/// Model used when the caller does not pick one
pub static DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A conversation with one prompt template as its system prompt. The transcript lives in
/// memory only.
pub struct Chat<P: Provider> {
    system_prompt: Option<String>,
    messages: Vec<Message>,
    provider: P,
}

impl<P: Provider> Chat<P> {
    /// Create new chat
    pub fn new(provider: P) -> Self {
        Self {
            system_prompt: None,
            messages: vec![],
            provider,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// User and assistant turns so far
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// System prompt, then the transcript, then the new message
    fn conversation(&self, message: &Message) -> Vec<Message> {
        let mut conversation = Vec::with_capacity(self.messages.len() + 2);
        if let Some(system_prompt) = &self.system_prompt {
            conversation.push(Message {
                role: Role::System,
                content: system_prompt.clone(),
            });
        }
        conversation.extend(self.messages.iter().cloned());
        conversation.push(message.clone());
        conversation
    }

    /// Record a completed exchange; failed exchanges never reach the transcript
    fn record(&mut self, message: Message, reply: &Message) {
        self.messages.push(message);
        self.messages.push(reply.clone());
    }

    /// Send a message and wait for the full reply
    pub async fn send_message(
        &mut self,
        model: Option<&str>,
        content: String,
    ) -> Result<Message, ChatError> {
        let message = Message {
            role: Role::User,
            content,
        };
        let conversation = self.conversation(&message);

        trace!(count = conversation.len(), "sending request");
        let content = self
            .provider
            .complete(model.unwrap_or(DEFAULT_MODEL), &conversation)
            .await
            .map_err(|e| ChatError::Provider(e.to_string()))?;

        let reply = Message {
            role: Role::Assistant,
            content,
        };
        self.record(message, &reply);
        Ok(reply)
    }

    /// Send a message and write the reply to `writer` as it streams in; returns the
    /// assistant message once the stream ends.
    pub async fn send_message_with_stream(
        &mut self,
        model: Option<&str>,
        content: String,
        streamer: impl Streamer + 'static,
        mut writer: impl AsyncWrite + Send + Unpin + 'static,
    ) -> Result<Message, ChatError> {
        let message = Message {
            role: Role::User,
            content,
        };
        let conversation = self.conversation(&message);

        let reply = {
            trace!(count = conversation.len(), "sending streaming request");
            let stream = self
                .provider
                .request(model.unwrap_or(DEFAULT_MODEL), &conversation)
                .await
                .map_err(|e| ChatError::Provider(e.to_string()))?;

            debug!("Creating channels");
            let (sender, receiver) = channel(32);

            let streamer_clone = streamer.clone();

            // Write the chunks while they arrive
            let job = tokio::spawn(async move {
                streamer_clone
                    .forward_chunks(&mut writer, receiver)
                    .await
                    .unwrap_or_else(|e| {
                        error!(%e, "Error writing stream");
                    });
            });

            info!("Collecting message");
            let reply = streamer
                .collect_stream(std::pin::pin!(stream), sender)
                .await
                .map_err(|e| ChatError::Stream(e.to_string()))?;

            job.await?;
            reply
        };

        info!("Message collected");
        self.record(message, &reply);
        Ok(reply)
    }
}

/// A chat message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The sender of the message
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}
