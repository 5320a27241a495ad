use serde::{Deserialize, Serialize};

/// Substrings of model ids that suggest a chat-capable model
const CHAT_MARKERS: &[&str] = &[
    "gpt", "claude", "llama", "qwen", "gemini", "mistral", "phi", "command", "instruct", "chat",
];
/// Substrings of model ids for embedding and legacy completion models
const NON_CHAT_MARKERS: &[&str] = &["embed", "ada", "babbage", "curie", "davinci"];

/// A model as listed by `GET /models`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Deserialize, Debug)]
pub(super) struct ModelsRawResponse {
    pub(super) data: Vec<Model>,
}

fn is_chat_model(model: &Model) -> bool {
    CHAT_MARKERS.iter().any(|marker| model.id.contains(marker))
        && !NON_CHAT_MARKERS.iter().any(|marker| model.id.contains(marker))
}

/// Chat models sorted by id; every model when none looks like a chat model
pub fn chat_models(models: Vec<Model>) -> Vec<Model> {
    let mut chat: Vec<Model> = models.iter().filter(|m| is_chat_model(m)).cloned().collect();
    if chat.is_empty() {
        return models;
    }

    chat.sort_by(|a, b| a.id.cmp(&b.id));
    chat
}
