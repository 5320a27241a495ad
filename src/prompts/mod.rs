//! Prompt templates: the data model, the remote feed and in-memory catalog queries.
pub mod catalog;
pub mod feed;

use serde::{Deserialize, Serialize};

pub use catalog::{Category, PromptFilter};
pub use feed::{FeedClient, PromptSource};

/// Whether the feed meant the prompt as a user or a system message
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptType {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "system")]
    System,
}

/// A prompt template as listed in the directory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptItem {
    /// 1-based position in the feed
    pub id: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub skills: Vec<String>,
    /// Raw prompt text
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<PromptType>,
}
