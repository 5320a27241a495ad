use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("OpenAI client not configured")]
    NotConfigured,
    #[error("Invalid chat configuration: {0}")]
    Config(String),
    #[error("Failed to access chat configuration: {0}")]
    Store(#[from] StoreError),
    #[error("Failed to (de)serialize chat data: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Failed to process stream: {0}")]
    Stream(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Tokio join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}
