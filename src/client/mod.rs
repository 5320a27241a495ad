pub mod config;
pub mod models;
mod openai;
pub mod provider;

pub use config::ChatConfig;
pub use openai::OpenAiClient;
