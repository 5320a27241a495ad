mod core;
pub mod errors;
pub mod prompts;
mod stream;
pub use self::core::{Chat, Message, Role};
pub use stream::ChatStreamer;
